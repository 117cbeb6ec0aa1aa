use std::path::Path;

use flexi_logger::{Logger, LoggerHandle};

/// Logs to stderr so stdout stays clean for JSON output. `RUST_LOG` wins
/// over `level`.
pub fn init_logging(level: &str) -> anyhow::Result<LoggerHandle> {
    let handle = Logger::try_with_env_or_str(level)?
        .log_to_stderr()
        .start()?;
    Ok(handle)
}

/// Loads `env_file` (`.env` from the working directory or its parents when
/// `None`) before starting the logger, so a `RUST_LOG` set there applies.
pub fn init_with_env(level: &str, env_file: Option<&Path>) -> anyhow::Result<LoggerHandle> {
    let loaded = match env_file {
        Some(path) => dotenv::from_path(path).map(|()| path.to_path_buf()),
        None => dotenv::dotenv(),
    };
    let handle = init_logging(level)?;
    if let Ok(path) = loaded {
        log::debug!("Loaded environment from {}", path.display());
    }
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn rust_log_from_env_file_sets_the_level() {
        let dir = tempdir().unwrap();
        let env_file = dir.path().join(".env");
        std::fs::write(&env_file, "RUST_LOG=debug\n").unwrap();
        std::env::remove_var("RUST_LOG");

        let _handle = init_with_env("warn", Some(&env_file)).unwrap();

        assert_eq!(log::max_level(), log::LevelFilter::Debug);
    }
}
