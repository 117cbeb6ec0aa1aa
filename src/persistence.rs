use std::path::PathBuf;

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::{error::LLMError, result::QueryResultSet};

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const MAX_NAME_ATTEMPTS: usize = 1000;

/// One prompt and everything the providers said about it.
#[derive(Debug, Serialize)]
pub struct QueryLogEntry<'a> {
    /// Local time, `YYYYMMDD_HHMMSS`
    pub timestamp: String,
    pub prompt: &'a str,
    pub results: &'a QueryResultSet,
}

impl<'a> QueryLogEntry<'a> {
    pub fn new(prompt: &'a str, results: &'a QueryResultSet) -> Self {
        Self {
            timestamp: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
            prompt,
            results,
        }
    }
}

/// Destination for per-prompt records. Passed into the orchestrator so the
/// fan-out can run without touching the filesystem.
#[async_trait]
pub trait QueryLogger: Send + Sync {
    async fn record(&self, entry: &QueryLogEntry<'_>) -> Result<(), LLMError>;
}

/// Writes each entry to its own `query_<timestamp>.json` file.
///
/// Files are never rewritten: if a name is already taken a numeric suffix is
/// added.
#[derive(Debug, Clone)]
pub struct JsonFileLogger {
    dir: PathBuf,
}

impl JsonFileLogger {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Writes `entry` and returns the path of the new file.
    pub async fn write(&self, entry: &QueryLogEntry<'_>) -> Result<PathBuf, LLMError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let payload = serde_json::to_vec_pretty(entry)?;

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let path = self.path_for(&entry.timestamp, attempt);
            let file = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await;
            match file {
                Ok(mut file) => {
                    file.write_all(&payload).await?;
                    file.flush().await?;
                    log::debug!("Logged query results to {}", path.display());
                    return Ok(path);
                }
                Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(err) => return Err(err.into()),
            }
        }

        Err(LLMError::LogWrite(format!(
            "no free file name for timestamp {} in {}",
            entry.timestamp,
            self.dir.display()
        )))
    }

    fn path_for(&self, timestamp: &str, attempt: usize) -> PathBuf {
        if attempt == 0 {
            self.dir.join(format!("query_{timestamp}.json"))
        } else {
            self.dir.join(format!("query_{timestamp}_{attempt}.json"))
        }
    }
}

#[async_trait]
impl QueryLogger for JsonFileLogger {
    async fn record(&self, entry: &QueryLogEntry<'_>) -> Result<(), LLMError> {
        self.write(entry).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{provider::ProviderId, result::QueryResult};
    use tempfile::tempdir;

    fn sample_results() -> QueryResultSet {
        vec![QueryResult::success(
            ProviderId::OpenAI,
            "gpt-4",
            "Try Aurora Ford.",
            40,
            Duration::from_millis(120),
        )]
        .into_iter()
        .collect()
    }

    #[test]
    fn timestamp_uses_compact_local_format() {
        let results = QueryResultSet::default();
        let entry = QueryLogEntry::new("ping", &results);
        assert_eq!(entry.timestamp.len(), 15);
        assert_eq!(entry.timestamp.as_bytes()[8], b'_');
        assert!(entry
            .timestamp
            .chars()
            .enumerate()
            .all(|(i, c)| i == 8 || c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn writes_prompt_and_results() {
        let dir = tempdir().unwrap();
        let logger = JsonFileLogger::new(dir.path().join("logs"));
        let results = sample_results();
        let entry = QueryLogEntry::new("find a dealer", &results);

        let path = logger.write(&entry).await.unwrap();

        let name = path.file_name().unwrap().to_str().unwrap();
        assert_eq!(name, format!("query_{}.json", entry.timestamp));
        let value: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(value["prompt"], "find a dealer");
        assert_eq!(value["timestamp"], entry.timestamp);
        assert_eq!(value["results"]["openai"]["response"], "Try Aurora Ford.");
        assert_eq!(value["results"]["openai"]["tokens_used"], 40);
    }

    #[tokio::test]
    async fn same_second_entries_get_distinct_files() {
        let dir = tempdir().unwrap();
        let logger = JsonFileLogger::new(dir.path());
        let results = sample_results();
        let entry = QueryLogEntry::new("ping", &results);

        let first = logger.write(&entry).await.unwrap();
        let second = logger.write(&entry).await.unwrap();

        assert_ne!(first, second);
        assert!(second.to_str().unwrap().ends_with("_1.json"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn unwritable_directory_is_a_log_error() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();
        let logger = JsonFileLogger::new(blocker.join("logs"));
        let results = QueryResultSet::default();

        let err = logger
            .record(&QueryLogEntry::new("ping", &results))
            .await
            .unwrap_err();
        assert!(matches!(err, LLMError::LogWrite(_)));
    }
}
