use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "llm-audit",
    about = "Ask several LLM providers the same question and record what they say"
)]
pub struct CliArgs {
    /// Path to a TOML config file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one prompt across the configured providers
    Query {
        prompt: String,
        #[command(flatten)]
        run: RunArgs,
        /// Print the result set as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run a JSON file of queries one after another
    Audit {
        /// JSON array of {"id"?, "text", "expected_dealers"?}
        queries: PathBuf,
        #[command(flatten)]
        run: RunArgs,
        /// Where to write the audit records (stdout when omitted)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        /// Pause between queries in milliseconds
        #[arg(long)]
        pacing_ms: Option<u64>,
    },
    /// Show which providers have credentials
    Providers,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Comma separated subset, e.g. `openai,google`
    #[arg(long, short = 'p')]
    pub providers: Option<String>,
    /// Skip writing query_<timestamp>.json files
    #[arg(long)]
    pub no_log: bool,
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_query_with_run_flags() {
        let args = CliArgs::parse_from([
            "llm-audit",
            "query",
            "ping",
            "--providers",
            "openai,google",
            "--no-log",
            "--json",
        ]);
        match args.command {
            Command::Query { prompt, run, json } => {
                assert_eq!(prompt, "ping");
                assert_eq!(run.providers.as_deref(), Some("openai,google"));
                assert!(run.no_log);
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn parses_audit_with_global_config() {
        let args = CliArgs::parse_from([
            "llm-audit",
            "audit",
            "queries.json",
            "-o",
            "report.json",
            "--pacing-ms",
            "250",
            "--config",
            "cfg.toml",
        ]);
        assert_eq!(args.config, Some(PathBuf::from("cfg.toml")));
        match args.command {
            Command::Audit {
                queries,
                output,
                pacing_ms,
                ..
            } => {
                assert_eq!(queries, PathBuf::from("queries.json"));
                assert_eq!(output, Some(PathBuf::from("report.json")));
                assert_eq!(pacing_ms, Some(250));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
