use std::fs;
use std::path::Path;

use anyhow::Context;

use llm_orchestrator::{
    config::{load_config, OrchestratorConfig},
    parse_queries, AuditRecord, AuditSummary, Orchestrator, ProviderId, QueryResultSet,
};

use crate::args::{CliArgs, Command, RunArgs};

const RESPONSE_PREVIEW_CHARS: usize = 200;

pub async fn run(args: CliArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.clone()).context("loading configuration")?;
    match args.command {
        Command::Query { prompt, run, json } => {
            let providers = apply_run_args(&mut config, &run)?;
            run_query(&config, &prompt, providers.as_deref(), json).await
        }
        Command::Audit {
            queries,
            run,
            output,
            pacing_ms,
        } => {
            let providers = apply_run_args(&mut config, &run)?;
            if let Some(ms) = pacing_ms {
                config.pacing_delay_ms = ms;
            }
            run_audit(&config, &queries, providers.as_deref(), output.as_deref()).await
        }
        Command::Providers => {
            list_providers(&config);
            Ok(())
        }
    }
}

fn apply_run_args(
    config: &mut OrchestratorConfig,
    run: &RunArgs,
) -> anyhow::Result<Option<Vec<ProviderId>>> {
    if run.no_log {
        config.log_responses = false;
    }
    if let Some(dir) = &run.log_dir {
        config.log_dir = dir.clone();
    }
    run.providers
        .as_deref()
        .map(ProviderId::parse_list)
        .transpose()
        .context("parsing --providers")
}

async fn run_query(
    config: &OrchestratorConfig,
    prompt: &str,
    providers: Option<&[ProviderId]>,
    json: bool,
) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::from_config(config);
    if orchestrator.available_providers().is_empty() {
        log::warn!("No provider has an API key configured; nothing will be queried");
    }
    log::info!("Querying LLMs: {prompt}");

    let results = orchestrator.query_all(prompt, providers).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print_results(&results);
    }
    Ok(())
}

async fn run_audit(
    config: &OrchestratorConfig,
    queries_path: &Path,
    providers: Option<&[ProviderId]>,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let raw = fs::read_to_string(queries_path)
        .with_context(|| format!("reading {}", queries_path.display()))?;
    let queries = parse_queries(&raw)?;

    let orchestrator = Orchestrator::from_config(config);
    let records = orchestrator.audit(&queries, providers).await?;

    let summary = AuditSummary::from_records(&records);
    match output {
        Some(path) => {
            write_records(path, &records)?;
            print!("{summary}");
            println!("Audit records written to {}", path.display());
        }
        None => {
            println!("{}", serde_json::to_string_pretty(&records)?);
            eprint!("{summary}");
        }
    }
    Ok(())
}

fn write_records(path: &Path, records: &[AuditRecord]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let payload = serde_json::to_vec_pretty(records)?;
    fs::write(path, payload).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn print_results(results: &QueryResultSet) {
    if results.is_empty() {
        println!("No providers were queried.");
        return;
    }
    for (provider, result) in results.iter() {
        println!("\n{}", "=".repeat(60));
        println!("Provider: {}", provider.as_str().to_uppercase());
        println!("{}", "=".repeat(60));
        match (result.error(), result.response()) {
            (Some(err), _) => println!("Error: {err}"),
            (None, Some(text)) => {
                println!(
                    "Response ({}ms, {} tokens):",
                    result.latency_ms(),
                    result.tokens_used()
                );
                println!("{}...", truncate(text, RESPONSE_PREVIEW_CHARS));
            }
            (None, None) => {}
        }
    }
}

fn list_providers(config: &OrchestratorConfig) {
    for id in ProviderId::ALL {
        let settings = config.provider(id);
        let status = if settings.is_configured() {
            "configured"
        } else {
            "missing key"
        };
        let env = settings
            .api_key_env
            .as_deref()
            .unwrap_or_else(|| id.default_key_env());
        println!("{:<10} {status} ({env})", id.as_str());
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}
