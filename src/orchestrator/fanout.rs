use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use futures::FutureExt;

use crate::{
    adapter::ProviderAdapter,
    builder::build_adapters,
    config::{OrchestratorConfig, DEFAULT_PACING_DELAY_MS},
    error::LLMError,
    persistence::{JsonFileLogger, QueryLogEntry, QueryLogger},
    provider::ProviderId,
    result::{QueryResult, QueryResultSet},
};

/// Runs a prompt against every available provider at once.
pub struct Orchestrator {
    adapters: Vec<Box<dyn ProviderAdapter>>,
    logger: Option<Arc<dyn QueryLogger>>,
    pub(super) pacing_delay: Duration,
}

impl Orchestrator {
    /// Creates an orchestrator over the given adapters, without logging.
    ///
    /// Only the first adapter for each provider is kept.
    pub fn new(adapters: Vec<Box<dyn ProviderAdapter>>) -> Self {
        let mut kept: Vec<Box<dyn ProviderAdapter>> = Vec::with_capacity(adapters.len());
        for adapter in adapters {
            if kept.iter().any(|a| a.provider() == adapter.provider()) {
                log::warn!("Ignoring duplicate adapter for {}", adapter.provider());
                continue;
            }
            kept.push(adapter);
        }
        Self {
            adapters: kept,
            logger: None,
            pacing_delay: Duration::from_millis(DEFAULT_PACING_DELAY_MS),
        }
    }

    /// Builds adapters for every credentialed provider and, when enabled, a
    /// JSON file logger under `log_dir`.
    pub fn from_config(config: &OrchestratorConfig) -> Self {
        let mut orchestrator = Self::new(build_adapters(config))
            .pacing_delay(Duration::from_millis(config.pacing_delay_ms));
        if config.log_responses {
            orchestrator = orchestrator.logger(Arc::new(JsonFileLogger::new(&config.log_dir)));
        }
        orchestrator
    }

    /// Persists every fan-out through `logger`.
    pub fn logger(mut self, logger: Arc<dyn QueryLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn pacing_delay(mut self, delay: Duration) -> Self {
        self.pacing_delay = delay;
        self
    }

    /// Providers this orchestrator can reach.
    pub fn available_providers(&self) -> Vec<ProviderId> {
        self.adapters.iter().map(|a| a.provider()).collect()
    }

    /// Queries every available provider.
    pub async fn query(&self, prompt: &str) -> Result<QueryResultSet, LLMError> {
        self.query_all(prompt, None).await
    }

    /// Queries the available providers named in `providers` (all of them when
    /// `None`) concurrently and waits for every call to finish.
    ///
    /// Provider failures are reported inside the returned set. The only error
    /// is a blank prompt. A failed log write is reported at `warn` and does
    /// not affect the result.
    pub async fn query_all(
        &self,
        prompt: &str,
        providers: Option<&[ProviderId]>,
    ) -> Result<QueryResultSet, LLMError> {
        if prompt.trim().is_empty() {
            return Err(LLMError::InvalidRequest("prompt must not be empty".to_string()));
        }

        let futures = self
            .adapters
            .iter()
            .filter(|adapter| providers.map_or(true, |wanted| wanted.contains(&adapter.provider())))
            .map(|adapter| async move {
                let id = adapter.provider();
                (id, AssertUnwindSafe(adapter.query(prompt)).catch_unwind().await)
            });

        let results = self.collect_results(join_all(futures).await);

        if let Some(logger) = &self.logger {
            let entry = QueryLogEntry::new(prompt, &results);
            if let Err(err) = logger.record(&entry).await {
                log::warn!("Failed to log query results: {err}");
            }
        }

        Ok(results)
    }

    fn collect_results(
        &self,
        outcomes: Vec<(ProviderId, Result<QueryResult, Box<dyn Any + Send>>)>,
    ) -> QueryResultSet {
        outcomes
            .into_iter()
            .filter_map(|(id, outcome)| match outcome {
                Ok(result) => Some(result),
                Err(panic) => {
                    log::error!("Error in query for {id}: {}", panic_message(panic.as_ref()));
                    None
                }
            })
            .collect()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg
    } else {
        "adapter panicked"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::adapter::Completion;

    struct Echo(ProviderId);

    #[async_trait]
    impl ProviderAdapter for Echo {
        fn provider(&self) -> ProviderId {
            self.0
        }

        fn model(&self) -> &str {
            "echo"
        }

        async fn send(&self, prompt: &str) -> Result<Completion, LLMError> {
            Ok(Completion {
                text: format!("{}: {prompt}", self.0),
                tokens_used: 1,
            })
        }
    }

    struct Panics;

    #[async_trait]
    impl ProviderAdapter for Panics {
        fn provider(&self) -> ProviderId {
            ProviderId::Google
        }

        fn model(&self) -> &str {
            "broken"
        }

        async fn send(&self, _prompt: &str) -> Result<Completion, LLMError> {
            panic!("adapter bug")
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(String, usize)>>);

    #[async_trait]
    impl QueryLogger for Recorder {
        async fn record(&self, entry: &QueryLogEntry<'_>) -> Result<(), LLMError> {
            self.0
                .lock()
                .unwrap()
                .push((entry.prompt.to_string(), entry.results.len()));
            Ok(())
        }
    }

    struct Failing;

    #[async_trait]
    impl QueryLogger for Failing {
        async fn record(&self, _entry: &QueryLogEntry<'_>) -> Result<(), LLMError> {
            Err(LLMError::LogWrite("disk full".to_string()))
        }
    }

    fn all_echo() -> Orchestrator {
        Orchestrator::new(
            ProviderId::ALL
                .into_iter()
                .map(|id| Box::new(Echo(id)) as Box<dyn ProviderAdapter>)
                .collect(),
        )
    }

    #[tokio::test]
    async fn restricts_to_requested_providers() {
        let results = all_echo()
            .query_all("ping", Some(&[ProviderId::Anthropic]))
            .await
            .unwrap();
        assert_eq!(results.providers().collect::<Vec<_>>(), vec![ProviderId::Anthropic]);
        assert_eq!(
            results.get(ProviderId::Anthropic).unwrap().response(),
            Some("anthropic: ping")
        );
    }

    #[tokio::test]
    async fn panicking_adapter_is_dropped_others_survive() {
        let adapters: Vec<Box<dyn ProviderAdapter>> =
            vec![Box::new(Echo(ProviderId::OpenAI)), Box::new(Panics)];
        let orchestrator = Orchestrator::new(adapters);
        let results = orchestrator.query("ping").await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(results.contains(ProviderId::OpenAI));
        assert!(!results.contains(ProviderId::Google));
    }

    #[tokio::test]
    async fn blank_prompt_is_rejected() {
        let err = all_echo().query("  \n").await.unwrap_err();
        assert!(matches!(err, LLMError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn logger_sees_every_fan_out() {
        let recorder = Arc::new(Recorder::default());
        let orchestrator = all_echo().logger(recorder.clone());

        orchestrator.query("one").await.unwrap();
        orchestrator
            .query_all("two", Some(&[ProviderId::Google]))
            .await
            .unwrap();

        let seen = recorder.0.lock().unwrap().clone();
        assert_eq!(seen, vec![("one".to_string(), 3), ("two".to_string(), 1)]);
    }

    #[tokio::test]
    async fn log_failure_keeps_results() {
        let results = all_echo().logger(Arc::new(Failing)).query("ping").await.unwrap();
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn duplicate_adapters_keep_the_first() {
        let adapters: Vec<Box<dyn ProviderAdapter>> = vec![
            Box::new(Echo(ProviderId::OpenAI)),
            Box::new(Echo(ProviderId::OpenAI)),
        ];
        let orchestrator = Orchestrator::new(adapters);
        assert_eq!(orchestrator.available_providers(), vec![ProviderId::OpenAI]);
    }

    #[test]
    fn from_config_without_keys_has_no_providers() {
        let orchestrator = Orchestrator::from_config(&OrchestratorConfig::default());
        assert!(orchestrator.available_providers().is_empty());
        assert!(orchestrator.logger.is_some());
        assert_eq!(orchestrator.pacing_delay, Duration::from_millis(500));
    }
}
