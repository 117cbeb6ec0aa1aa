use std::time::Instant;

use async_trait::async_trait;

use crate::{error::LLMError, provider::ProviderId, result::QueryResult};

/// Text and token count returned by a successful provider call.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub tokens_used: u32,
}

/// A client for one hosted provider.
///
/// Implementors only write [`send`](ProviderAdapter::send); the provided
/// [`query`](ProviderAdapter::query) is the boundary the orchestrator calls
/// and never fails.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn provider(&self) -> ProviderId;

    fn model(&self) -> &str;

    /// Issues exactly one request for `prompt`.
    async fn send(&self, prompt: &str) -> Result<Completion, LLMError>;

    /// Runs [`send`](ProviderAdapter::send) and folds the outcome into a
    /// [`QueryResult`]. Latency is wall clock on success and zero on failure.
    async fn query(&self, prompt: &str) -> QueryResult {
        let start = Instant::now();
        match self.send(prompt).await {
            Ok(completion) => QueryResult::success(
                self.provider(),
                self.model(),
                completion.text,
                completion.tokens_used,
                start.elapsed(),
            ),
            Err(err) => {
                log::warn!("Error from provider {}: {err}", self.provider());
                QueryResult::failure(self.provider(), self.model(), err.to_string())
            }
        }
    }
}
