use tokio::time::sleep;

use crate::{error::LLMError, provider::ProviderId};

use super::fanout::Orchestrator;
use super::types::{AuditQuery, AuditRecord};

const PREVIEW_CHARS: usize = 50;

impl Orchestrator {
    /// Runs every query in order, one after another, pausing for the pacing
    /// delay between consecutive queries.
    ///
    /// All descriptors are validated before the first call; a blank query
    /// text aborts the batch with [`LLMError::InvalidQuery`]. Provider
    /// failures never abort it: each query yields exactly one record.
    pub async fn audit(
        &self,
        queries: &[AuditQuery],
        providers: Option<&[ProviderId]>,
    ) -> Result<Vec<AuditRecord>, LLMError> {
        validate_batch(queries)?;

        let total = queries.len();
        let mut records = Vec::with_capacity(total);
        for (index, query) in queries.iter().enumerate() {
            if index > 0 && !self.pacing_delay.is_zero() {
                sleep(self.pacing_delay).await;
            }
            log::info!(
                "Processing query {}/{}: {}...",
                index + 1,
                total,
                preview(&query.text)
            );

            let results = self.query_all(&query.text, providers).await?;

            records.push(AuditRecord {
                query_id: query.id.clone().unwrap_or_else(|| format!("q{index:03}")),
                query_text: query.text.clone(),
                expected: query.expected.clone(),
                metadata: query.metadata.clone(),
                results,
                timestamp: chrono::Local::now(),
            });
        }
        Ok(records)
    }
}

fn validate_batch(queries: &[AuditQuery]) -> Result<(), LLMError> {
    for (index, query) in queries.iter().enumerate() {
        if query.text.trim().is_empty() {
            return Err(LLMError::InvalidQuery {
                index,
                reason: "query text is empty".to_string(),
            });
        }
    }
    Ok(())
}

fn preview(text: &str) -> &str {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}
