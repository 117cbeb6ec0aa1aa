use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::provider::ProviderId;

use super::types::AuditRecord;

/// Per-provider counters across an audit batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProviderStats {
    pub queried: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub total_tokens: u64,
    /// Mean over successful calls only
    pub mean_latency_ms: f64,
}

/// Totals for a finished batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuditSummary {
    pub queries: usize,
    /// Queries for which no provider returned a response
    pub unanswered: usize,
    pub providers: BTreeMap<ProviderId, ProviderStats>,
}

impl AuditSummary {
    pub fn from_records(records: &[AuditRecord]) -> Self {
        let mut providers: BTreeMap<ProviderId, ProviderStats> = BTreeMap::new();
        let mut latency_sums: BTreeMap<ProviderId, f64> = BTreeMap::new();
        let mut unanswered = 0;

        for record in records {
            if record.results.success_count() == 0 {
                unanswered += 1;
            }
            for (id, result) in record.results.iter() {
                let stats = providers.entry(id).or_default();
                stats.queried += 1;
                stats.total_tokens += u64::from(result.tokens_used());
                if result.is_success() {
                    stats.succeeded += 1;
                    *latency_sums.entry(id).or_default() += result.latency_ms();
                } else {
                    stats.failed += 1;
                }
            }
        }

        for (id, stats) in providers.iter_mut() {
            if stats.succeeded > 0 {
                let sum = latency_sums.get(id).copied().unwrap_or_default();
                stats.mean_latency_ms = (sum / stats.succeeded as f64 * 100.0).round() / 100.0;
            }
        }

        Self {
            queries: records.len(),
            unanswered,
            providers,
        }
    }
}

impl fmt::Display for AuditSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Audit Summary:")?;
        writeln!(f, "------------------------------------")?;
        writeln!(f, "Queries: {} ({} unanswered)", self.queries, self.unanswered)?;
        if self.providers.is_empty() {
            return writeln!(f, "No providers were queried.");
        }
        for (id, stats) in &self.providers {
            writeln!(
                f,
                "{:<10} ok {:>3}  failed {:>3}  tokens {:>7}  mean latency {:>9.2} ms",
                id.as_str(),
                stats.succeeded,
                stats.failed,
                stats.total_tokens,
                stats.mean_latency_ms
            )?;
        }
        Ok(())
    }
}
