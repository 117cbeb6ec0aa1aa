//! Normalised provider outcomes.
//!
//! A [`QueryResult`] always carries exactly one of a response or an error.
//! The constructors are the only way to build one, and deserialisation
//! rejects payloads that break the rule.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::provider::ProviderId;

/// One provider's outcome for one prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawQueryResult")]
pub struct QueryResult {
    provider: ProviderId,
    model: String,
    response: Option<String>,
    tokens_used: u32,
    latency_ms: f64,
    error: Option<String>,
}

impl QueryResult {
    /// A completed call. Latency is rounded to two decimals.
    pub fn success(
        provider: ProviderId,
        model: impl Into<String>,
        response: impl Into<String>,
        tokens_used: u32,
        latency: Duration,
    ) -> Self {
        let latency_ms = (latency.as_secs_f64() * 1000.0 * 100.0).round() / 100.0;
        Self {
            provider,
            model: model.into(),
            response: Some(response.into()),
            tokens_used,
            latency_ms,
            error: None,
        }
    }

    /// A failed call. Tokens and latency are reported as zero.
    pub fn failure(provider: ProviderId, model: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            response: None,
            tokens_used: 0,
            latency_ms: 0.0,
            error: Some(error.into()),
        }
    }

    pub fn provider(&self) -> ProviderId {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn response(&self) -> Option<&str> {
        self.response.as_deref()
    }

    pub fn tokens_used(&self) -> u32 {
        self.tokens_used
    }

    pub fn latency_ms(&self) -> f64 {
        self.latency_ms
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.response.is_some()
    }
}

#[derive(Deserialize)]
struct RawQueryResult {
    provider: ProviderId,
    model: String,
    response: Option<String>,
    #[serde(default)]
    tokens_used: u32,
    #[serde(default)]
    latency_ms: f64,
    error: Option<String>,
}

impl TryFrom<RawQueryResult> for QueryResult {
    type Error = String;

    fn try_from(raw: RawQueryResult) -> Result<Self, Self::Error> {
        match (&raw.response, &raw.error) {
            (Some(_), None) | (None, Some(_)) => {}
            (Some(_), Some(_)) => {
                return Err("query result has both a response and an error".to_string())
            }
            (None, None) => {
                return Err("query result has neither a response nor an error".to_string())
            }
        }
        if !raw.latency_ms.is_finite() || raw.latency_ms < 0.0 {
            return Err(format!("invalid latency_ms: {}", raw.latency_ms));
        }
        Ok(Self {
            provider: raw.provider,
            model: raw.model,
            response: raw.response,
            tokens_used: raw.tokens_used,
            latency_ms: raw.latency_ms,
            error: raw.error,
        })
    }
}

/// Results for a single prompt, keyed by provider.
///
/// A provider missing from the set was not queried, which is different from
/// a provider present with an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryResultSet {
    results: BTreeMap<ProviderId, QueryResult>,
}

impl QueryResultSet {
    pub fn get(&self, provider: ProviderId) -> Option<&QueryResult> {
        self.results.get(&provider)
    }

    pub fn contains(&self, provider: ProviderId) -> bool {
        self.results.contains_key(&provider)
    }

    pub fn providers(&self) -> impl Iterator<Item = ProviderId> + '_ {
        self.results.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProviderId, &QueryResult)> {
        self.results.iter().map(|(id, result)| (*id, result))
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Number of providers that answered without error.
    pub fn success_count(&self) -> usize {
        self.results.values().filter(|r| r.is_success()).count()
    }
}

impl FromIterator<QueryResult> for QueryResultSet {
    fn from_iter<I: IntoIterator<Item = QueryResult>>(iter: I) -> Self {
        Self {
            results: iter.into_iter().map(|r| (r.provider, r)).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a QueryResultSet {
    type Item = (&'a ProviderId, &'a QueryResult);
    type IntoIter = std::collections::btree_map::Iter<'a, ProviderId, QueryResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}
