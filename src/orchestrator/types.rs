use chrono::{DateTime, Local};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

use crate::{error::LLMError, result::QueryResultSet};

/// One entry of an audit batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditQuery {
    /// Caller supplied identifier; `q000`, `q001`, ... when absent
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    pub text: String,
    /// Answers the caller hopes to see, e.g. dealer names
    #[serde(
        default,
        alias = "expected_dealers",
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub expected: Vec<String>,
    /// Any other fields on the descriptor, carried through untouched
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl AuditQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: None,
            text: text.into(),
            expected: Vec::new(),
            metadata: Map::new(),
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn expected<I, S>(mut self, answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expected = answers.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum QueryId {
    Text(String),
    Number(Number),
}

/// Numeric ids are kept as their decimal text.
fn string_or_number<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<QueryId>::deserialize(de)?.map(|id| match id {
        QueryId::Text(text) => text,
        QueryId::Number(n) => n.to_string(),
    }))
}

fn null_as_empty<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(de)?.unwrap_or_default())
}

/// The outcome of running one [`AuditQuery`] across the available providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub query_id: String,
    pub query_text: String,
    #[serde(default)]
    pub expected: Vec<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
    pub results: QueryResultSet,
    /// When this query's fan-out finished
    pub timestamp: DateTime<Local>,
}

/// Parses a JSON array of query descriptors.
///
/// A descriptor that is not an object or lacks `text` fails with
/// [`LLMError::InvalidQuery`] naming its position.
pub fn parse_queries(json: &str) -> Result<Vec<AuditQuery>, LLMError> {
    let entries: Vec<Value> = serde_json::from_str(json)?;
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_json::from_value(entry).map_err(|err| LLMError::InvalidQuery {
                index,
                reason: err.to_string(),
            })
        })
        .collect()
}
