use serde::{Deserialize, Serialize};

use crate::error::LLMError;

/// Hosted LLM services the orchestrator knows how to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    OpenAI,
    Anthropic,
    Google,
}

impl ProviderId {
    /// Every provider, in the order they are queried by default.
    pub const ALL: [ProviderId; 3] = [ProviderId::OpenAI, ProviderId::Anthropic, ProviderId::Google];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenAI => "openai",
            ProviderId::Anthropic => "anthropic",
            ProviderId::Google => "google",
        }
    }

    /// Environment variable holding the provider's API key.
    pub fn default_key_env(&self) -> &'static str {
        match self {
            ProviderId::OpenAI => "OPENAI_API_KEY",
            ProviderId::Anthropic => "ANTHROPIC_API_KEY",
            ProviderId::Google => "GOOGLE_API_KEY",
        }
    }

    /// Parses a comma separated list such as `"openai, google"`.
    ///
    /// Duplicates are collapsed and empty segments ignored.
    pub fn parse_list(raw: &str) -> Result<Vec<ProviderId>, LLMError> {
        let mut ids = Vec::new();
        for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let id: ProviderId = part.parse()?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderId {
    type Err = LLMError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderId::OpenAI),
            "anthropic" => Ok(ProviderId::Anthropic),
            "google" => Ok(ProviderId::Google),
            _ => Err(LLMError::InvalidRequest(format!("Unknown provider: {s}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("openai", ProviderId::OpenAI)]
    #[case("OpenAI", ProviderId::OpenAI)]
    #[case(" anthropic ", ProviderId::Anthropic)]
    #[case("GOOGLE", ProviderId::Google)]
    fn parses_known_names(#[case] raw: &str, #[case] expected: ProviderId) {
        assert_eq!(raw.parse::<ProviderId>().unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_name() {
        let err = "perplexity".parse::<ProviderId>().unwrap_err();
        assert!(matches!(err, LLMError::InvalidRequest(_)));
    }

    #[test]
    fn parse_list_dedups_and_skips_blanks() {
        let ids = ProviderId::parse_list("google,, openai,google").unwrap();
        assert_eq!(ids, vec![ProviderId::Google, ProviderId::OpenAI]);
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&ProviderId::OpenAI).unwrap();
        assert_eq!(json, "\"openai\"");
        assert_eq!(ProviderId::Anthropic.to_string(), "anthropic");
    }
}
