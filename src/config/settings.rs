use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::provider::ProviderId;

const DEFAULT_LOG_DIR: &str = "logs";
/// Pause between consecutive queries of an audit batch.
pub const DEFAULT_PACING_DELAY_MS: u64 = 500;

/// Per-provider connection settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub api_key: Option<SecretString>,
    /// Environment variable to read the key from instead of the default one
    pub api_key_env: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout_seconds: Option<u64>,
}

impl ProviderSettings {
    /// The key, if one is set and not blank.
    pub fn credential(&self) -> Option<&SecretString> {
        self.api_key
            .as_ref()
            .filter(|key| !key.expose_secret().trim().is_empty())
    }

    pub fn is_configured(&self) -> bool {
        self.credential().is_some()
    }
}

/// Everything the orchestrator needs to know to build its adapters and
/// persist results.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub openai: ProviderSettings,
    pub anthropic: ProviderSettings,
    pub google: ProviderSettings,
    /// Reserved for a search-augmented provider; read but never used.
    pub perplexity_api_key: Option<SecretString>,
    pub log_responses: bool,
    pub log_dir: PathBuf,
    pub pacing_delay_ms: u64,
    /// Overrides the OpenAI system prompt
    pub system_prompt: Option<String>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            openai: ProviderSettings::default(),
            anthropic: ProviderSettings::default(),
            google: ProviderSettings::default(),
            perplexity_api_key: None,
            log_responses: true,
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            pacing_delay_ms: DEFAULT_PACING_DELAY_MS,
            system_prompt: None,
        }
    }
}

impl OrchestratorConfig {
    pub fn provider(&self, id: ProviderId) -> &ProviderSettings {
        match id {
            ProviderId::OpenAI => &self.openai,
            ProviderId::Anthropic => &self.anthropic,
            ProviderId::Google => &self.google,
        }
    }

    pub fn provider_mut(&mut self, id: ProviderId) -> &mut ProviderSettings {
        match id {
            ProviderId::OpenAI => &mut self.openai,
            ProviderId::Anthropic => &mut self.anthropic,
            ProviderId::Google => &mut self.google,
        }
    }

    /// Providers with a usable credential.
    pub fn configured_providers(&self) -> Vec<ProviderId> {
        ProviderId::ALL
            .into_iter()
            .filter(|id| self.provider(*id).is_configured())
            .collect()
    }

    /// Fills API keys from the environment. Variables that are set win over
    /// keys read from the config file.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok());
    }

    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for id in ProviderId::ALL {
            let settings = self.provider_mut(id);
            let var = settings
                .api_key_env
                .clone()
                .unwrap_or_else(|| id.default_key_env().to_string());
            if let Some(value) = lookup(&var).filter(|v| !v.trim().is_empty()) {
                settings.api_key = Some(SecretString::new(value));
            }
        }
        if let Some(value) = lookup("PERPLEXITY_API_KEY").filter(|v| !v.trim().is_empty()) {
            self.perplexity_api_key = Some(SecretString::new(value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_enable_logging_with_half_second_pacing() {
        let config = OrchestratorConfig::default();
        assert!(config.log_responses);
        assert_eq!(config.log_dir, PathBuf::from("logs"));
        assert_eq!(config.pacing_delay_ms, 500);
        assert!(config.configured_providers().is_empty());
    }

    #[test]
    fn blank_key_is_not_a_credential() {
        let settings = ProviderSettings {
            api_key: Some(SecretString::new("   ".to_string())),
            ..Default::default()
        };
        assert!(!settings.is_configured());
    }

    #[test]
    fn env_keys_fill_matching_providers() {
        let env: HashMap<&str, &str> = [
            ("OPENAI_API_KEY", "sk-test"),
            ("GOOGLE_API_KEY", ""),
            ("PERPLEXITY_API_KEY", "pplx"),
        ]
        .into_iter()
        .collect();

        let mut config = OrchestratorConfig::default();
        config.apply_env_with(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.configured_providers(), vec![ProviderId::OpenAI]);
        assert!(config.perplexity_api_key.is_some());
    }

    #[test]
    fn custom_key_env_name_is_honoured() {
        let mut config = OrchestratorConfig::default();
        config.anthropic.api_key_env = Some("CLAUDE_KEY".to_string());
        config.apply_env_with(|name| (name == "CLAUDE_KEY").then(|| "k".to_string()));
        assert_eq!(config.configured_providers(), vec![ProviderId::Anthropic]);
    }
}
