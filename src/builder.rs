//! Turns an [`OrchestratorConfig`] into the adapters the orchestrator runs.
//!
//! A provider without a usable credential gets no adapter at all, so it is
//! left out of every result set rather than reported as an error.

use secrecy::{ExposeSecret, SecretString};

use crate::{
    adapter::ProviderAdapter,
    backends::{anthropic::Anthropic, google::Google, openai::OpenAI},
    config::{OrchestratorConfig, ProviderSettings},
    provider::ProviderId,
};

/// Builds one adapter per configured provider, in [`ProviderId::ALL`] order.
pub fn build_adapters(config: &OrchestratorConfig) -> Vec<Box<dyn ProviderAdapter>> {
    ProviderId::ALL
        .into_iter()
        .filter_map(|id| build_adapter(id, config))
        .collect()
}

/// Builds the adapter for `id`, or `None` when it has no credential.
pub fn build_adapter(id: ProviderId, config: &OrchestratorConfig) -> Option<Box<dyn ProviderAdapter>> {
    let settings = config.provider(id);
    let Some(api_key) = require_api_key(settings) else {
        log::debug!("Skipping {id}: no API key configured");
        return None;
    };
    log_settings(id, settings);

    let adapter: Box<dyn ProviderAdapter> = match id {
        ProviderId::OpenAI => Box::new(OpenAI::new(
            api_key,
            settings.base_url.clone(),
            settings.model.clone(),
            settings.max_tokens,
            settings.temperature,
            settings.timeout_seconds,
            config.system_prompt.clone(),
        )),
        ProviderId::Anthropic => Box::new(Anthropic::new(
            api_key,
            settings.base_url.clone(),
            settings.model.clone(),
            settings.max_tokens,
            settings.temperature,
            settings.timeout_seconds,
        )),
        ProviderId::Google => Box::new(Google::new(
            api_key,
            settings.base_url.clone(),
            settings.model.clone(),
            settings.max_tokens,
            settings.temperature,
            settings.timeout_seconds,
        )),
    };
    Some(adapter)
}

fn require_api_key(settings: &ProviderSettings) -> Option<SecretString> {
    settings
        .credential()
        .map(|key| SecretString::new(key.expose_secret().clone()))
}

fn log_settings(id: ProviderId, settings: &ProviderSettings) {
    log::debug!(
        "Building {id} adapter. model={:?} base_url={:?} temp={:?} max_tokens={:?} timeout={:?}",
        settings.model,
        settings.base_url,
        settings.temperature,
        settings.max_tokens,
        settings.timeout_seconds,
    );
}
