//! Anthropic messages API client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::{
    adapter::{Completion, ProviderAdapter},
    error::LLMError,
    provider::ProviderId,
    usage::Usage,
};

use super::{decode_response, endpoint, trace_payload};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const DEFAULT_MAX_TOKENS: u32 = 500;
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Configuration for the Anthropic client.
#[derive(Debug)]
pub struct AnthropicConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    /// Only forwarded when set
    pub temperature: Option<f32>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Anthropic {
    pub config: Arc<AnthropicConfig>,
    pub client: Client,
}

#[derive(Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<AnthropicMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize, Debug)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicContent>,
    usage: Option<Usage>,
}

#[derive(Deserialize, Debug)]
struct AnthropicContent {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

impl Anthropic {
    pub fn new(
        api_key: SecretString,
        base_url: Option<String>,
        model: Option<String>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
        timeout_seconds: Option<u64>,
    ) -> Self {
        Self::with_client(
            Client::new(),
            api_key,
            base_url,
            model,
            max_tokens,
            temperature,
            timeout_seconds,
        )
    }

    pub fn with_client(
        client: Client,
        api_key: SecretString,
        base_url: Option<String>,
        model: Option<String>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
        timeout_seconds: Option<u64>,
    ) -> Self {
        Self {
            config: Arc::new(AnthropicConfig {
                api_key,
                base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                max_tokens: max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
                temperature,
                timeout_seconds,
            }),
            client,
        }
    }
}

#[async_trait]
impl ProviderAdapter for Anthropic {
    fn provider(&self) -> ProviderId {
        ProviderId::Anthropic
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn send(&self, prompt: &str) -> Result<Completion, LLMError> {
        let api_key = self.config.api_key.expose_secret();
        if api_key.trim().is_empty() {
            return Err(LLMError::AuthError("Missing Anthropic API key".to_string()));
        }

        let body = AnthropicRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
        };
        trace_payload("Anthropic", &body);

        let mut request = self
            .client
            .post(endpoint(&self.config.base_url, "messages"))
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body);
        if let Some(timeout) = self.config.timeout_seconds {
            request = request.timeout(Duration::from_secs(timeout));
        }

        let resp: AnthropicResponse =
            decode_response("Anthropic", request.send().await?).await?;

        let text = resp
            .content
            .into_iter()
            .find(|block| block.content_type == "text")
            .and_then(|block| block.text)
            .ok_or_else(|| {
                LLMError::ProviderError("Anthropic reply has no text content".to_string())
            })?;

        Ok(Completion {
            text,
            tokens_used: resp.usage.map(|u| u.total()).unwrap_or(0),
        })
    }
}
