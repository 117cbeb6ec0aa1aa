//! Google Gemini `generateContent` client.

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

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-pro";

/// Configuration for the Google client.
#[derive(Debug)]
pub struct GoogleConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub model: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Google {
    pub config: Arc<GoogleConfig>,
    pub client: Client,
}

#[derive(Serialize)]
struct GooglePart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GoogleContent<'a> {
    parts: Vec<GooglePart<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GoogleGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GoogleRequest<'a> {
    contents: Vec<GoogleContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GoogleGenerationConfig>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GoogleResponse {
    #[serde(default)]
    candidates: Vec<GoogleCandidate>,
    usage_metadata: Option<Usage>,
}

#[derive(Deserialize, Debug)]
struct GoogleCandidate {
    content: Option<GoogleCandidateContent>,
}

#[derive(Deserialize, Debug)]
struct GoogleCandidateContent {
    #[serde(default)]
    parts: Vec<GoogleResponsePart>,
}

#[derive(Deserialize, Debug)]
struct GoogleResponsePart {
    text: Option<String>,
}

impl Google {
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
            config: Arc::new(GoogleConfig {
                api_key,
                base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                max_tokens,
                temperature,
                timeout_seconds,
            }),
            client,
        }
    }

    fn generation_config(&self) -> Option<GoogleGenerationConfig> {
        if self.config.temperature.is_none() && self.config.max_tokens.is_none() {
            return None;
        }
        Some(GoogleGenerationConfig {
            temperature: self.config.temperature,
            max_output_tokens: self.config.max_tokens,
        })
    }
}

#[async_trait]
impl ProviderAdapter for Google {
    fn provider(&self) -> ProviderId {
        ProviderId::Google
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn send(&self, prompt: &str) -> Result<Completion, LLMError> {
        let api_key = self.config.api_key.expose_secret();
        if api_key.trim().is_empty() {
            return Err(LLMError::AuthError("Missing Google API key".to_string()));
        }

        let body = GoogleRequest {
            contents: vec![GoogleContent {
                parts: vec![GooglePart { text: prompt }],
            }],
            generation_config: self.generation_config(),
        };
        trace_payload("Google", &body);

        // Key goes in a header so it never shows up in reqwest's error URLs.
        let path = format!("models/{}:generateContent", self.config.model);
        let mut request = self
            .client
            .post(endpoint(&self.config.base_url, &path))
            .header("x-goog-api-key", api_key)
            .json(&body);
        if let Some(timeout) = self.config.timeout_seconds {
            request = request.timeout(Duration::from_secs(timeout));
        }

        let resp: GoogleResponse = decode_response("Google", request.send().await?).await?;

        let Some(candidate) = resp.candidates.into_iter().next() else {
            return Err(LLMError::ProviderError(
                "No candidates in response".to_string(),
            ));
        };
        let text = candidate
            .content
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| {
                LLMError::ProviderError("Google candidate has no text part".to_string())
            })?;

        Ok(Completion {
            text,
            tokens_used: resp.usage_metadata.map(|u| u.total()).unwrap_or(0),
        })
    }
}
