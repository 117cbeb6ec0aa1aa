//! OpenAI chat completions client.

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

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 500;
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant that provides accurate information about automotive dealers. Be specific and factual.";

/// Configuration for the OpenAI client.
#[derive(Debug)]
pub struct OpenAIConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub system: String,
    pub timeout_seconds: Option<u64>,
}

/// Client for OpenAI's chat completions endpoint.
///
/// The client uses `Arc` internally for configuration, making cloning cheap.
#[derive(Debug, Clone)]
pub struct OpenAI {
    pub config: Arc<OpenAIConfig>,
    pub client: Client,
}

#[derive(Serialize)]
struct OpenAIChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct OpenAIChatRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize, Debug)]
struct OpenAIChatResponse {
    choices: Vec<OpenAIChatChoice>,
    usage: Option<Usage>,
}

#[derive(Deserialize, Debug)]
struct OpenAIChatChoice {
    message: OpenAIChatMsg,
}

#[derive(Deserialize, Debug)]
struct OpenAIChatMsg {
    content: Option<String>,
}

impl OpenAI {
    pub fn new(
        api_key: SecretString,
        base_url: Option<String>,
        model: Option<String>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
        timeout_seconds: Option<u64>,
        system: Option<String>,
    ) -> Self {
        Self::with_client(
            Client::new(),
            api_key,
            base_url,
            model,
            max_tokens,
            temperature,
            timeout_seconds,
            system,
        )
    }

    /// Creates a new OpenAI client with a custom HTTP client.
    #[allow(clippy::too_many_arguments)]
    pub fn with_client(
        client: Client,
        api_key: SecretString,
        base_url: Option<String>,
        model: Option<String>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
        timeout_seconds: Option<u64>,
        system: Option<String>,
    ) -> Self {
        Self {
            config: Arc::new(OpenAIConfig {
                api_key,
                base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                max_tokens: max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
                temperature: temperature.unwrap_or(DEFAULT_TEMPERATURE),
                system: system.unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
                timeout_seconds,
            }),
            client,
        }
    }
}

#[async_trait]
impl ProviderAdapter for OpenAI {
    fn provider(&self) -> ProviderId {
        ProviderId::OpenAI
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn send(&self, prompt: &str) -> Result<Completion, LLMError> {
        let api_key = self.config.api_key.expose_secret();
        if api_key.trim().is_empty() {
            return Err(LLMError::AuthError("Missing OpenAI API key".to_string()));
        }

        let body = OpenAIChatRequest {
            model: &self.config.model,
            messages: vec![
                OpenAIChatMessage {
                    role: "system",
                    content: &self.config.system,
                },
                OpenAIChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };
        trace_payload("OpenAI", &body);

        let mut request = self
            .client
            .post(endpoint(&self.config.base_url, "chat/completions"))
            .bearer_auth(api_key)
            .json(&body);
        if let Some(timeout) = self.config.timeout_seconds {
            request = request.timeout(Duration::from_secs(timeout));
        }

        let resp: OpenAIChatResponse = decode_response("OpenAI", request.send().await?).await?;

        let text = resp
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                LLMError::ProviderError("OpenAI reply has no message content".to_string())
            })?;

        Ok(Completion {
            text,
            tokens_used: resp.usage.map(|u| u.total()).unwrap_or(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn client(base_url: String) -> OpenAI {
        OpenAI::new(
            SecretString::new("sk-test".to_string()),
            Some(base_url),
            None,
            None,
            None,
            None,
            None,
        )
    }

    #[tokio::test]
    async fn sends_system_and_user_messages() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(json!({
                "model": "gpt-4",
                "max_tokens": 500,
                "messages": [
                    {"role": "system", "content": DEFAULT_SYSTEM_PROMPT},
                    {"role": "user", "content": "ping"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "choices": [{"message": {"role": "assistant", "content": "pong"}}],
                    "usage": {"prompt_tokens": 20, "completion_tokens": 2, "total_tokens": 22}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let result = client(server.url()).query("ping").await;

        mock.assert_async().await;
        assert_eq!(result.response(), Some("pong"));
        assert_eq!(result.tokens_used(), 22);
        assert_eq!(result.model(), "gpt-4");
        assert!(result.error().is_none());
    }

    #[tokio::test]
    async fn missing_usage_reports_zero_tokens() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(json!({"choices": [{"message": {"content": "hi"}}]}).to_string())
            .create_async()
            .await;

        let result = client(server.url()).query("ping").await;
        assert_eq!(result.response(), Some("hi"));
        assert_eq!(result.tokens_used(), 0);
    }

    #[tokio::test]
    async fn rate_limit_becomes_error_result() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body(r#"{"error":{"message":"Rate limit reached"}}"#)
            .create_async()
            .await;

        let result = client(server.url()).query("ping").await;
        assert!(result.response().is_none());
        let error = result.error().unwrap();
        assert!(error.contains("429"));
        assert!(error.contains("Rate limit reached"));
        assert_eq!(result.latency_ms(), 0.0);
    }

    #[tokio::test]
    async fn malformed_payload_becomes_error_result() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let result = client(server.url()).query("ping").await;
        assert!(result.error().unwrap().contains("Response format error"));
    }

    #[tokio::test]
    async fn null_content_is_a_provider_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(json!({"choices": [{"message": {"role": "assistant", "content": null}}]}).to_string())
            .create_async()
            .await;

        let result = client(server.url()).query("ping").await;
        assert_eq!(
            result.error(),
            Some("Provider error: OpenAI reply has no message content")
        );
    }

    #[tokio::test]
    async fn blank_key_never_hits_the_network() {
        let adapter = OpenAI::new(
            SecretString::new(String::new()),
            Some("http://127.0.0.1:9".to_string()),
            None,
            None,
            None,
            None,
            None,
        );
        let err = adapter.send("ping").await.unwrap_err();
        assert!(matches!(err, LLMError::AuthError(_)));
    }
}
