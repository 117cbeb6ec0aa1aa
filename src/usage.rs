use serde::{Deserialize, Serialize};

/// Token usage reported by a provider.
///
/// Each provider names these fields differently; the aliases cover the
/// OpenAI, Anthropic and Gemini spellings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Number of tokens in the prompt
    #[serde(default, alias = "input_tokens", alias = "promptTokenCount")]
    pub prompt_tokens: Option<u32>,
    /// Number of tokens in the completion
    #[serde(default, alias = "output_tokens", alias = "candidatesTokenCount")]
    pub completion_tokens: Option<u32>,
    /// Total number of tokens used, when the provider reports one
    #[serde(default, alias = "totalTokenCount")]
    pub total_tokens: Option<u32>,
}

impl Usage {
    /// Single token count for a call.
    ///
    /// Prefers the provider's own total and falls back to prompt + completion.
    pub fn total(&self) -> u32 {
        self.total_tokens.unwrap_or_else(|| {
            self.prompt_tokens
                .unwrap_or(0)
                .saturating_add(self.completion_tokens.unwrap_or(0))
        })
    }
}
