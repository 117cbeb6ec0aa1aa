//! HTTP adapters for each supported provider.

pub mod anthropic;
pub mod google;
pub mod openai;

use serde::de::DeserializeOwned;

use crate::error::LLMError;

/// Checks the status of a provider reply and decodes its JSON body.
///
/// Authentication failures map to [`LLMError::AuthError`], other non-success
/// statuses to [`LLMError::ProviderError`] carrying the body text.
pub(crate) async fn decode_response<T: DeserializeOwned>(
    provider: &str,
    resp: reqwest::Response,
) -> Result<T, LLMError> {
    let status = resp.status();
    log::debug!("{provider} HTTP status: {status}");
    let body = resp.text().await?;

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(LLMError::AuthError(format!(
            "{provider} rejected the API key ({status}): {body}"
        )));
    }
    if !status.is_success() {
        return Err(LLMError::ProviderError(format!(
            "{provider} returned {status}: {body}"
        )));
    }

    serde_json::from_str(&body).map_err(|err| LLMError::ResponseFormatError {
        message: format!("Failed to decode {provider} response: {err}"),
        raw_response: body,
    })
}

pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}

pub(crate) fn trace_payload<T: serde::Serialize>(provider: &str, body: &T) {
    if log::log_enabled!(log::Level::Trace) {
        if let Ok(json) = serde_json::to_string(body) {
            log::trace!("{provider} request payload: {json}");
        }
    }
}
