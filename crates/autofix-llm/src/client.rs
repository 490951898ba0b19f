use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};

use autofix_extract::ErrorRecord;

use crate::response::{extract_file_content, keep_final_newline, ChatCompletionResponse};
use crate::{FileType, FixPrompts};

pub const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Longest response body kept in an error message
const MAX_ERROR_BODY_LEN: usize = 500;

#[derive(Error, Debug)]
pub enum FixError {
    #[error("No API credential configured for the completion service")]
    MissingCredential,

    #[error("Completion request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Completion service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected response format from completion service: {0}")]
    MalformedResponse(String),
}

impl FixError {
    /// Configuration errors abort the run; everything else only costs the attempt.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FixError::MissingCredential)
    }
}

/// Everything needed to ask for one file's repair
#[derive(Debug, Clone, Copy)]
pub struct FixRequest<'a> {
    pub file_path: &'a str,
    pub content: &'a str,
    pub errors: &'a [ErrorRecord],
    pub file_type: FileType,
    pub attempt: u32,
}

/// The seam the repair loop asks for replacement file content
#[async_trait]
pub trait FixRequester: Send + Sync {
    /// Return the full replacement content for `request.file_path`
    async fn request_fix(&self, request: FixRequest<'_>) -> Result<String, FixError>;
}

/// Request parameters for the completion endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSettings {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            endpoint: OPENAI_CHAT_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.2,
            max_tokens: 4096,
        }
    }
}

/// [`FixRequester`] backed by an OpenAI-compatible `/chat/completions` endpoint
pub struct ChatCompletionsClient {
    http: reqwest::Client,
    credential: String,
    settings: CompletionSettings,
}

impl std::fmt::Debug for ChatCompletionsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsClient")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl ChatCompletionsClient {
    /// Fails with [`FixError::MissingCredential`] when no usable key is given.
    pub fn new(credential: Option<String>, settings: CompletionSettings) -> Result<Self, FixError> {
        let credential = credential
            .filter(|c| !c.trim().is_empty())
            .ok_or(FixError::MissingCredential)?;
        Ok(Self {
            http: reqwest::Client::new(),
            credential,
            settings,
        })
    }
}

#[async_trait]
impl FixRequester for ChatCompletionsClient {
    async fn request_fix(&self, request: FixRequest<'_>) -> Result<String, FixError> {
        let prompt = FixPrompts::build_fix_prompt(
            request.file_path,
            request.file_type,
            request.attempt,
            request.errors,
            request.content,
        );

        debug!(
            file = request.file_path,
            attempt = request.attempt,
            prompt_len = prompt.len(),
            "Requesting fix"
        );

        let response = self
            .http
            .post(&self.settings.endpoint)
            .bearer_auth(&self.credential)
            .json(&json!({
                "model": self.settings.model,
                "messages": [{"role": "user", "content": prompt}],
                "temperature": self.settings.temperature,
                "max_tokens": self.settings.max_tokens,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FixError::Status {
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY_LEN).to_string(),
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| FixError::MalformedResponse(e.to_string()))?;

        let reply = parsed
            .first_content()
            .ok_or_else(|| FixError::MalformedResponse("no choice with message content".into()))?;

        info!(
            file = request.file_path,
            attempt = request.attempt,
            reply_len = reply.len(),
            "Fix received"
        );

        Ok(keep_final_newline(extract_file_content(&reply), request.content))
    }
}

fn truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_is_fatal() {
        let err = ChatCompletionsClient::new(None, CompletionSettings::default()).unwrap_err();
        assert!(matches!(err, FixError::MissingCredential));
        assert!(err.is_fatal());

        let blank = ChatCompletionsClient::new(Some("  ".into()), CompletionSettings::default());
        assert!(matches!(blank, Err(FixError::MissingCredential)));
    }

    #[test]
    fn test_status_errors_are_not_fatal() {
        let err = FixError::Status {
            status: 500,
            body: "boom".into(),
        };
        assert!(!err.is_fatal());
        assert_eq!(err.to_string(), "Completion service returned HTTP 500: boom");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "h");
        assert_eq!(truncate("short", 10), "short");
    }

    #[test]
    fn test_default_settings() {
        let settings = CompletionSettings::default();
        assert_eq!(settings.endpoint, OPENAI_CHAT_URL);
        assert_eq!(settings.model, "gpt-3.5-turbo");
        assert!((settings.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(settings.max_tokens, 4096);
    }
}
