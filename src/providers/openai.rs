use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::{Client, header};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ChatMessage, CompletionRequest, CompletionResponse, Provider};
use crate::errors::ProviderError;

/// Client for an OpenAI-compatible chat completions endpoint
#[derive(Debug)]
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// Full chat completions URL
    endpoint: String,
    /// Model identifier sent with every request
    model: String,
    /// Bearer token, sent only when non-empty
    api_key: String,
}

/// Chat completions request body
#[derive(Debug, Serialize)]
pub struct OpenAIRequest<'a> {
    /// The model to use
    model: &'a str,

    /// The messages for the conversation
    messages: &'a [ChatMessage],

    /// Temperature for generation
    temperature: f32,

    /// Maximum number of tokens to generate
    max_tokens: u32,
}

/// Chat completions response body
#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    /// Completion choices
    #[serde(default)]
    pub choices: Vec<OpenAIChoice>,

    /// Token usage information
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

/// One completion choice
#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    /// Chat style message
    #[serde(default)]
    pub message: Option<OpenAIMessage>,

    /// Legacy completion text
    #[serde(default)]
    pub text: Option<String>,
}

/// Message inside a choice
#[derive(Debug, Deserialize)]
pub struct OpenAIMessage {
    /// Message content, may be null
    #[serde(default)]
    pub content: Option<String>,
}

/// Token usage information
#[derive(Debug, Deserialize)]
pub struct TokenUsage {
    /// Number of prompt tokens
    #[serde(default)]
    pub prompt_tokens: Option<u64>,
    /// Number of completion tokens
    #[serde(default)]
    pub completion_tokens: Option<u64>,
}

impl OpenAI {
    /// Create a new client
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                warn!("Could not build HTTP client with a {}s timeout, using defaults: {}", timeout_secs, e);
                Client::new()
            });

        Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    /// Extract text from a response: first choice's message content, else its
    /// `text` field, trimmed
    pub fn extract_text_from_response(response: &OpenAIResponse) -> String {
        let Some(choice) = response.choices.first() else {
            return String::new();
        };

        let content = choice
            .message
            .as_ref()
            .and_then(|message| message.content.as_deref())
            .map(str::trim)
            .filter(|content| !content.is_empty());

        content
            .or_else(|| choice.text.as_deref().map(str::trim))
            .unwrap_or_default()
            .to_string()
    }

    fn map_send_error(error: reqwest::Error) -> ProviderError {
        if error.is_timeout() || error.is_connect() {
            ProviderError::ConnectionError(error.to_string())
        } else {
            ProviderError::RequestFailed(error.to_string())
        }
    }
}

#[async_trait]
impl Provider for OpenAI {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let body = OpenAIRequest {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let mut builder = self
            .client
            .post(&self.endpoint)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body);
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }

        let response = builder.send().await.map_err(Self::map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Completion API error ({}): {}", status, error_text);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: error_text,
            });
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        let parsed: OpenAIResponse = serde_json::from_str(&response_text).map_err(|e| {
            debug!(
                "Unparsable completion response (first 200 chars): {}",
                response_text.chars().take(200).collect::<String>()
            );
            ProviderError::ParseError(e.to_string())
        })?;

        let text = Self::extract_text_from_response(&parsed);
        if text.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        Ok(CompletionResponse {
            text,
            prompt_tokens: parsed.usage.as_ref().and_then(|usage| usage.prompt_tokens),
            completion_tokens: parsed.usage.as_ref().and_then(|usage| usage.completion_tokens),
        })
    }
}
