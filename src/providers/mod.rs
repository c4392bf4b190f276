/*!
 * Provider implementations for completion endpoints.
 *
 * This module contains the client used to reach a language model:
 * - OpenAI: any OpenAI-compatible chat completions endpoint
 * - Mock: a scripted in-process provider for tests
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::errors::ProviderError;

/// One chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,

    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A provider-neutral completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Conversation to complete
    pub messages: Vec<ChatMessage>,

    /// Sampling temperature
    pub temperature: f32,

    /// Upper bound on generated tokens
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Create a request from an optional system prompt and a user prompt.
    ///
    /// An empty system prompt produces no system message.
    pub fn new(system_prompt: &str, user_prompt: impl Into<String>, max_tokens: u32) -> Self {
        let mut messages = Vec::with_capacity(2);
        if !system_prompt.is_empty() {
            messages.push(ChatMessage::system(system_prompt));
        }
        messages.push(ChatMessage::user(user_prompt));

        Self {
            messages,
            temperature: 0.0,
            max_tokens,
        }
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Text of the last user message
    pub fn user_prompt(&self) -> &str {
        self.messages
            .iter()
            .rev()
            .find(|message| message.role == "user")
            .map(|message| message.content.as_str())
            .unwrap_or_default()
    }
}

/// Completion text plus optional usage numbers
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompletionResponse {
    /// Trimmed completion text
    pub text: String,

    /// Prompt tokens reported by the endpoint
    pub prompt_tokens: Option<u64>,

    /// Completion tokens reported by the endpoint
    pub completion_tokens: Option<u64>,
}

/// Common trait for all completion providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably in the translation service.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Complete a request using this provider
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<CompletionResponse, ProviderError>` - The response from the provider or an error
    async fn complete(&self, request: CompletionRequest)
    -> Result<CompletionResponse, ProviderError>;
}

pub mod mock;
pub mod openai;
