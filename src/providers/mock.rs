/*!
 * Mock provider implementations for testing.
 *
 * This module provides a mock provider that simulates different behaviors:
 * - `MockProvider::working()` - Always succeeds, echoing the text with a prefix
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::empty()` - Returns blank completions
 *
 * Responses can also be scripted in order (`with_script`) or looked up by
 * source text (`with_translation`). Scripted answers take precedence, then
 * the lookup table, then the base behavior.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::providers::{CompletionRequest, CompletionResponse, Provider};

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a `[TRANSLATED]` echo of the text
    Working,
    /// Always fails with an error
    Failing,
    /// Returns an empty completion
    Empty,
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Every request received, shared between clones
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    /// Answers returned in order before anything else
    script: Arc<Mutex<VecDeque<Result<String, ProviderError>>>>,
    /// Source text to answer pairs
    translations: Vec<(String, String)>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&CompletionRequest) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            script: Arc::new(Mutex::new(VecDeque::new())),
            translations: Vec::new(),
            custom_response: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Queue answers to return in order
    pub fn with_script<I>(self, answers: I) -> Self
    where
        I: IntoIterator<Item = Result<String, ProviderError>>,
    {
        self.script.lock().extend(answers);
        self
    }

    /// Answer with `translation` whenever the prompt carries `source`
    pub fn with_translation(mut self, source: impl Into<String>, translation: impl Into<String>) -> Self {
        self.translations.push((source.into(), translation.into()));
        self
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&CompletionRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Copies of every request received so far
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }

    /// The text to translate inside a prompt built from the default template.
    ///
    /// The default template puts the text between the first and the last
    /// blank line; any other prompt is returned whole.
    pub fn text_from_prompt(prompt: &str) -> &str {
        match (prompt.find("\n\n"), prompt.rfind("\n\n")) {
            (Some(start), Some(end)) if end > start => &prompt[start + 2..end],
            _ => prompt,
        }
    }

    fn respond(text: String) -> Result<CompletionResponse, ProviderError> {
        Ok(CompletionResponse {
            text: text.trim().to_string(),
            prompt_tokens: Some(10),
            completion_tokens: Some(10),
        })
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        let scripted = self.script.lock().pop_front();
        if let Some(answer) = scripted {
            return answer.and_then(Self::respond);
        }

        let text = Self::text_from_prompt(request.user_prompt());
        if let Some((_, translation)) = self
            .translations
            .iter()
            .find(|(source, _)| source == text)
        {
            return Self::respond(translation.clone());
        }

        match self.behavior {
            MockBehavior::Working => {
                // Use custom response if set, otherwise generate default
                let answer = match self.custom_response {
                    Some(generator) => generator(&request),
                    None => format!("[TRANSLATED] {}", text),
                };
                Self::respond(answer)
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Empty => Self::respond(String::new()),
        }
    }
}
