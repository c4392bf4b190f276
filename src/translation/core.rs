/*!
 * Core translation service implementation.
 *
 * This module contains the main TranslationService struct, which sends one
 * protected text at a time to a completion provider and walks the configured
 * attempt ladder until a candidate passes validation.
 */

use log::{debug, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::{AttemptPolicy, Config};
use crate::errors::{ProviderError, TranslationError};
use crate::providers::openai::OpenAI;
use crate::providers::{CompletionRequest, Provider};
use crate::validation::ValidationService;

use super::prompts::TranslationPromptBuilder;

/// Token usage statistics for tracking API consumption
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenUsageStats {
    /// Number of requests sent
    pub requests: u64,

    /// Number of prompt tokens
    pub prompt_tokens: u64,

    /// Number of completion tokens
    pub completion_tokens: u64,

    /// Total time spent on API requests
    pub api_duration: Duration,
}

impl TokenUsageStats {
    /// Add token usage numbers from one response
    pub fn add_token_usage(&mut self, prompt_tokens: Option<u64>, completion_tokens: Option<u64>) {
        self.prompt_tokens += prompt_tokens.unwrap_or(0);
        self.completion_tokens += completion_tokens.unwrap_or(0);
    }

    /// Total number of tokens
    pub fn total_tokens(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Main translation service
#[derive(Debug, Clone)]
pub struct TranslationService {
    /// Provider implementation
    provider: Arc<dyn Provider>,

    /// Prompt builder
    prompts: TranslationPromptBuilder,

    /// Sampling temperature sent with every request
    temperature: f32,

    /// Attempt ladder, tried in order
    attempts: Vec<AttemptPolicy>,

    /// Candidate validation
    validator: ValidationService,

    /// Usage counters shared between clones
    usage: Arc<parking_lot::Mutex<TokenUsageStats>>,
}

impl TranslationService {
    /// Create a translation service talking to the configured endpoint
    pub fn new(config: &Config) -> Self {
        let provider = OpenAI::new(
            config.translation.endpoint.clone(),
            config.translation.model.clone(),
            config.translation.api_key.clone(),
            config.translation.timeout_secs,
        );
        Self::with_provider(Arc::new(provider), config)
    }

    /// Create a translation service around an existing provider
    pub fn with_provider(provider: Arc<dyn Provider>, config: &Config) -> Self {
        let prompts = TranslationPromptBuilder::new(&config.source_language)
            .with_system_prompt(&config.translation.system_prompt)
            .with_user_prompt(&config.translation.user_prompt);

        Self {
            provider,
            prompts,
            temperature: config.translation.temperature,
            attempts: config.translation.attempts.clone(),
            validator: ValidationService::with_config(config.validation.clone()),
            usage: Arc::new(parking_lot::Mutex::new(TokenUsageStats::default())),
        }
    }

    /// Usage counters accumulated so far
    pub fn usage(&self) -> TokenUsageStats {
        self.usage.lock().clone()
    }

    /// Send one request for `text` and return the trimmed completion.
    ///
    /// Empty or whitespace-only text is returned unchanged without a request.
    pub async fn translate(
        &self,
        text: &str,
        target_language: &str,
        max_tokens: u32,
    ) -> Result<String, ProviderError> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let (system_prompt, user_prompt) = self.prompts.build(text, target_language);
        let request = CompletionRequest::new(&system_prompt, user_prompt, max_tokens)
            .temperature(self.temperature);

        let started = Instant::now();
        let result = self.provider.complete(request).await;

        let mut usage = self.usage.lock();
        usage.requests += 1;
        usage.api_duration += started.elapsed();
        let response = result?;
        usage.add_token_usage(response.prompt_tokens, response.completion_tokens);

        Ok(response.text)
    }

    /// Walk the attempt ladder and return the first candidate that passes
    /// validation, or the reason the last attempt was rejected.
    ///
    /// Provider failures are treated as an empty candidate and never end the
    /// ladder early.
    pub async fn translate_with_validation_detailed(
        &self,
        protected_text: &str,
        target_language: &str,
        placeholder_count: usize,
        markup_count: usize,
    ) -> Result<String, TranslationError> {
        let mut last_reason = String::from("no attempts configured");

        for (index, attempt) in self.attempts.iter().enumerate() {
            let candidate = match self
                .translate(protected_text, target_language, attempt.max_tokens)
                .await
            {
                Ok(candidate) => Some(candidate),
                Err(e) => {
                    debug!("Attempt {} failed at the provider: {}", index + 1, e);
                    None
                }
            };

            match self.validator.check(
                protected_text,
                candidate.as_deref(),
                placeholder_count,
                markup_count,
            ) {
                Ok(()) => {
                    return Ok(candidate.map(|c| c.trim().to_string()).unwrap_or_default());
                }
                Err(issue) => {
                    debug!(
                        "Attempt {}/{} (max_tokens {}) rejected: {}",
                        index + 1,
                        self.attempts.len(),
                        attempt.max_tokens,
                        issue
                    );
                    last_reason = issue.to_string();
                }
            }
        }

        warn!(
            "No acceptable translation after {} attempt(s): {}",
            self.attempts.len(),
            last_reason
        );

        Err(TranslationError::Rejected {
            attempts: self.attempts.len(),
            reason: last_reason,
        })
    }

    /// Like `translate_with_validation_detailed`, but `None` when every
    /// attempt was rejected
    pub async fn translate_with_validation(
        &self,
        protected_text: &str,
        target_language: &str,
        placeholder_count: usize,
        markup_count: usize,
    ) -> Option<String> {
        self.translate_with_validation_detailed(
            protected_text,
            target_language,
            placeholder_count,
            markup_count,
        )
        .await
        .ok()
    }
}
