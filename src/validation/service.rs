/*!
 * Validation service for candidate translations.
 *
 * A candidate is rejected when it is empty, when it lost protection tokens,
 * when it echoes the prompt back, or when a short source produced a runaway
 * answer. The checks run in a fixed order and the first failure wins.
 */

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::tokens::{TokenKind, TokenValidator};

/// Configuration for the validation service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationConfig {
    /// Phrases that betray instruction leakage, matched case-insensitively
    #[serde(default = "default_leakage_markers")]
    pub leakage_markers: Vec<String>,

    /// Sources up to this many characters count as short
    #[serde(default = "default_short_source_max_chars")]
    pub short_source_max_chars: usize,

    /// Longest candidate accepted for a short source
    #[serde(default = "default_short_source_max_output_chars")]
    pub short_source_max_output_chars: usize,
}

fn default_leakage_markers() -> Vec<String> {
    [
        "Translate ONLY",
        "Output ONLY",
        "Preserve tokens",
        "You translate",
        "point-of-care",
        "POC",
        "interfaz de usuario",
        "Devuelve",
        "sin comillas",
    ]
    .iter()
    .map(|marker| marker.to_string())
    .collect()
}

fn default_short_source_max_chars() -> usize {
    20
}

fn default_short_source_max_output_chars() -> usize {
    80
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            leakage_markers: default_leakage_markers(),
            short_source_max_chars: default_short_source_max_chars(),
            short_source_max_output_chars: default_short_source_max_output_chars(),
        }
    }
}

/// Why a candidate was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// Nothing usable came back
    #[error("empty candidate")]
    EmptyCandidate,

    /// Placeholder tokens were dropped
    #[error("missing placeholder tokens {0:?}")]
    MissingPlaceholderTokens(Vec<usize>),

    /// Markup tokens were dropped
    #[error("missing markup tokens {0:?}")]
    MissingMarkupTokens(Vec<usize>),

    /// Markup tokens survived but were reordered
    #[error("markup tokens out of order")]
    MarkupTokensOutOfOrder,

    /// The candidate contains instruction text
    #[error("prompt leakage: {0}")]
    PromptLeakage(String),

    /// A short source produced a long answer
    #[error("candidate of {output_chars} chars for a source of {source_chars} chars")]
    RunawayOutput {
        /// Characters in the source
        source_chars: usize,
        /// Characters in the candidate
        output_chars: usize,
    },
}

/// Validation service for candidate translations
#[derive(Debug, Clone)]
pub struct ValidationService {
    config: ValidationConfig,
    lowered_markers: Vec<String>,
}

impl Default for ValidationService {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationService {
    /// Create a new validation service with default configuration
    pub fn new() -> Self {
        Self::with_config(ValidationConfig::default())
    }

    /// Create a new validation service with custom configuration
    pub fn with_config(config: ValidationConfig) -> Self {
        let lowered_markers = config
            .leakage_markers
            .iter()
            .map(|marker| marker.to_lowercase())
            .collect();

        Self {
            config,
            lowered_markers,
        }
    }

    /// Get the active configuration
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Judge a candidate against the protected source it came from.
    ///
    /// `placeholder_count` and `markup_count` are the numbers of `PH` and
    /// `TAG` tokens the source carried. The candidate is trimmed first.
    pub fn check(
        &self,
        source: &str,
        candidate: Option<&str>,
        placeholder_count: usize,
        markup_count: usize,
    ) -> Result<(), ValidationIssue> {
        let candidate = candidate.map(str::trim).unwrap_or_default();
        if candidate.is_empty() {
            return Err(ValidationIssue::EmptyCandidate);
        }

        let placeholders =
            TokenValidator::validate(candidate, TokenKind::Placeholder, placeholder_count);
        if !placeholders.all_present() {
            return Err(ValidationIssue::MissingPlaceholderTokens(
                placeholders.missing_indices,
            ));
        }

        let markup = TokenValidator::validate(candidate, TokenKind::Markup, markup_count);
        if !markup.all_present() {
            return Err(ValidationIssue::MissingMarkupTokens(markup.missing_indices));
        }
        if markup.out_of_order {
            return Err(ValidationIssue::MarkupTokensOutOfOrder);
        }

        let lowered = candidate.to_lowercase();
        if let Some(position) = self
            .lowered_markers
            .iter()
            .position(|marker| !marker.is_empty() && lowered.contains(marker.as_str()))
        {
            return Err(ValidationIssue::PromptLeakage(
                self.config.leakage_markers[position].clone(),
            ));
        }

        let source_chars = source.chars().count();
        let output_chars = candidate.chars().count();
        if source_chars <= self.config.short_source_max_chars
            && output_chars > self.config.short_source_max_output_chars
        {
            return Err(ValidationIssue::RunawayOutput {
                source_chars,
                output_chars,
            });
        }

        Ok(())
    }

    /// Whether a candidate should be rejected
    pub fn looks_bad(
        &self,
        source: &str,
        candidate: Option<&str>,
        placeholder_count: usize,
        markup_count: usize,
    ) -> bool {
        match self.check(source, candidate, placeholder_count, markup_count) {
            Ok(()) => false,
            Err(issue) => {
                debug!("Candidate rejected: {}", issue);
                true
            }
        }
    }
}
