/*!
 * Token validation for model output.
 *
 * Source text reaches the model with placeholders replaced by `__XLF_PH_i__`
 * and inline markup replaced by `__XLF_TAG_i__`. This module checks that a
 * candidate translation still carries every token the source carried.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::translation::placeholders::placeholder_token;
use crate::xliff::tokenizer::tag_token;

/// Regex for any protection token
static TOKEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"__XLF_(PH|TAG)_(\d+)__").expect("Invalid token regex"));

/// The two token families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `__XLF_PH_i__`
    Placeholder,
    /// `__XLF_TAG_i__`
    Markup,
}

impl TokenKind {
    /// Token text for `index`
    pub fn token(self, index: usize) -> String {
        match self {
            Self::Placeholder => placeholder_token(index),
            Self::Markup => tag_token(index),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Placeholder => "PH",
            Self::Markup => "TAG",
        }
    }
}

/// Token validation result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenValidationResult {
    /// Number of tokens the source carried
    pub expected_count: usize,
    /// Indices found in the candidate, in order of appearance
    pub found_indices: Vec<usize>,
    /// Expected indices absent from the candidate
    pub missing_indices: Vec<usize>,
    /// Every token present but not in ascending order
    pub out_of_order: bool,
}

impl TokenValidationResult {
    /// All tokens present
    pub fn all_present(&self) -> bool {
        self.missing_indices.is_empty()
    }

    /// All tokens present and in ascending order
    pub fn passed(&self) -> bool {
        self.all_present() && !self.out_of_order
    }
}

/// Token validator for candidate translations
pub struct TokenValidator;

impl TokenValidator {
    /// Check that tokens `0..expected_count` of `kind` are present in `text`
    pub fn validate(text: &str, kind: TokenKind, expected_count: usize) -> TokenValidationResult {
        let found_indices = Self::found_indices(text, kind);

        let missing_indices: Vec<usize> = (0..expected_count)
            .filter(|index| !text.contains(&kind.token(*index)))
            .collect();

        let out_of_order = missing_indices.is_empty() && !Self::in_order(text, kind, expected_count);

        if !missing_indices.is_empty() || out_of_order {
            debug!(
                "{} tokens: expected {}, missing {:?}, out of order: {}",
                kind.label(),
                expected_count,
                missing_indices,
                out_of_order
            );
        }

        TokenValidationResult {
            expected_count,
            found_indices,
            missing_indices,
            out_of_order,
        }
    }

    /// Whether tokens `0..expected_count` can be found one after another.
    ///
    /// This is the same scan used when markup is put back, so a candidate
    /// that passes here never falls back to plain text on rehydration.
    pub fn in_order(text: &str, kind: TokenKind, expected_count: usize) -> bool {
        let mut cursor = 0;
        for index in 0..expected_count {
            let token = kind.token(index);
            match text[cursor..].find(&token) {
                Some(offset) => cursor += offset + token.len(),
                None => return false,
            }
        }
        true
    }

    /// Indices of every `kind` token in `text`, in order of appearance
    pub fn found_indices(text: &str, kind: TokenKind) -> Vec<usize> {
        TOKEN_REGEX
            .captures_iter(text)
            .filter(|cap| &cap[1] == kind.label())
            .filter_map(|cap| cap[2].parse().ok())
            .collect()
    }
}
