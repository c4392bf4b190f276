/*!
 * Placeholder protection.
 *
 * Format placeholders must reach the output untouched, so they are swapped
 * for `__XLF_PH_i__` tokens before the text is sent to the model and put back
 * afterwards. Patterns run in a fixed order and share one running counter.
 */

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Shared resource references: `#[Shared.Filters]`
static HASH_BRACKET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#\[[^\]]+\]").expect("Invalid hash bracket regex"));

/// Positional placeholders: `{0}`
static CURLY_INDEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\d+\}").expect("Invalid curly index regex"));

/// Named placeholders: `{User}`
static CURLY_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[A-Za-z_][A-Za-z0-9_]*\}").expect("Invalid curly name regex"));

/// printf specifiers: `%s`, `%d`, `%1$s`
static PERCENT_FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%(\d+\$)?[sdif]").expect("Invalid percent format regex"));

/// Template variables: `${VAR}`
static DOLLAR_VAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{[^\}]+\}").expect("Invalid dollar variable regex"));

/// Token standing in for the placeholder at `index`
pub fn placeholder_token(index: usize) -> String {
    format!("__XLF_PH_{}__", index)
}

/// Text with its placeholders swapped out
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProtectedText {
    /// Text containing tokens instead of placeholders
    pub text: String,
    /// Original placeholder text, indexed by token number
    pub originals: Vec<String>,
}

impl ProtectedText {
    /// Number of tokens that must survive translation
    pub fn token_count(&self) -> usize {
        self.originals.len()
    }
}

/// Replace every placeholder in `input` with a token
pub fn protect(input: &str) -> ProtectedText {
    let mut originals = Vec::new();
    let mut text = input.to_string();

    for pattern in [
        &*HASH_BRACKET,
        &*CURLY_INDEX,
        &*CURLY_NAME,
        &*PERCENT_FORMAT,
        &*DOLLAR_VAR,
    ] {
        text = replace_all(&text, pattern, &mut originals);
    }

    ProtectedText { text, originals }
}

fn replace_all(text: &str, pattern: &Regex, originals: &mut Vec<String>) -> String {
    pattern
        .replace_all(text, |caps: &Captures| {
            let token = placeholder_token(originals.len());
            originals.push(caps[0].to_string());
            token
        })
        .into_owned()
}

/// Put the original placeholders back.
///
/// Runs from the highest index down: a later pattern can swallow an earlier
/// token (`${ {0} }`), and its original must be expanded before that token.
pub fn restore(translated: &str, originals: &[String]) -> String {
    originals
        .iter()
        .enumerate()
        .rev()
        .fold(translated.to_string(), |text, (index, original)| {
            text.replace(&placeholder_token(index), original)
        })
}

/// Whether every token `0..count` appears in `text`
pub fn all_tokens_present(text: &str, count: usize) -> bool {
    (0..count).all(|index| text.contains(&placeholder_token(index)))
}
