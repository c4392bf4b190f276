/*!
 * # XLIFFwAI - XLIFF translation with AI
 *
 * A Rust library for bulk translation of XLIFF 1.2 files through an
 * OpenAI-compatible chat completions endpoint.
 *
 * ## Features
 *
 * - Recursive discovery of `.xlf`/`.xliff` files, mirrored output tree
 * - Inline markup (`<g>`, `<x/>`, `<ph>`, ...) and placeholders (`{0}`,
 *   `{name}`, `%s`, `%1$s`, `${name}`, `#[name]`) survive translation as
 *   opaque tokens
 * - Candidates are validated and retried with a configurable attempt ladder;
 *   units that never pass keep their source text
 * - Per-run translation cache and a per-unit audit log
 * - Language names and ISO 639 codes for the target language
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `app_controller`: Folder run, progress bars and summary
 * - `xliff`: XML tree, markup tokens, document translation, audit log
 * - `translation`: Translation services:
 *   - `translation::core`: Gateway calls and the attempt ladder
 *   - `translation::placeholders`: Placeholder protection
 *   - `translation::prompts`: Prompt templates
 *   - `translation::cache`: Per-run translation cache
 * - `validation`: Candidate checks (token survival, order, leakage, length)
 * - `providers`: Chat completion clients:
 *   - `providers::openai`: OpenAI-compatible API client
 *   - `providers::mock`: Scriptable provider for tests
 * - `file_utils`: File system operations
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod translation;
pub mod validation;
pub mod xliff;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, RunSummary};
pub use errors::{AppError, ProviderError, TranslationError, XliffError};
pub use language_utils::{TargetLanguage, normalize_language};
pub use translation::TranslationService;
pub use xliff::{FileStats, XliffProcessor};
