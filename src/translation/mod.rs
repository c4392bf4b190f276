/*!
 * Translation of protected unit text using a completion provider.
 *
 * This module is split into several submodules:
 *
 * - `core`: Translation service with the validated attempt ladder
 * - `cache`: Per-run cache of translations keyed by protected text
 * - `placeholders`: Swapping format placeholders for tokens and back
 * - `prompts`: Prompt templates and builders for translation
 */

// Re-export main types for easier usage
pub use self::cache::{CachedTranslation, TranslationCache};
pub use self::core::{TokenUsageStats, TranslationService};
pub use self::placeholders::{ProtectedText, protect, restore};
pub use self::prompts::{PromptTemplate, TranslationPromptBuilder};

// Submodules
pub mod cache;
pub mod core;
pub mod placeholders;
pub mod prompts;
