/*!
 * Validation of model output.
 *
 * - `tokens`: checks that protection tokens survived translation
 * - `service`: the accept/reject judgement for a candidate
 */

pub mod service;
pub mod tokens;

// Re-export main types
pub use service::{ValidationConfig, ValidationIssue, ValidationService};
pub use tokens::{TokenKind, TokenValidator};
