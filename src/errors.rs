/*!
 * Error types for the xliffwai application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when talking to a completion endpoint
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The response parsed but carried no usable text
    #[error("API response contained no completion text")]
    EmptyResponse,
}

/// Errors raised while reading or writing XLIFF documents
#[derive(Error, Debug)]
pub enum XliffError {
    /// The XML could not be parsed
    #[error("Malformed XML: {0}")]
    Parse(String),

    /// The document has no root element
    #[error("Document has no root element")]
    MissingRoot,

    /// The tree could not be written back out
    #[error("Failed to serialize XML: {0}")]
    Serialize(String),

    /// Non UTF-8 content
    #[error("Invalid UTF-8 in document: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

impl From<quick_xml::Error> for XliffError {
    fn from(error: quick_xml::Error) -> Self {
        Self::Parse(error.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for XliffError {
    fn from(error: quick_xml::events::attributes::AttrError) -> Self {
        Self::Parse(error.to_string())
    }
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Every attempt produced a candidate that failed validation
    #[error("Translation rejected after {attempts} attempt(s): {reason}")]
    Rejected {
        /// Number of attempts made
        attempts: usize,
        /// Last validation failure
        reason: String,
    },

    /// The run was cancelled before the document was finished
    #[error("Translation cancelled")]
    Cancelled,
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from XLIFF parsing or serialization
    #[error("XLIFF error: {0}")]
    Xliff(#[from] XliffError),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AppError {
    /// Whether this error came from a cancellation request
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Translation(TranslationError::Cancelled))
    }
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
