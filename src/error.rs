//! Error types for message analysis

use thiserror::Error;

/// Errors that prevent a message from being analyzed at all
#[derive(Error, Debug)]
pub enum ParsingError {
    /// Input contained nothing to parse
    #[error("Input is empty")]
    Empty,

    /// Input does not start with a header field
    #[error("Input does not start with a header field: {0:?}")]
    MissingHeader(String),

    /// The MIME tokenizer rejected the input
    #[error("Failed to parse message structure: {0}")]
    Structure(String),
}

/// A part's payload could not be decoded with any candidate charset
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Payload with type \"{content_type}\" could not be decoded (tried {})", .tried.join(", "))]
pub struct PayloadDecodingError {
    pub content_type: String,
    pub tried: Vec<String>,
}

/// Result type for message parsing operations
pub type Result<T> = std::result::Result<T, ParsingError>;
