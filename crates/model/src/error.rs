use thiserror::Error;

/// Result type for model loading
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors that can occur while reading an architecture model or changeset
#[derive(Error, Debug)]
pub enum ModelError {
    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// The document is not valid JSON for the expected shape
    #[error("Invalid model document: {0}")]
    InvalidDocument(#[from] serde_json::Error),
}
