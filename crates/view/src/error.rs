use thiserror::Error;

pub type Result<T> = std::result::Result<T, ViewError>;

/// Contract violations of the transformer. Stale selections and empty
/// views are not errors; they degrade into fallbacks.
#[derive(Error, Debug)]
pub enum ViewError {
    #[error("No classified graph loaded")]
    GraphNotLoaded,

    #[error("Transform request {ticket} superseded by request {current}")]
    Superseded { ticket: u64, current: u64 },

    #[error("Layout service failed: {0}")]
    Layout(String),

    #[error("Invalid transform options: {0}")]
    InvalidOptions(String),

    #[error("Malformed transform request: {0}")]
    MalformedRequest(#[from] serde_json::Error),
}

impl ViewError {
    pub fn layout(msg: impl Into<String>) -> Self {
        Self::Layout(msg.into())
    }

    pub fn invalid_options(msg: impl Into<String>) -> Self {
        Self::InvalidOptions(msg.into())
    }
}
