use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

/// Contract violations. Data-quality problems in the model never surface here;
/// they are recorded in the graph metadata instead.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl GraphError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
