use crate::error::{GraphError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for graph building behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct GraphBuilderConfig {
    /// Run the structural validation pass after construction
    pub validate_structure: bool,

    /// Supplement declared technologies by scanning name and description
    pub infer_technologies_from_text: bool,

    /// Classify security-layer roles as (internal) external actors
    pub include_security_actors: bool,

    /// Emit deployment nodes and deployment edges for the overlay
    pub include_deployment_nodes: bool,

    /// Containers detected below this confidence are dropped with a warning.
    /// 0.0 accepts every detected container.
    pub min_container_confidence: f32,
}

impl Default for GraphBuilderConfig {
    fn default() -> Self {
        Self {
            validate_structure: true,
            infer_technologies_from_text: true,
            include_security_actors: true,
            include_deployment_nodes: true,
            min_container_confidence: 0.0,
        }
    }
}

impl GraphBuilderConfig {
    /// Skip validation and text inference (large models, interactive reloads)
    pub fn fast() -> Self {
        Self {
            validate_structure: false,
            infer_technologies_from_text: false,
            ..Default::default()
        }
    }

    /// Reject weakly detected containers (realization-only signals)
    pub fn strict() -> Self {
        Self {
            min_container_confidence: 0.7,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_container_confidence) {
            return Err(GraphError::invalid_config(format!(
                "min_container_confidence ({}) must be within 0.0..=1.0",
                self.min_container_confidence
            )));
        }
        Ok(())
    }
}
