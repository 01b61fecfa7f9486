use crate::error::{Result, ViewError};
use archview_graph::ContainerType;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// C4 zoom level of a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewLevel {
    #[default]
    Context,
    Container,
    Component,
}

/// Layout algorithm requested from the layout service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutAlgorithm {
    #[default]
    Hierarchical,
    Force,
    Orthogonal,
    /// Caller-supplied positions, the layout service is not consulted
    Manual,
}

impl LayoutAlgorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            LayoutAlgorithm::Hierarchical => "hierarchical",
            LayoutAlgorithm::Force => "force",
            LayoutAlgorithm::Orthogonal => "orthogonal",
            LayoutAlgorithm::Manual => "manual",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusSpec {
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub node_id: String,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathMode {
    Upstream,
    Downstream,
    Both,
    /// Nodes on some path from the source to the target
    Between,
}

/// Path highlighting. Precomputed sets win over the mode when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathHighlight {
    pub mode: PathMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlighted_nodes: Option<HashSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlighted_edges: Option<HashSet<String>>,
}

impl PathHighlight {
    pub fn new(mode: PathMode, source_id: impl Into<String>) -> Self {
        Self {
            mode,
            source_id: Some(source_id.into()),
            target_id: None,
            highlighted_nodes: None,
            highlighted_edges: None,
        }
    }
}

/// Canned filter/highlight combinations layered over manual filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScenarioPreset {
    /// Only data-carrying edges, highlighted
    DataFlow,
    /// Forces the deployment overlay
    Deployment,
    /// Highlights edges touching external actors
    ExternalIntegrations,
    /// Forces changeset-only filtering
    Changes,
}

/// Semantic zoom: how much of each node's payload is populated
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    Minimal,
    Standard,
    Detailed,
}

impl DetailLevel {
    pub const MINIMAL_BELOW: f64 = 0.5;
    pub const DETAILED_FROM: f64 = 1.2;

    pub fn from_zoom(scale: f64) -> Self {
        if scale < Self::MINIMAL_BELOW {
            DetailLevel::Minimal
        } else if scale < Self::DETAILED_FROM {
            DetailLevel::Standard
        } else {
            DetailLevel::Detailed
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One view request against a classified graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransformOptions {
    pub view_level: ViewLevel,
    pub selected_container_id: Option<String>,
    pub selected_component_id: Option<String>,
    pub layout: LayoutAlgorithm,

    /// Active container types; `None` means all
    pub container_types: Option<HashSet<ContainerType>>,

    /// Active technologies (case-insensitive); `None` means all
    pub technologies: Option<HashSet<String>>,

    pub show_deployment: bool,
    pub focus: Option<FocusSpec>,
    pub path_highlight: Option<PathHighlight>,
    pub zoom_scale: f64,
    pub manual_positions: HashMap<String, Position>,
    pub scenario: Option<ScenarioPreset>,
    pub changeset_only: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            view_level: ViewLevel::Context,
            selected_container_id: None,
            selected_component_id: None,
            layout: LayoutAlgorithm::Hierarchical,
            container_types: None,
            technologies: None,
            show_deployment: false,
            focus: None,
            path_highlight: None,
            zoom_scale: 1.0,
            manual_positions: HashMap::new(),
            scenario: None,
            changeset_only: false,
        }
    }
}

impl TransformOptions {
    /// System context: containers and external actors
    pub fn context() -> Self {
        Self::default()
    }

    /// Inside one container
    pub fn container(container_id: impl Into<String>) -> Self {
        Self {
            view_level: ViewLevel::Container,
            selected_container_id: Some(container_id.into()),
            ..Default::default()
        }
    }

    /// One component among its siblings
    pub fn component(container_id: impl Into<String>, component_id: impl Into<String>) -> Self {
        Self {
            view_level: ViewLevel::Component,
            selected_container_id: Some(container_id.into()),
            selected_component_id: Some(component_id.into()),
            ..Default::default()
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(raw)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.zoom_scale.is_finite() || self.zoom_scale <= 0.0 {
            return Err(ViewError::invalid_options(format!(
                "zoom_scale ({}) must be a positive number",
                self.zoom_scale
            )));
        }
        if let Some(path) = &self.path_highlight {
            let precomputed = path.highlighted_nodes.is_some() || path.highlighted_edges.is_some();
            if path.mode == PathMode::Between
                && !precomputed
                && (path.source_id.is_none() || path.target_id.is_none())
            {
                return Err(ViewError::invalid_options(
                    "path highlight in 'between' mode needs both source and target ids",
                ));
            }
        }
        Ok(())
    }

    pub fn detail_level(&self) -> DetailLevel {
        DetailLevel::from_zoom(self.zoom_scale)
    }

    /// Deployment overlay requested directly or through the scenario
    pub fn deployment_overlay(&self) -> bool {
        self.show_deployment || self.scenario == Some(ScenarioPreset::Deployment)
    }

    /// Changeset-only filtering requested directly or through the scenario
    pub fn changes_only(&self) -> bool {
        self.changeset_only || self.scenario == Some(ScenarioPreset::Changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_thresholds() {
        assert_eq!(DetailLevel::from_zoom(0.2), DetailLevel::Minimal);
        assert_eq!(DetailLevel::from_zoom(0.5), DetailLevel::Standard);
        assert_eq!(DetailLevel::from_zoom(1.19), DetailLevel::Standard);
        assert_eq!(DetailLevel::from_zoom(1.2), DetailLevel::Detailed);
    }

    #[test]
    fn test_request_json_defaults() {
        let options = TransformOptions::from_json_str(
            r#"{"viewLevel":"container","selectedContainerId":"api","containerTypes":["api","database"]}"#,
        )
        .unwrap();
        assert_eq!(options.view_level, ViewLevel::Container);
        assert_eq!(options.layout, LayoutAlgorithm::Hierarchical);
        assert_eq!(options.zoom_scale, 1.0);
        assert!(options
            .container_types
            .as_ref()
            .unwrap()
            .contains(&ContainerType::Database));
    }

    #[test]
    fn test_invalid_zoom_rejected() {
        let options = TransformOptions {
            zoom_scale: 0.0,
            ..Default::default()
        };
        assert!(options.validate().is_err());
        assert!(TransformOptions::from_json_str(r#"{"zoomScale": -1}"#).is_err());
    }

    #[test]
    fn test_scenarios_force_flags() {
        let options = TransformOptions {
            scenario: Some(ScenarioPreset::Deployment),
            ..Default::default()
        };
        assert!(options.deployment_overlay());
        assert!(!options.changes_only());
    }
}
