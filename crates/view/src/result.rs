use crate::breadcrumb::Breadcrumb;
use crate::layout::Size;
use crate::options::{Position, ViewLevel};
use crate::projection::{FallbackNotice, ProjectedEdge, ProjectedNode};
use serde::Serialize;

/// Axis-aligned box enclosing every visible node
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    /// Zero box for an empty view
    pub fn enclosing(nodes: &[RenderNode]) -> Self {
        let mut iter = nodes.iter();
        let Some(first) = iter.next() else {
            return Self::default();
        };
        let (mut min_x, mut min_y) = (first.position.x, first.position.y);
        let mut max_x = first.position.x + first.size.width;
        let mut max_y = first.position.y + first.size.height;
        for node in iter {
            min_x = min_x.min(node.position.x);
            min_y = min_y.min(node.position.y);
            max_x = max_x.max(node.position.x + node.size.width);
            max_y = max_y.max(node.position.y + node.size.height);
        }
        Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderNode {
    #[serde(flatten)]
    pub node: ProjectedNode,
    pub position: Position,
    pub size: Size,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderEdge {
    #[serde(flatten)]
    pub edge: ProjectedEdge,
}

/// Positioned view, ready for a rendering surface
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderResult {
    pub view_level: ViewLevel,
    pub nodes: Vec<RenderNode>,
    pub edges: Vec<RenderEdge>,
    pub bounds: Bounds,
    pub breadcrumbs: Vec<Breadcrumb>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<FallbackNotice>,
    pub elapsed_ms: f64,
}

impl RenderResult {
    pub fn node(&self, id: &str) -> Option<&RenderNode> {
        self.nodes.iter().find(|n| n.node.id == id)
    }
}
