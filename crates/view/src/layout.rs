use crate::error::Result;
use crate::options::{LayoutAlgorithm, Position};
use archview_graph::AbstractionKind;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// Default box for a node of the given kind
    pub fn for_kind(kind: AbstractionKind) -> Self {
        let (width, height) = match kind {
            AbstractionKind::System => (260.0, 160.0),
            AbstractionKind::Container => (240.0, 140.0),
            AbstractionKind::Component => (200.0, 110.0),
            AbstractionKind::External => (180.0, 120.0),
            AbstractionKind::Deployment => (220.0, 90.0),
        };
        Self { width, height }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode {
    pub id: String,
    pub kind: AbstractionKind,
    pub size: Size,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

/// Topology handed to a layout service
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutRequest {
    pub algorithm: LayoutAlgorithm,
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutResponse {
    /// Top-left corner per node id
    pub positions: HashMap<String, Position>,
}

/// External node-positioning engine.
///
/// Implementations may run on another thread or process; the transformer
/// only awaits the response. `Manual` requests never reach a service.
#[async_trait]
pub trait LayoutService: Send + Sync {
    fn name(&self) -> &str;

    async fn layout(&self, request: LayoutRequest) -> Result<LayoutResponse>;
}

/// Deterministic grid placement.
///
/// `Hierarchical` puts each abstraction kind on its own row (actors above
/// containers above components above infrastructure). The other algorithms
/// fill a square-ish grid in request order.
#[derive(Debug, Clone)]
pub struct GridLayout {
    pub gap_x: f64,
    pub gap_y: f64,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            gap_x: 60.0,
            gap_y: 80.0,
        }
    }
}

impl GridLayout {
    fn cell(&self, nodes: &[LayoutNode]) -> Size {
        let width = nodes.iter().map(|n| n.size.width).fold(0.0, f64::max);
        let height = nodes.iter().map(|n| n.size.height).fold(0.0, f64::max);
        Size {
            width: width + self.gap_x,
            height: height + self.gap_y,
        }
    }

    fn rank(kind: AbstractionKind) -> usize {
        match kind {
            AbstractionKind::External => 0,
            AbstractionKind::System | AbstractionKind::Container => 1,
            AbstractionKind::Component => 2,
            AbstractionKind::Deployment => 3,
        }
    }

    fn place(&self, request: &LayoutRequest) -> HashMap<String, Position> {
        let cell = self.cell(&request.nodes);
        let mut positions = HashMap::with_capacity(request.nodes.len());

        if request.algorithm == LayoutAlgorithm::Hierarchical {
            let mut columns = [0usize; 4];
            let mut rows_used = [false; 4];
            for node in &request.nodes {
                rows_used[Self::rank(node.kind)] = true;
            }
            // collapse empty rows so the drawing starts at the top
            let mut row_of = [0usize; 4];
            let mut next = 0;
            for (rank, used) in rows_used.iter().enumerate() {
                row_of[rank] = next;
                if *used {
                    next += 1;
                }
            }
            for node in &request.nodes {
                let rank = Self::rank(node.kind);
                let column = columns[rank];
                columns[rank] += 1;
                positions.insert(
                    node.id.clone(),
                    Position::new(column as f64 * cell.width, row_of[rank] as f64 * cell.height),
                );
            }
        } else {
            let per_row = (request.nodes.len() as f64).sqrt().ceil().max(1.0) as usize;
            for (i, node) in request.nodes.iter().enumerate() {
                positions.insert(
                    node.id.clone(),
                    Position::new(
                        (i % per_row) as f64 * cell.width,
                        (i / per_row) as f64 * cell.height,
                    ),
                );
            }
        }
        positions
    }
}

#[async_trait]
impl LayoutService for GridLayout {
    fn name(&self) -> &str {
        "grid"
    }

    async fn layout(&self, request: LayoutRequest) -> Result<LayoutResponse> {
        Ok(LayoutResponse {
            positions: self.place(&request),
        })
    }
}
