use crate::error::{Result, ViewError};
use crate::layout::{LayoutEdge, LayoutNode, LayoutRequest, LayoutService, Size};
use crate::options::{LayoutAlgorithm, Position, TransformOptions};
use crate::projection::{self, ViewProjection};
use crate::result::{Bounds, RenderEdge, RenderNode, RenderResult};
use archview_graph::ClassifiedGraph;
use std::collections::HashMap;
use std::time::Instant;

/// Transformer bound to one fixed request.
///
/// Holds no state besides the options: every call re-derives its result
/// from the graph it is given.
#[derive(Debug, Clone)]
pub struct ViewTransformer {
    options: TransformOptions,
}

impl ViewTransformer {
    pub fn new(options: TransformOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &TransformOptions {
        &self.options
    }

    /// Filtered and styled view, without positions
    pub fn project(&self, graph: &ClassifiedGraph) -> ViewProjection {
        projection::project(graph, &self.options)
    }

    pub async fn transform(
        &self,
        graph: &ClassifiedGraph,
        layout: &dyn LayoutService,
    ) -> Result<RenderResult> {
        transform(graph, &self.options, layout).await
    }
}

/// Project, lay out and measure one view
pub async fn transform(
    graph: &ClassifiedGraph,
    options: &TransformOptions,
    layout: &dyn LayoutService,
) -> Result<RenderResult> {
    let started = Instant::now();
    let view = projection::project(graph, options);
    let positions = positions_for(&view, options, layout).await?;

    let nodes: Vec<RenderNode> = view
        .nodes
        .into_iter()
        .map(|node| {
            let position = positions.get(&node.id).copied().unwrap_or_else(|| {
                log::warn!("No position for node '{}'; placed at origin", node.id);
                Position::ORIGIN
            });
            RenderNode {
                size: Size::for_kind(node.kind),
                position,
                node,
            }
        })
        .collect();
    let edges: Vec<RenderEdge> = view
        .edges
        .into_iter()
        .map(|edge| RenderEdge { edge })
        .collect();
    let bounds = Bounds::enclosing(&nodes);
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

    log::info!(
        "Transformed {:?} view: {} nodes, {} edges in {:.1}ms",
        view.view_level,
        nodes.len(),
        edges.len(),
        elapsed_ms
    );

    Ok(RenderResult {
        view_level: view.view_level,
        nodes,
        edges,
        bounds,
        breadcrumbs: view.breadcrumbs,
        fallback: view.fallback,
        elapsed_ms,
    })
}

async fn positions_for(
    view: &ViewProjection,
    options: &TransformOptions,
    layout: &dyn LayoutService,
) -> Result<HashMap<String, Position>> {
    if options.layout == LayoutAlgorithm::Manual {
        return Ok(options.manual_positions.clone());
    }
    if view.nodes.is_empty() {
        return Ok(HashMap::new());
    }

    let request = LayoutRequest {
        algorithm: options.layout,
        nodes: view
            .nodes
            .iter()
            .map(|n| LayoutNode {
                id: n.id.clone(),
                kind: n.kind,
                size: Size::for_kind(n.kind),
            })
            .collect(),
        edges: view
            .edges
            .iter()
            .map(|e| LayoutEdge {
                id: e.id.clone(),
                source: e.source.clone(),
                target: e.target.clone(),
            })
            .collect(),
    };
    log::debug!(
        "Requesting {} layout from '{}' for {} nodes",
        options.layout.as_str(),
        layout.name(),
        request.nodes.len()
    );
    let response = layout
        .layout(request)
        .await
        .map_err(|e| match e {
            ViewError::Layout(_) => e,
            other => ViewError::layout(other.to_string()),
        })?;
    Ok(response.positions)
}
