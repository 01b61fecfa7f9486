//! Synchronous half of a transform: everything except positions.

use crate::breadcrumb::{self, Breadcrumb};
use crate::options::{DetailLevel, PathMode, ScenarioPreset, TransformOptions, ViewLevel};
use archview_graph::traverse;
use archview_graph::{
    AbstractionKind, Boundary, ChangeStatus, ClassifiedGraph, ContainerType, Direction, Edge,
    Node, Protocol,
};
use serde::Serialize;
use std::collections::HashSet;

/// Node payload, populated according to the detail level
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDisplay {
    pub label: String,
    pub boundary: Boundary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_type: Option<ContainerType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changeset: Option<ChangeStatus>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub technologies: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_endpoint_count: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedNode {
    pub id: String,
    pub kind: AbstractionKind,
    pub display: NodeDisplay,
    pub dimmed: bool,
    pub highlighted: bool,
    pub focused: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDisplay {
    pub protocol: Protocol,
    pub direction: Direction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// "METHOD /path" when backed by an API operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changeset: Option<ChangeStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub display: EdgeDisplay,
    pub dimmed: bool,
    pub highlighted: bool,
    pub is_deployment: bool,
}

/// Why the effective view differs from the requested one
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackNotice {
    pub requested: ViewLevel,
    pub effective: ViewLevel,
    pub reason: String,
}

/// Filtered and styled view content, not yet positioned
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewProjection {
    /// Effective level after stale-selection fallback
    pub view_level: ViewLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_id: Option<String>,
    pub detail: DetailLevel,
    pub nodes: Vec<ProjectedNode>,
    pub edges: Vec<ProjectedEdge>,
    pub breadcrumbs: Vec<Breadcrumb>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<FallbackNotice>,
}

impl ViewProjection {
    pub fn node(&self, id: &str) -> Option<&ProjectedNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&ProjectedEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn node_ids(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }
}

/// Manual filters plus scenario-forced ones
struct Filters<'a> {
    container_types: Option<&'a HashSet<ContainerType>>,
    /// Lowercased
    technologies: Option<HashSet<String>>,
    changes_only: bool,
}

impl<'a> Filters<'a> {
    fn new(options: &'a TransformOptions) -> Self {
        Self {
            container_types: options.container_types.as_ref(),
            technologies: options
                .technologies
                .as_ref()
                .map(|set| set.iter().map(|t| t.to_lowercase()).collect()),
            changes_only: options.changes_only(),
        }
    }

    fn admits(&self, node: &Node) -> bool {
        if let (Some(active), Some(ct)) = (self.container_types, node.container_type) {
            if !active.contains(&ct) {
                return false;
            }
        }
        if let Some(active) = &self.technologies {
            if !node.technologies.is_empty()
                && !node
                    .technologies
                    .iter()
                    .any(|t| active.contains(&t.to_lowercase()))
            {
                return false;
            }
        }
        !self.changes_only || node.changeset.is_some()
    }
}

/// View after stale-selection fallback
#[derive(Debug, PartialEq)]
struct ResolvedView {
    level: ViewLevel,
    container: Option<String>,
    component: Option<String>,
    fallback: Option<FallbackNotice>,
}

impl ResolvedView {
    fn new(level: ViewLevel, container: Option<String>, component: Option<String>) -> Self {
        Self {
            level,
            container,
            component,
            fallback: None,
        }
    }

    fn fallen_back(mut self, requested: ViewLevel, reason: String) -> Self {
        log::info!(
            "Stale selection: {:?} view falls back to {:?} ({})",
            requested,
            self.level,
            reason
        );
        self.fallback = Some(FallbackNotice {
            requested,
            effective: self.level,
            reason,
        });
        self
    }
}

fn resolve(graph: &ClassifiedGraph, options: &TransformOptions, filters: &Filters<'_>) -> ResolvedView {
    let visible = |id: &str, kind: AbstractionKind| {
        graph
            .node(id)
            .is_some_and(|n| n.kind == kind && filters.admits(n))
    };
    let requested = options.view_level;
    let selected_container = options.selected_container_id.as_deref();
    let selected_component = options.selected_component_id.as_deref();

    match requested {
        ViewLevel::Context => ResolvedView::new(ViewLevel::Context, None, None),

        // No selection: system overview at container level
        ViewLevel::Container => match selected_container {
            None => ResolvedView::new(ViewLevel::Container, None, None),
            Some(id) if visible(id, AbstractionKind::Container) => {
                ResolvedView::new(ViewLevel::Container, Some(id.to_string()), None)
            }
            Some(id) => ResolvedView::new(ViewLevel::Context, None, None)
                .fallen_back(requested, format!("container '{id}' is not visible")),
        },

        ViewLevel::Component => {
            if let Some(id) = selected_container {
                if !visible(id, AbstractionKind::Container) {
                    return ResolvedView::new(ViewLevel::Container, None, None)
                        .fallen_back(requested, format!("container '{id}' is not visible"));
                }
            }
            match selected_component {
                Some(id) if visible(id, AbstractionKind::Component) => {
                    let parent = graph.hierarchy().parent_of(id);
                    let container = parent.or(selected_container).map(str::to_string);
                    let view =
                        ResolvedView::new(ViewLevel::Component, container, Some(id.to_string()));
                    match (parent, selected_container) {
                        (Some(parent), Some(selected)) if parent != selected => {
                            let reason = format!(
                                "component '{id}' belongs to '{parent}', not '{selected}'"
                            );
                            view.fallen_back(requested, reason)
                        }
                        _ => view,
                    }
                }
                component => {
                    let reason = match component {
                        Some(id) => format!("component '{id}' is not visible"),
                        None => "no component selected".to_string(),
                    };
                    ResolvedView::new(
                        ViewLevel::Container,
                        selected_container.map(str::to_string),
                        None,
                    )
                    .fallen_back(requested, reason)
                }
            }
        }
    }
}

/// Node ids the view level shows before filtering
fn level_members(graph: &ClassifiedGraph, view: &ResolvedView) -> HashSet<String> {
    let is_top_level = |n: &Node| {
        matches!(n.kind, AbstractionKind::Container | AbstractionKind::External)
    };
    let communication = || graph.edges().iter().filter(|e| !e.is_deployment);

    match (view.level, view.container.as_deref(), view.component.as_deref()) {
        (ViewLevel::Component, container, Some(component)) => {
            let mut ids: HashSet<String> = match container {
                Some(parent) => graph.hierarchy().children_of(parent).iter().cloned().collect(),
                None => HashSet::new(),
            };
            ids.insert(component.to_string());
            for edge in communication().filter(|e| e.touches(component)) {
                ids.insert(edge.source.clone());
                ids.insert(edge.target.clone());
            }
            ids
        }
        (ViewLevel::Container, Some(container), _) => {
            let mut ids: HashSet<String> =
                graph.hierarchy().children_of(container).iter().cloned().collect();
            let mut inside = ids.clone();
            inside.insert(container.to_string());
            for edge in communication() {
                let other = if inside.contains(&edge.source) {
                    &edge.target
                } else if inside.contains(&edge.target) {
                    &edge.source
                } else {
                    continue;
                };
                if other != container && graph.node(other).is_some_and(is_top_level) {
                    ids.insert(other.clone());
                }
            }
            ids
        }
        _ => graph
            .nodes()
            .iter()
            .filter(|n| is_top_level(n))
            .map(|n| n.id.clone())
            .collect(),
    }
}

fn is_data_carrying(graph: &ClassifiedGraph, edge: &Edge) -> bool {
    edge.direction == Direction::Async
        || edge.protocol.carries_data()
        || graph
            .node(&edge.target)
            .and_then(|n| n.container_type)
            .is_some_and(ContainerType::is_data_holder)
}

/// Highlighted node and edge ids from the path request and the scenario
fn highlights(
    graph: &ClassifiedGraph,
    options: &TransformOptions,
) -> (HashSet<String>, HashSet<String>) {
    let Some(path) = &options.path_highlight else {
        return (HashSet::new(), HashSet::new());
    };

    let nodes = match &path.highlighted_nodes {
        Some(precomputed) => precomputed.clone(),
        None => match (path.mode, path.source_id.as_deref(), path.target_id.as_deref()) {
            (PathMode::Upstream, Some(source), _) => traverse::trace_upstream(graph, source),
            (PathMode::Downstream, Some(source), _) => traverse::trace_downstream(graph, source),
            (PathMode::Both, Some(source), _) => {
                let mut ids = traverse::trace_upstream(graph, source);
                ids.extend(traverse::trace_downstream(graph, source));
                ids
            }
            (PathMode::Between, Some(source), Some(target)) => {
                traverse::path_between(graph, source, target)
            }
            _ => HashSet::new(),
        },
    };
    let edges = match &path.highlighted_edges {
        Some(precomputed) => precomputed.clone(),
        None => traverse::highlighted_edges(graph, &nodes),
    };
    (nodes, edges)
}

fn node_display(node: &Node, detail: DetailLevel) -> NodeDisplay {
    let mut display = NodeDisplay {
        label: node.name.clone(),
        boundary: node.boundary,
        container_type: node.container_type,
        changeset: node.changeset,
        technologies: Vec::new(),
        description: None,
        api_endpoint_count: None,
    };
    if detail >= DetailLevel::Standard {
        display.technologies = node.technologies.clone();
    }
    if detail >= DetailLevel::Detailed {
        display.description = Some(node.description.clone()).filter(|d| !d.is_empty());
        display.api_endpoint_count =
            Some(node.metadata.api_endpoint_count).filter(|&count| count > 0);
    }
    display
}

fn edge_display(edge: &Edge, detail: DetailLevel) -> EdgeDisplay {
    let mut display = EdgeDisplay {
        protocol: edge.protocol,
        direction: edge.direction,
        label: None,
        http: None,
        changeset: edge.changeset,
    };
    if detail >= DetailLevel::Standard {
        display.label = Some(edge.description.clone());
    }
    if detail >= DetailLevel::Detailed {
        display.http = match (&edge.http_method, &edge.path) {
            (Some(method), Some(path)) => Some(format!("{method} {path}")),
            (Some(method), None) => Some(method.clone()),
            (None, Some(path)) => Some(path.clone()),
            (None, None) => None,
        };
    }
    display
}

/// Project a graph into the requested view: level selection, filters,
/// overlays, highlights and focus styling. Never fails; stale selections fall
/// back to the nearest valid ancestor view.
pub fn project(graph: &ClassifiedGraph, options: &TransformOptions) -> ViewProjection {
    let filters = Filters::new(options);
    let view = resolve(graph, options, &filters);
    let detail = options.detail_level();

    let members = level_members(graph, &view);
    let mut visible: HashSet<&str> = graph
        .nodes()
        .iter()
        .filter(|n| members.contains(&n.id) && filters.admits(n))
        .map(|n| n.id.as_str())
        .collect();

    // Deployment targets of visible containers join the view unfiltered
    let overlay = options.deployment_overlay();
    if overlay {
        let hosts: Vec<&str> = graph
            .edges()
            .iter()
            .filter(|e| e.is_deployment && visible.contains(e.source.as_str()))
            .filter(|e| graph.contains_node(&e.target))
            .map(|e| e.target.as_str())
            .collect();
        visible.extend(hosts);
    }

    let data_flow_only = options.scenario == Some(ScenarioPreset::DataFlow);
    let edges: Vec<&Edge> = graph
        .edges()
        .iter()
        .filter(|e| visible.contains(e.source.as_str()) && visible.contains(e.target.as_str()))
        .filter(|e| {
            if e.is_deployment {
                return overlay;
            }
            if let Some(component) = view.component.as_deref() {
                if !e.touches(component) {
                    return false;
                }
            }
            if filters.changes_only && e.changeset.is_none() {
                return false;
            }
            !data_flow_only || is_data_carrying(graph, e)
        })
        .collect();

    let (mut lit_nodes, mut lit_edges) = highlights(graph, options);
    match options.scenario {
        Some(ScenarioPreset::DataFlow) => {
            lit_edges.extend(edges.iter().map(|e| e.id.clone()));
        }
        Some(ScenarioPreset::ExternalIntegrations) => {
            let is_external =
                |id: &str| graph.node(id).is_some_and(|n| n.kind == AbstractionKind::External);
            for edge in &edges {
                if is_external(&edge.source) || is_external(&edge.target) {
                    lit_edges.insert(edge.id.clone());
                    lit_nodes.insert(edge.source.clone());
                    lit_nodes.insert(edge.target.clone());
                }
            }
        }
        _ => {}
    }

    let focus = options
        .focus
        .as_ref()
        .filter(|f| f.enabled)
        .map(|f| f.node_id.as_str());
    let focus = match focus {
        Some(id) if visible.contains(id) => Some(id),
        Some(id) => {
            log::debug!("Focus node '{}' is not visible; focus ignored", id);
            None
        }
        None => None,
    };
    let bright = focus.map(|id| traverse::neighborhood(graph, id));

    let nodes: Vec<ProjectedNode> = graph
        .nodes()
        .iter()
        .filter(|n| visible.contains(n.id.as_str()))
        .map(|n| ProjectedNode {
            id: n.id.clone(),
            kind: n.kind,
            display: node_display(n, detail),
            dimmed: bright.as_ref().is_some_and(|ids| !ids.contains(&n.id)),
            highlighted: lit_nodes.contains(&n.id),
            focused: focus == Some(n.id.as_str()),
        })
        .collect();

    let edges: Vec<ProjectedEdge> = edges
        .into_iter()
        .map(|e| ProjectedEdge {
            id: e.id.clone(),
            source: e.source.clone(),
            target: e.target.clone(),
            display: edge_display(e, detail),
            dimmed: focus.is_some_and(|id| !e.touches(id)),
            highlighted: lit_edges.contains(&e.id),
            is_deployment: e.is_deployment,
        })
        .collect();

    log::debug!(
        "Projected {:?} view: {} nodes, {} edges",
        view.level,
        nodes.len(),
        edges.len()
    );

    ViewProjection {
        view_level: view.level,
        breadcrumbs: breadcrumb::build(graph, view.container.as_deref(), view.component.as_deref()),
        container_id: view.container,
        component_id: view.component,
        detail,
        nodes,
        edges,
        fallback: view.fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archview_graph::GraphBuilder;
    use archview_model::ArchitectureModel;
    use serde_json::json;

    fn graph() -> ClassifiedGraph {
        let model: ArchitectureModel = serde_json::from_value(json!({
            "layers": {
                "application": { "type": "application",
                    "elements": [
                        { "id": "api", "type": "service", "name": "Orders API",
                          "properties": { "realizes": "b" } },
                        { "id": "handler", "type": "component", "properties": { "parent": "api" } }
                    ]
                }
            }
        }))
        .unwrap();
        GraphBuilder::default().build(&model)
    }

    #[test]
    fn test_component_view_without_component_falls_back() {
        let g = graph();
        let options = TransformOptions {
            view_level: ViewLevel::Component,
            selected_container_id: Some("api".into()),
            ..Default::default()
        };
        let filters = Filters::new(&options);
        let view = resolve(&g, &options, &filters);
        assert_eq!(view.level, ViewLevel::Container);
        assert_eq!(view.container.as_deref(), Some("api"));
        assert_eq!(view.fallback.unwrap().requested, ViewLevel::Component);
    }

    #[test]
    fn test_component_parent_inferred_from_hierarchy() {
        let g = graph();
        let options = TransformOptions {
            view_level: ViewLevel::Component,
            selected_component_id: Some("handler".into()),
            ..Default::default()
        };
        let filters = Filters::new(&options);
        let view = resolve(&g, &options, &filters);
        assert_eq!(
            view,
            ResolvedView::new(
                ViewLevel::Component,
                Some("api".into()),
                Some("handler".into())
            )
        );
    }

    #[test]
    fn test_technology_filter_passes_untagged_nodes() {
        let g = graph();
        let options = TransformOptions {
            technologies: Some(HashSet::from(["Kafka".to_string()])),
            ..Default::default()
        };
        let filters = Filters::new(&options);
        assert!(g.nodes().iter().all(|n| filters.admits(n)));
    }
}
