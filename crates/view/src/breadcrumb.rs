use crate::options::ViewLevel;
use archview_graph::ClassifiedGraph;
use serde::{Deserialize, Serialize};

pub const CONTEXT_LABEL: &str = "System Context";

/// One navigation segment: context, then container, then component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breadcrumb {
    pub level: ViewLevel,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
}

/// Segments for an already-resolved view. Ids missing from the graph are
/// labelled with the id itself.
pub fn build(
    graph: &ClassifiedGraph,
    container_id: Option<&str>,
    component_id: Option<&str>,
) -> Vec<Breadcrumb> {
    let mut crumbs = vec![Breadcrumb {
        level: ViewLevel::Context,
        label: CONTEXT_LABEL.to_string(),
        node_id: None,
    }];

    let segment = |level, id: &str| Breadcrumb {
        level,
        label: graph
            .node(id)
            .map(|n| n.name.clone())
            .unwrap_or_else(|| id.to_string()),
        node_id: Some(id.to_string()),
    };

    if let Some(id) = container_id {
        crumbs.push(segment(ViewLevel::Container, id));
    }
    if let Some(id) = component_id {
        crumbs.push(segment(ViewLevel::Component, id));
    }
    crumbs
}
