//! Reachability queries over communication edges.
//!
//! Deployment edges are infrastructure placement, not data flow, so every
//! query here ignores them.

use crate::types::ClassifiedGraph;
use petgraph::graphmap::DiGraphMap;
use petgraph::visit::{Bfs, Reversed};
use std::collections::HashSet;

fn flow_graph(graph: &ClassifiedGraph) -> DiGraphMap<&str, ()> {
    let mut flow = DiGraphMap::new();
    for edge in graph.edges().iter().filter(|e| !e.is_deployment) {
        flow.add_edge(edge.source.as_str(), edge.target.as_str(), ());
    }
    flow
}

/// Every node that can reach `id`, including `id` itself
pub fn trace_upstream(graph: &ClassifiedGraph, id: &str) -> HashSet<String> {
    let flow = flow_graph(graph);
    let mut reached = HashSet::from([id.to_string()]);
    if !flow.contains_node(id) {
        return reached;
    }
    let reversed = Reversed(&flow);
    let mut bfs = Bfs::new(reversed, id);
    while let Some(next) = bfs.next(reversed) {
        reached.insert(next.to_string());
    }
    reached
}

/// Every node reachable from `id`, including `id` itself
pub fn trace_downstream(graph: &ClassifiedGraph, id: &str) -> HashSet<String> {
    let flow = flow_graph(graph);
    let mut reached = HashSet::from([id.to_string()]);
    if !flow.contains_node(id) {
        return reached;
    }
    let mut bfs = Bfs::new(&flow, id);
    while let Some(next) = bfs.next(&flow) {
        reached.insert(next.to_string());
    }
    reached
}

/// Ids of edges whose endpoints both lie in `ids`
pub fn highlighted_edges(graph: &ClassifiedGraph, ids: &HashSet<String>) -> HashSet<String> {
    graph
        .edges()
        .iter()
        .filter(|e| !e.is_deployment && ids.contains(&e.source) && ids.contains(&e.target))
        .map(|e| e.id.clone())
        .collect()
}

/// Direct neighbours in both directions, including `id`
pub fn neighborhood(graph: &ClassifiedGraph, id: &str) -> HashSet<String> {
    let mut ids = HashSet::from([id.to_string()]);
    for edge in graph.edges().iter().filter(|e| !e.is_deployment) {
        if edge.source == id {
            ids.insert(edge.target.clone());
        } else if edge.target == id {
            ids.insert(edge.source.clone());
        }
    }
    ids
}

/// Nodes on some path from `source` to `target`.
/// Empty when `target` is not reachable from `source`.
pub fn path_between(graph: &ClassifiedGraph, source: &str, target: &str) -> HashSet<String> {
    let downstream = trace_downstream(graph, source);
    if !downstream.contains(target) {
        return HashSet::new();
    }
    let upstream = trace_upstream(graph, target);
    downstream.intersection(&upstream).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;
    use std::collections::HashMap;

    fn node(id: &str) -> Node {
        Node {
            id: id.to_string(),
            kind: AbstractionKind::Container,
            name: id.to_string(),
            description: String::new(),
            technologies: Vec::new(),
            technology_source: TechnologySource::None,
            boundary: Boundary::Internal,
            container_type: Some(ContainerType::Service),
            parent_container_id: None,
            changeset: None,
            source_ref: SourceRef {
                layer: "application".into(),
                element_type: "service".into(),
            },
            metadata: NodeMetadata::default(),
        }
    }

    fn edge(source: &str, target: &str) -> Edge {
        Edge {
            id: format!("{source}->{target}"),
            source: source.to_string(),
            target: target.to_string(),
            protocol: Protocol::Rest,
            direction: Direction::Sync,
            description: String::new(),
            relationship_type: "uses".into(),
            http_method: None,
            path: None,
            data_format: None,
            is_deployment: false,
            changeset: None,
        }
    }

    fn graph(ids: &[&str], links: &[(&str, &str)]) -> ClassifiedGraph {
        ClassifiedGraph::assemble(
            ids.iter().map(|id| node(id)).collect(),
            links.iter().map(|(s, t)| edge(s, t)).collect(),
            Hierarchy::default(),
            HashMap::new(),
            GraphMetadata::default(),
        )
    }

    fn set(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_traces_terminate_on_cycle() {
        let g = graph(&["a", "b"], &[("a", "b"), ("b", "a")]);
        assert_eq!(trace_downstream(&g, "a"), set(&["a", "b"]));
        assert_eq!(trace_upstream(&g, "a"), set(&["a", "b"]));
    }

    #[test]
    fn test_unknown_origin_yields_only_origin() {
        let g = graph(&["a"], &[]);
        assert_eq!(trace_downstream(&g, "missing"), set(&["missing"]));
        assert_eq!(trace_upstream(&g, "a"), set(&["a"]));
    }

    #[test]
    fn test_path_between_and_neighborhood() {
        let g = graph(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("b", "c"), ("d", "c")],
        );
        assert_eq!(path_between(&g, "a", "c"), set(&["a", "b", "c"]));
        assert!(path_between(&g, "c", "a").is_empty());
        assert_eq!(neighborhood(&g, "c"), set(&["b", "c", "d"]));

        let edges = highlighted_edges(&g, &set(&["a", "b", "c"]));
        assert_eq!(edges, set(&["a->b", "b->c"]));
    }
}
