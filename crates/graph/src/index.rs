use crate::types::{AbstractionKind, ContainerType, Edge, Node};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Derived lookup structures over a graph's nodes and edges.
///
/// Built once per graph in full; there is no incremental update path.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphIndexes {
    pub by_kind: HashMap<AbstractionKind, HashSet<String>>,
    /// Lowercased technology name -> node ids
    pub by_technology: HashMap<String, HashSet<String>>,
    pub by_container_type: HashMap<ContainerType, HashSet<String>>,
    pub container_components: HashMap<String, HashSet<String>>,
    pub component_container: HashMap<String, String>,
    pub with_outgoing_edges: HashSet<String>,
    pub with_incoming_edges: HashSet<String>,
}

impl GraphIndexes {
    pub fn build(nodes: &[Node], edges: &[Edge]) -> Self {
        let mut idx = Self::default();

        for node in nodes {
            idx.by_kind
                .entry(node.kind)
                .or_default()
                .insert(node.id.clone());

            for tech in &node.technologies {
                idx.by_technology
                    .entry(tech.to_lowercase())
                    .or_default()
                    .insert(node.id.clone());
            }

            if let Some(ct) = node.container_type {
                idx.by_container_type
                    .entry(ct)
                    .or_default()
                    .insert(node.id.clone());
            }

            if node.kind == AbstractionKind::Component {
                if let Some(parent) = &node.parent_container_id {
                    idx.container_components
                        .entry(parent.clone())
                        .or_default()
                        .insert(node.id.clone());
                    idx.component_container
                        .insert(node.id.clone(), parent.clone());
                }
            }
        }

        for edge in edges {
            idx.with_outgoing_edges.insert(edge.source.clone());
            idx.with_incoming_edges.insert(edge.target.clone());
        }

        idx
    }

    /// Node ids of one abstraction kind
    pub fn of_kind(&self, kind: AbstractionKind) -> impl Iterator<Item = &String> {
        self.by_kind.get(&kind).into_iter().flatten()
    }

    pub fn is_kind(&self, id: &str, kind: AbstractionKind) -> bool {
        self.by_kind.get(&kind).is_some_and(|ids| ids.contains(id))
    }

    /// Node ids using a technology (case-insensitive)
    pub fn using_technology(&self, technology: &str) -> Option<&HashSet<String>> {
        self.by_technology.get(&technology.to_lowercase())
    }

    pub fn of_container_type(&self, ct: ContainerType) -> Option<&HashSet<String>> {
        self.by_container_type.get(&ct)
    }

    /// Nodes with no edges in either direction
    pub fn is_isolated(&self, id: &str) -> bool {
        !self.with_outgoing_edges.contains(id) && !self.with_incoming_edges.contains(id)
    }
}
