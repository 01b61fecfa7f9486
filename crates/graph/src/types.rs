use crate::index::GraphIndexes;
use crate::validate::ValidationReport;
use archview_model::ChangeStatus;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// C4 abstraction level of a classified node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AbstractionKind {
    System,
    Container,
    Component,
    External,
    Deployment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Boundary {
    Internal,
    External,
}

/// What kind of deployable unit a container is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContainerType {
    WebApp,
    Mobile,
    Desktop,
    Api,
    Database,
    Queue,
    Cache,
    FileStorage,
    Service,
    Function,
    Custom,
}

impl ContainerType {
    pub const ALL: [ContainerType; 11] = [
        ContainerType::WebApp,
        ContainerType::Mobile,
        ContainerType::Desktop,
        ContainerType::Api,
        ContainerType::Database,
        ContainerType::Queue,
        ContainerType::Cache,
        ContainerType::FileStorage,
        ContainerType::Service,
        ContainerType::Function,
        ContainerType::Custom,
    ];

    /// Containers that hold or move data rather than execute logic
    pub fn is_data_holder(self) -> bool {
        matches!(
            self,
            ContainerType::Database
                | ContainerType::Queue
                | ContainerType::Cache
                | ContainerType::FileStorage
        )
    }
}

/// Inferred communication protocol of an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    #[serde(rename = "REST")]
    Rest,
    #[serde(rename = "GraphQL")]
    GraphQl,
    #[serde(rename = "gRPC")]
    Grpc,
    WebSocket,
    #[serde(rename = "AMQP")]
    Amqp,
    Kafka,
    #[serde(rename = "MQTT")]
    Mqtt,
    #[serde(rename = "JDBC")]
    Jdbc,
    Redis,
    Custom,
}

impl Protocol {
    /// Protocols whose traffic is data at rest or in transit between stores
    pub fn carries_data(self) -> bool {
        matches!(
            self,
            Protocol::Amqp | Protocol::Kafka | Protocol::Mqtt | Protocol::Jdbc | Protocol::Redis
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            Protocol::Rest => "REST",
            Protocol::GraphQl => "GraphQL",
            Protocol::Grpc => "gRPC",
            Protocol::WebSocket => "WebSocket",
            Protocol::Amqp => "AMQP",
            Protocol::Kafka => "Kafka",
            Protocol::Mqtt => "MQTT",
            Protocol::Jdbc => "JDBC",
            Protocol::Redis => "Redis",
            Protocol::Custom => "Custom",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Sync,
    Async,
    Bidirectional,
}

/// Where a node's technology list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TechnologySource {
    Explicit,
    Inferred,
    Mixed,
    #[default]
    None,
}

/// Back-reference to the source element a node was classified from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRef {
    /// Layer key in the model
    pub layer: String,
    pub element_type: String,
}

/// Evidence that led to a container classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DetectionSignal {
    OwnsApiOperations,
    RealizesBusinessService,
    KeywordMatch,
    ExplicitContainerType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    /// 0.0..=1.0
    pub confidence: f32,
    pub signals: Vec<DetectionSignal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    #[serde(default)]
    pub api_endpoint_count: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_language: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_environment: Option<String>,

    /// `true` for external systems, `false` for internal user roles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_external: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detection: Option<Detection>,
}

/// One architectural element at its C4 abstraction level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Same as the source element id
    pub id: String,
    pub kind: AbstractionKind,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub technology_source: TechnologySource,
    pub boundary: Boundary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_type: Option<ContainerType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_container_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changeset: Option<ChangeStatus>,
    pub source_ref: SourceRef,
    #[serde(default)]
    pub metadata: NodeMetadata,
}

impl Node {
    pub fn is_container(&self) -> bool {
        self.kind == AbstractionKind::Container
    }

    pub fn is_component(&self) -> bool {
        self.kind == AbstractionKind::Component
    }

    /// Case-insensitive technology membership
    pub fn uses_technology(&self, technology: &str) -> bool {
        self.technologies
            .iter()
            .any(|t| t.eq_ignore_ascii_case(technology))
    }
}

/// Inferred communication between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub protocol: Protocol,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub description: String,
    /// Declared relationship type from the model
    #[serde(default)]
    pub relationship_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_format: Option<String>,
    #[serde(default)]
    pub is_deployment: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changeset: Option<ChangeStatus>,
}

impl Edge {
    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

/// Containment structure. Containment is never modeled as edges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hierarchy {
    /// Top-level container ids
    pub system_boundary: Vec<String>,
    /// Parent id -> component ids
    pub container_components: HashMap<String, Vec<String>>,
    pub external_actors: Vec<String>,
    /// Child id -> parent id
    pub parent_child_map: HashMap<String, String>,
}

impl Hierarchy {
    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.parent_child_map.get(id).map(String::as_str)
    }

    pub fn children_of(&self, id: &str) -> &[String] {
        self.container_components
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WarningKind {
    NoClassifiableLayers,
    DuplicateLayer,
    DuplicateIdOverwritten,
    UnresolvedParent,
    LowConfidenceContainer,
}

/// Model-shape anomaly noticed while building
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseWarning {
    pub kind: WarningKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_id: Option<String>,
}

impl ParseWarning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            element_id: None,
        }
    }

    pub fn for_element(kind: WarningKind, element_id: &str, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            element_id: Some(element_id.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationKind {
    Cycle,
    MissingReference,
    DuplicateId,
    OrphanComponent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One structural invariant violation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub kind: ValidationKind,
    pub severity: Severity,
    pub message: String,
    #[serde(default)]
    pub node_ids: Vec<String>,
}

/// Stage timings in milliseconds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildTiming {
    pub layer_extraction_ms: f64,
    pub classification_ms: f64,
    pub edges_ms: f64,
    pub hierarchy_ms: f64,
    pub indexing_ms: f64,
    pub validation_ms: f64,
    pub total_ms: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphMetadata {
    pub node_counts: HashMap<AbstractionKind, usize>,
    pub container_type_counts: HashMap<ContainerType, usize>,
    /// Sorted, distinct
    pub technologies: Vec<String>,
    pub max_nesting_depth: usize,
    pub warnings: Vec<ParseWarning>,
    pub validation_errors: Vec<ValidationError>,
    pub has_cycles: bool,
    pub timing: BuildTiming,
}

/// Output of the graph builder: nodes, edges, hierarchy, indexes, metadata.
///
/// A built graph is never mutated. Overlays such as
/// [`ClassifiedGraph::with_changeset`] return a new value.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    hierarchy: Hierarchy,
    /// Container id -> technology element ids it is deployed on
    deployment_map: HashMap<String, Vec<String>>,
    indexes: GraphIndexes,
    metadata: GraphMetadata,

    #[serde(skip)]
    node_lookup: HashMap<String, usize>,
}

impl ClassifiedGraph {
    /// Assemble a graph and derive its lookup table and indexes
    pub(crate) fn assemble(
        nodes: Vec<Node>,
        edges: Vec<Edge>,
        hierarchy: Hierarchy,
        deployment_map: HashMap<String, Vec<String>>,
        metadata: GraphMetadata,
    ) -> Self {
        let node_lookup = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();
        let indexes = GraphIndexes::build(&nodes, &edges);
        Self {
            nodes,
            edges,
            hierarchy,
            deployment_map,
            indexes,
            metadata,
            node_lookup,
        }
    }

    /// Empty graph carrying the given metadata (warnings, timings)
    pub fn empty(metadata: GraphMetadata) -> Self {
        Self::assemble(
            Vec::new(),
            Vec::new(),
            Hierarchy::default(),
            HashMap::new(),
            metadata,
        )
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    pub fn deployment_map(&self) -> &HashMap<String, Vec<String>> {
        &self.deployment_map
    }

    pub fn indexes(&self) -> &GraphIndexes {
        &self.indexes
    }

    pub fn metadata(&self) -> &GraphMetadata {
        &self.metadata
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_lookup.get(id).map(|&i| &self.nodes[i])
    }

    /// Like [`ClassifiedGraph::node`], for callers that treat a missing id as a usage error
    pub fn require_node(&self, id: &str) -> crate::error::Result<&Node> {
        self.node(id)
            .ok_or_else(|| crate::error::GraphError::NodeNotFound(id.to_string()))
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_lookup.contains_key(id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn apply_validation(&mut self, report: ValidationReport) {
        self.metadata.has_cycles = report.has_cycles;
        self.metadata.validation_errors = report.errors;
    }

    pub(crate) fn set_timing(&mut self, timing: BuildTiming) {
        self.metadata.timing = timing;
    }

    /// Rebuild with replaced nodes/edges, keeping hierarchy and metadata
    pub(crate) fn with_parts(&self, nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self::assemble(
            nodes,
            edges,
            self.hierarchy.clone(),
            self.deployment_map.clone(),
            self.metadata.clone(),
        )
    }
}
