use crate::config::GraphBuilderConfig;
use crate::error::Result;
use crate::inference::{self, RelationKind};
use crate::types::*;
use crate::validate;
use archview_model::{ArchitectureModel, Element, Layer, LayerKind, Relationship};
use std::collections::{HashMap, HashSet};
use std::time::Instant;

/// API-operation properties naming the owning application service
const OWNER_KEYS: &[&str] = &[
    "service",
    "serviceId",
    "serviceRef",
    "applicationService",
    "applicationServiceRef",
    "x-service",
    "owner",
    "ownedBy",
    "implementedBy",
];
const REALIZES_KEYS: &[&str] = &[
    "realizes",
    "realizesBusinessService",
    "realizesService",
    "businessService",
];
const PARENT_KEYS: &[&str] = &[
    "parent",
    "parentId",
    "parentContainer",
    "container",
    "containerId",
    "partOf",
];
const CONTAINER_TYPE_KEYS: &[&str] = &["containerType", "c4Type"];
const ENVIRONMENT_KEYS: &[&str] = &["environment", "env", "deploymentEnvironment", "stage"];
const METHOD_KEYS: &[&str] = &["method", "httpMethod", "verb"];
const PATH_KEYS: &[&str] = &["path", "route", "endpoint", "url"];
const FORMAT_KEYS: &[&str] = &["dataFormat", "format", "contentType", "mediaType"];
const PROTOCOL_KEYS: &[&str] = &["protocol"];
const DIRECTION_KEYS: &[&str] = &["direction", "mode", "syncMode", "communication"];
const OPERATION_REF_KEYS: &[&str] = &["operation", "operationId", "operationRef", "apiOperation"];
const DESCRIPTION_KEYS: &[&str] = &["description", "label"];

/// Element-type fragments for business actors
const ACTOR_TYPE_FRAGMENTS: &[&str] = &[
    "actor",
    "external",
    "person",
    "customer",
    "partner",
    "stakeholder",
    "role",
    "user",
];

const CONFIDENCE_API: f32 = 0.9;
const CONFIDENCE_PER_EXTRA_OPERATION: f32 = 0.02;
const CONFIDENCE_REALIZES_ONLY: f32 = 0.6;
const CONFIDENCE_KEYWORD_BONUS: f32 = 0.05;

/// One layer picked for a builder stage, with its key in the model
type PickedLayer<'a> = Option<(&'a str, &'a Layer)>;

/// At most one layer per kind the builder consumes
#[derive(Default)]
struct LayerSet<'a> {
    application: PickedLayer<'a>,
    api: PickedLayer<'a>,
    technology: PickedLayer<'a>,
    business: PickedLayer<'a>,
    security: PickedLayer<'a>,
    datastore: PickedLayer<'a>,
}

impl<'a> LayerSet<'a> {
    fn elements(layer: PickedLayer<'a>) -> &'a [Element] {
        layer.map(|(_, l)| l.elements.as_slice()).unwrap_or_default()
    }

    fn relationships(layer: PickedLayer<'a>) -> &'a [Relationship] {
        layer
            .map(|(_, l)| l.relationships.as_slice())
            .unwrap_or_default()
    }

    fn key(layer: PickedLayer<'a>) -> &'a str {
        layer.map(|(k, _)| k).unwrap_or_default()
    }
}

/// Nodes under construction, keyed by id with later-wins replacement
#[derive(Default)]
struct NodeTable {
    nodes: Vec<Node>,
    positions: HashMap<String, usize>,
    duplicates: Vec<String>,
}

impl NodeTable {
    /// Insert, or replace and remember the overwritten id
    fn insert(&mut self, node: Node) {
        if let Some(&i) = self.positions.get(&node.id) {
            self.duplicates.push(node.id.clone());
            self.nodes[i] = node;
        } else {
            self.positions.insert(node.id.clone(), self.nodes.len());
            self.nodes.push(node);
        }
    }

    fn get(&self, id: &str) -> Option<&Node> {
        self.positions.get(id).map(|&i| &self.nodes[i])
    }

    fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    fn is_kind(&self, id: &str, kind: AbstractionKind) -> bool {
        self.get(id).is_some_and(|n| n.kind == kind)
    }
}

/// Edges under construction, keyed by id with later-wins replacement
#[derive(Default)]
struct EdgeTable {
    edges: Vec<Edge>,
    positions: HashMap<String, usize>,
}

impl EdgeTable {
    fn insert(&mut self, edge: Edge) {
        if let Some(&i) = self.positions.get(&edge.id) {
            self.edges[i] = edge;
        } else {
            self.positions.insert(edge.id.clone(), self.edges.len());
            self.edges.push(edge);
        }
    }
}

/// Classifies a layered architecture model into a C4 graph.
///
/// Building never fails on model content: missing layers, ambiguous
/// elements and broken references degrade into warnings and validation
/// entries on the resulting graph's metadata.
pub struct GraphBuilder {
    config: GraphBuilderConfig,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self {
            config: GraphBuilderConfig::default(),
        }
    }
}

impl GraphBuilder {
    pub fn new(config: GraphBuilderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GraphBuilderConfig {
        &self.config
    }

    /// Build the classified graph for a model
    pub fn build(&self, model: &ArchitectureModel) -> ClassifiedGraph {
        let started = Instant::now();
        let mut timing = BuildTiming::default();
        let mut warnings = Vec::new();

        // Phase 1: pick layers
        let stage = Instant::now();
        let layers = extract_layers(model, &mut warnings);
        timing.layer_extraction_ms = elapsed_ms(stage);

        if LayerSet::elements(layers.application).is_empty()
            && LayerSet::elements(layers.datastore).is_empty()
        {
            log::warn!("Model has no application or datastore elements; graph is empty");
            warnings.push(ParseWarning::new(
                WarningKind::NoClassifiableLayers,
                "model has no application or datastore elements to classify",
            ));
            timing.total_ms = elapsed_ms(started);
            return ClassifiedGraph::empty(GraphMetadata {
                warnings,
                timing,
                ..Default::default()
            });
        }

        // Phase 2: classify elements into nodes
        let stage = Instant::now();
        let operations = ApiOperations::collect(&layers);
        let realized = realized_business_ids(&layers);
        let mut table = NodeTable::default();
        self.detect_containers(&layers, &operations, &mut table, &mut warnings);
        self.extract_components(&layers, &mut table);
        self.identify_external_actors(&layers, &realized, &mut table);
        self.add_datastore_containers(&layers, &mut table);
        timing.classification_ms = elapsed_ms(stage);
        log::debug!("Classified {} nodes", table.nodes.len());

        // Phase 3: communication and deployment edges
        let stage = Instant::now();
        let mut edges = EdgeTable::default();
        self.build_edges(&layers, &operations, &table, &mut edges);
        let deployment_map = self.map_deployments(model, &layers, &mut table, &mut edges);
        timing.edges_ms = elapsed_ms(stage);

        for id in &table.duplicates {
            log::warn!("Duplicate element id '{}': later element replaced earlier one", id);
            warnings.push(ParseWarning::for_element(
                WarningKind::DuplicateIdOverwritten,
                id,
                format!("element '{id}' is defined more than once; the last definition was kept"),
            ));
        }

        // Phase 4: containment hierarchy
        let stage = Instant::now();
        let hierarchy = assemble_hierarchy(&mut table.nodes, &mut warnings);
        timing.hierarchy_ms = elapsed_ms(stage);

        // Phase 5: metadata; indexes are derived when the graph is assembled
        let stage = Instant::now();
        let mut metadata = summarize(&table.nodes, &hierarchy);
        metadata.warnings = warnings;
        let duplicates = std::mem::take(&mut table.duplicates);
        let mut graph = ClassifiedGraph::assemble(
            table.nodes,
            edges.edges,
            hierarchy,
            deployment_map,
            metadata,
        );
        timing.indexing_ms = elapsed_ms(stage);

        // Phase 6: read-only structural validation
        if self.config.validate_structure {
            let stage = Instant::now();
            let report = validate::validate(&graph, &duplicates);
            graph.apply_validation(report);
            timing.validation_ms = elapsed_ms(stage);
        }

        timing.total_ms = elapsed_ms(started);
        graph.set_timing(timing);

        log::info!(
            "Built classified graph: {} nodes, {} edges, {} warnings, {} validation errors",
            graph.node_count(),
            graph.edge_count(),
            graph.metadata().warnings.len(),
            graph.metadata().validation_errors.len()
        );

        graph
    }

    fn detect_containers(
        &self,
        layers: &LayerSet<'_>,
        operations: &ApiOperations<'_>,
        table: &mut NodeTable,
        warnings: &mut Vec<ParseWarning>,
    ) {
        let layer_key = LayerSet::key(layers.application);
        let realization_sources: HashSet<&str> = LayerSet::relationships(layers.application)
            .iter()
            .filter(|r| inference::classify_relation(&r.relationship_type) == Some(RelationKind::Realization))
            .map(|r| r.source.as_str())
            .collect();

        for element in LayerSet::elements(layers.application) {
            if !element.type_lower().contains("service") {
                continue;
            }

            let owned = operations.owned_by(&element.id);
            let realizes = !element.property_strings(REALIZES_KEYS).is_empty()
                || realization_sources.contains(element.id.as_str());

            if owned.is_empty() && !realizes {
                log::debug!(
                    "Service '{}' has no API operations and realizes nothing; excluded",
                    element.id
                );
                continue;
            }

            let mut signals = Vec::new();
            let mut confidence = if owned.is_empty() {
                CONFIDENCE_REALIZES_ONLY
            } else {
                CONFIDENCE_API + CONFIDENCE_PER_EXTRA_OPERATION * (owned.len() - 1) as f32
            };
            if !owned.is_empty() {
                signals.push(DetectionSignal::OwnsApiOperations);
            }
            if realizes {
                signals.push(DetectionSignal::RealizesBusinessService);
            }

            let container_type = match element.property_str(CONTAINER_TYPE_KEYS) {
                Some(raw) => {
                    signals.push(DetectionSignal::ExplicitContainerType);
                    inference::parse_container_type(raw)
                }
                None => {
                    let mut text = element.search_text();
                    for op in owned {
                        text.push(' ');
                        text.push_str(&op.search_text());
                    }
                    match inference::match_container_type(&text) {
                        Some(ct) => {
                            signals.push(DetectionSignal::KeywordMatch);
                            confidence += CONFIDENCE_KEYWORD_BONUS;
                            ct
                        }
                        None => ContainerType::Service,
                    }
                }
            };
            let confidence = confidence.min(1.0);

            if confidence < self.config.min_container_confidence {
                log::warn!(
                    "Container candidate '{}' below confidence threshold ({:.2} < {:.2})",
                    element.id,
                    confidence,
                    self.config.min_container_confidence
                );
                warnings.push(ParseWarning::for_element(
                    WarningKind::LowConfidenceContainer,
                    &element.id,
                    format!("container detection confidence {confidence:.2} is below the configured minimum"),
                ));
                continue;
            }

            let mut node = self.make_node(
                element,
                layer_key,
                AbstractionKind::Container,
                Boundary::Internal,
            );
            node.container_type = Some(container_type);
            node.metadata.api_endpoint_count = owned.len();
            node.metadata.detection = Some(Detection {
                confidence,
                signals,
            });
            table.insert(node);
        }
    }

    fn extract_components(&self, layers: &LayerSet<'_>, table: &mut NodeTable) {
        let layer_key = LayerSet::key(layers.application);
        let relationships = LayerSet::relationships(layers.application);

        for element in LayerSet::elements(layers.application) {
            let ty = element.type_lower();
            if !(ty.contains("component") || ty.contains("module")) {
                continue;
            }
            if table.is_kind(&element.id, AbstractionKind::Container) {
                continue;
            }

            let parent = element
                .property_str(PARENT_KEYS)
                .map(str::to_string)
                .or_else(|| {
                    relationships.iter().find_map(|r| {
                        if inference::classify_relation(&r.relationship_type)
                            != Some(RelationKind::Containment)
                        {
                            return None;
                        }
                        let (parent, child) = if inference::is_child_to_parent(&r.relationship_type)
                        {
                            (&r.target, &r.source)
                        } else {
                            (&r.source, &r.target)
                        };
                        (*child == element.id && table.is_kind(parent, AbstractionKind::Container))
                            .then(|| parent.clone())
                    })
                });

            let mut node = self.make_node(
                element,
                layer_key,
                AbstractionKind::Component,
                Boundary::Internal,
            );
            node.parent_container_id = parent;
            table.insert(node);
        }
    }

    fn identify_external_actors(
        &self,
        layers: &LayerSet<'_>,
        realized: &HashSet<String>,
        table: &mut NodeTable,
    ) {
        let business_key = LayerSet::key(layers.business);
        for element in LayerSet::elements(layers.business) {
            let ty = element.type_lower();
            let is_actor = ACTOR_TYPE_FRAGMENTS.iter().any(|f| ty.contains(f));
            let is_unrealized_service = ty.contains("service") && !realized.contains(&element.id);
            if !(is_actor || is_unrealized_service) {
                continue;
            }
            let mut node = self.make_node(
                element,
                business_key,
                AbstractionKind::External,
                Boundary::External,
            );
            node.metadata.is_external = Some(true);
            table.insert(node);
        }

        if !self.config.include_security_actors {
            return;
        }
        let security_key = LayerSet::key(layers.security);
        for element in LayerSet::elements(layers.security) {
            let ty = element.type_lower();
            if !(ty.contains("role") || ty.contains("actor")) {
                continue;
            }
            let mut node = self.make_node(
                element,
                security_key,
                AbstractionKind::External,
                Boundary::External,
            );
            node.metadata.is_external = Some(false);
            table.insert(node);
        }
    }

    fn add_datastore_containers(&self, layers: &LayerSet<'_>, table: &mut NodeTable) {
        let layer_key = LayerSet::key(layers.datastore);
        for element in LayerSet::elements(layers.datastore) {
            let mut node = self.make_node(
                element,
                layer_key,
                AbstractionKind::Container,
                Boundary::Internal,
            );
            node.container_type = Some(ContainerType::Database);
            table.insert(node);
        }
    }

    fn build_edges(
        &self,
        layers: &LayerSet<'_>,
        operations: &ApiOperations<'_>,
        table: &NodeTable,
        edges: &mut EdgeTable,
    ) {
        let relationships = LayerSet::relationships(layers.application)
            .iter()
            .chain(LayerSet::relationships(layers.api));

        for rel in relationships {
            let Some(kind) = inference::classify_relation(&rel.relationship_type) else {
                log::debug!(
                    "Relationship '{}' has unrecognized type '{}'; skipped",
                    rel.id,
                    rel.relationship_type
                );
                continue;
            };
            if !kind.is_communication() {
                continue;
            }
            let Some(target) = table.get(&rel.target) else {
                continue;
            };
            if !table.contains(&rel.source) {
                continue;
            }

            let backing = rel
                .property_str(OPERATION_REF_KEYS)
                .and_then(|op_id| operations.by_id.get(op_id).copied())
                .or_else(|| match operations.owned_by(&rel.target) {
                    [only] => Some(*only),
                    _ => None,
                });
            let http_method = backing
                .and_then(|op| op.property_str(METHOD_KEYS))
                .map(str::to_ascii_uppercase);

            let protocol = match rel.property_str(PROTOCOL_KEYS) {
                Some(raw) => inference::parse_protocol(raw),
                None => {
                    let text = format!(
                        "{} {}",
                        rel.relationship_type,
                        serde_json::Value::Object(rel.properties.clone())
                    );
                    inference::match_protocol(&text).unwrap_or(
                        if http_method.is_some() || kind.implies_rest() {
                            Protocol::Rest
                        } else {
                            Protocol::Custom
                        },
                    )
                }
            };

            let direction = rel
                .property_str(DIRECTION_KEYS)
                .map(inference::parse_direction)
                .unwrap_or_default();

            let description = rel
                .property_str(DESCRIPTION_KEYS)
                .map(str::to_string)
                .unwrap_or_else(|| kind.describe(&target.name));

            let data_format = rel
                .property_str(FORMAT_KEYS)
                .or_else(|| backing.and_then(|op| op.property_str(FORMAT_KEYS)))
                .map(str::to_string);

            edges.insert(Edge {
                id: rel.stable_id(),
                source: rel.source.clone(),
                target: rel.target.clone(),
                protocol,
                direction,
                description,
                relationship_type: rel.relationship_type.clone(),
                http_method,
                path: backing
                    .and_then(|op| op.property_str(PATH_KEYS))
                    .map(str::to_string),
                data_format,
                is_deployment: false,
                changeset: None,
            });
        }
    }

    /// Container -> technology element map; optionally materializes deployment
    /// nodes and edges for the overlay.
    fn map_deployments(
        &self,
        model: &ArchitectureModel,
        layers: &LayerSet<'_>,
        table: &mut NodeTable,
        edges: &mut EdgeTable,
    ) -> HashMap<String, Vec<String>> {
        let technology_key = LayerSet::key(layers.technology);
        let infrastructure: HashMap<&str, &Element> = LayerSet::elements(layers.technology)
            .iter()
            .map(|e| (e.id.as_str(), e))
            .collect();

        let mut map: HashMap<String, Vec<String>> = HashMap::new();
        let relationships = model.layers.values().flat_map(|l| l.relationships.iter());
        for rel in relationships {
            if inference::classify_relation(&rel.relationship_type) != Some(RelationKind::Deployment)
            {
                continue;
            }
            if !table.is_kind(&rel.source, AbstractionKind::Container) {
                continue;
            }
            let Some(infra) = infrastructure.get(rel.target.as_str()) else {
                continue;
            };

            let targets = map.entry(rel.source.clone()).or_default();
            if !targets.contains(&rel.target) {
                targets.push(rel.target.clone());
            }

            if !self.config.include_deployment_nodes {
                continue;
            }
            if !table.contains(&infra.id) {
                table.insert(self.make_node(
                    infra,
                    technology_key,
                    AbstractionKind::Deployment,
                    Boundary::Internal,
                ));
            }
            edges.insert(Edge {
                id: rel.stable_id(),
                source: rel.source.clone(),
                target: rel.target.clone(),
                protocol: Protocol::Custom,
                direction: Direction::Sync,
                description: RelationKind::Deployment.describe(infra.display_name()),
                relationship_type: rel.relationship_type.clone(),
                http_method: None,
                path: None,
                data_format: None,
                is_deployment: true,
                changeset: None,
            });
        }

        for targets in map.values_mut() {
            targets.sort();
        }
        map
    }

    fn make_node(
        &self,
        element: &Element,
        layer_key: &str,
        kind: AbstractionKind,
        boundary: Boundary,
    ) -> Node {
        let text = format!("{} {}", element.name, element.description());
        let profile = inference::technology_profile(
            &element.properties,
            &text,
            self.config.infer_technologies_from_text,
        );
        let metadata = NodeMetadata {
            primary_language: inference::primary_language(&profile.technologies),
            deployment_environment: element.property_str(ENVIRONMENT_KEYS).map(str::to_string),
            ..Default::default()
        };

        Node {
            id: element.id.clone(),
            kind,
            name: element.display_name().to_string(),
            description: element.description().to_string(),
            technologies: profile.technologies,
            technology_source: profile.source,
            boundary,
            container_type: None,
            parent_container_id: None,
            changeset: None,
            source_ref: SourceRef {
                layer: layer_key.to_string(),
                element_type: element.element_type.clone(),
            },
            metadata,
        }
    }
}

/// API-layer operations indexed by id and by owning service
struct ApiOperations<'a> {
    by_id: HashMap<&'a str, &'a Element>,
    by_owner: HashMap<&'a str, Vec<&'a Element>>,
}

impl<'a> ApiOperations<'a> {
    fn collect(layers: &LayerSet<'a>) -> Self {
        let mut by_id = HashMap::new();
        let mut by_owner: HashMap<&str, Vec<&Element>> = HashMap::new();
        for op in LayerSet::elements(layers.api) {
            by_id.insert(op.id.as_str(), op);
            if let Some(owner) = op.property_str(OWNER_KEYS) {
                by_owner.entry(owner).or_default().push(op);
            }
        }
        Self { by_id, by_owner }
    }

    fn owned_by(&self, service_id: &str) -> &[&'a Element] {
        self.by_owner
            .get(service_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Pick one layer per consumed kind, warning about extra same-kind layers
fn extract_layers<'a>(
    model: &'a ArchitectureModel,
    warnings: &mut Vec<ParseWarning>,
) -> LayerSet<'a> {
    let mut set = LayerSet::default();
    for (key, kind, layer) in model.layers_with_kind() {
        let slot = match kind {
            LayerKind::Application => &mut set.application,
            LayerKind::Api => &mut set.api,
            LayerKind::Technology => &mut set.technology,
            LayerKind::Business => &mut set.business,
            LayerKind::Security => &mut set.security,
            LayerKind::Datastore => &mut set.datastore,
            _ => continue,
        };
        if let Some((kept, _)) = *slot {
            log::warn!("Layer '{}' ignored: '{}' already provides {:?}", key, kept, kind);
            warnings.push(ParseWarning::new(
                WarningKind::DuplicateLayer,
                format!("layer '{key}' ignored; '{kept}' already provides the {kind:?} layer"),
            ));
        } else {
            *slot = Some((key, layer));
        }
    }

    for (name, slot) in [
        ("application", set.application),
        ("api", set.api),
        ("datastore", set.datastore),
    ] {
        if slot.is_none() {
            log::debug!("Model has no {} layer", name);
        }
    }
    set
}

/// Business element ids realized by some application element
fn realized_business_ids(layers: &LayerSet<'_>) -> HashSet<String> {
    let mut realized: HashSet<String> = LayerSet::elements(layers.application)
        .iter()
        .flat_map(|e| e.property_strings(REALIZES_KEYS))
        .collect();

    let relationships = LayerSet::relationships(layers.application)
        .iter()
        .chain(LayerSet::relationships(layers.business));
    for rel in relationships {
        if inference::classify_relation(&rel.relationship_type) == Some(RelationKind::Realization) {
            realized.insert(rel.target.clone());
        }
    }
    realized
}

/// Resolve component parents and build the containment maps.
///
/// Parents that are not classified nodes are cleared so the component shows
/// up as an orphan.
fn assemble_hierarchy(nodes: &mut [Node], warnings: &mut Vec<ParseWarning>) -> Hierarchy {
    let parent_candidates: HashSet<String> = nodes
        .iter()
        .filter(|n| matches!(n.kind, AbstractionKind::Container | AbstractionKind::Component))
        .map(|n| n.id.clone())
        .collect();

    let mut hierarchy = Hierarchy::default();
    for node in nodes.iter_mut() {
        match node.kind {
            AbstractionKind::Container => hierarchy.system_boundary.push(node.id.clone()),
            AbstractionKind::External => hierarchy.external_actors.push(node.id.clone()),
            AbstractionKind::Component => {
                let Some(parent) = node.parent_container_id.clone() else {
                    continue;
                };
                if parent_candidates.contains(&parent) {
                    hierarchy
                        .container_components
                        .entry(parent.clone())
                        .or_default()
                        .push(node.id.clone());
                    hierarchy.parent_child_map.insert(node.id.clone(), parent);
                } else {
                    log::warn!(
                        "Component '{}' names unknown parent '{}'",
                        node.id,
                        parent
                    );
                    warnings.push(ParseWarning::for_element(
                        WarningKind::UnresolvedParent,
                        &node.id,
                        format!("parent '{parent}' is not a classified container or component"),
                    ));
                    node.parent_container_id = None;
                }
            }
            // Containers, externals and deployment units never have parents
            _ => {}
        }
    }
    hierarchy
}

fn summarize(nodes: &[Node], hierarchy: &Hierarchy) -> GraphMetadata {
    let mut metadata = GraphMetadata::default();
    let mut technologies: Vec<String> = Vec::new();

    for node in nodes {
        *metadata.node_counts.entry(node.kind).or_default() += 1;
        if let Some(ct) = node.container_type {
            *metadata.container_type_counts.entry(ct).or_default() += 1;
        }
        for tech in &node.technologies {
            if !technologies.iter().any(|t| t.eq_ignore_ascii_case(tech)) {
                technologies.push(tech.clone());
            }
        }
    }
    technologies.sort_by_key(|t| t.to_lowercase());
    metadata.technologies = technologies;

    metadata.max_nesting_depth = nodes
        .iter()
        .filter(|n| n.kind == AbstractionKind::Component)
        .map(|n| nesting_depth(&n.id, hierarchy))
        .max()
        .unwrap_or(0);

    metadata
}

/// Number of parent links above a component, stopping at repeats
fn nesting_depth(id: &str, hierarchy: &Hierarchy) -> usize {
    let mut seen = HashSet::new();
    let mut depth = 0;
    let mut current = id;
    seen.insert(current);
    while let Some(parent) = hierarchy.parent_of(current) {
        depth += 1;
        if !seen.insert(parent) {
            break;
        }
        current = parent;
    }
    depth
}

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}
