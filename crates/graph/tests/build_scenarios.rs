use archview_graph::{
    AbstractionKind, Boundary, ContainerType, GraphBuilder, GraphBuilderConfig, Protocol,
    Severity, TechnologySource, ValidationKind, WarningKind,
};
use archview_model::ArchitectureModel;
use pretty_assertions::assert_eq;
use serde_json::json;

fn model(value: serde_json::Value) -> ArchitectureModel {
    serde_json::from_value(value).expect("model fixture")
}

fn shop_model() -> ArchitectureModel {
    model(json!({
        "version": "1.0",
        "layers": {
            "business": {
                "type": "business",
                "elements": [
                    { "id": "customer", "type": "BusinessActor", "name": "Customer" },
                    { "id": "ordering", "type": "BusinessService", "name": "Ordering" },
                    { "id": "payments", "type": "BusinessService", "name": "Payment Provider" }
                ]
            },
            "security": {
                "type": "security",
                "elements": [
                    { "id": "admin", "type": "role", "name": "Administrator" }
                ]
            },
            "application": {
                "type": "application",
                "elements": [
                    { "id": "portal", "type": "ApplicationService", "name": "Customer Portal",
                      "properties": { "realizes": "ordering", "framework": "React" } },
                    { "id": "users-svc", "type": "ApplicationService", "name": "User Service",
                      "description": "Manages user accounts",
                      "properties": { "technology": "Rust, Axum" } },
                    { "id": "idle-svc", "type": "ApplicationService", "name": "Idle" },
                    { "id": "signup", "type": "ApplicationComponent", "name": "Signup Handler",
                      "properties": { "parent": "users-svc" } },
                    { "id": "audit", "type": "ApplicationComponent", "name": "Audit Trail" }
                ],
                "relationships": [
                    { "id": "r-portal-users", "type": "uses", "source": "portal", "target": "users-svc" },
                    { "id": "r-users-db", "type": "access", "source": "users-svc", "target": "db-main",
                      "properties": { "protocol": "jdbc" } },
                    { "id": "r-users-ghost", "type": "uses", "source": "users-svc", "target": "ghost" },
                    { "id": "r-users-audit", "type": "composition", "source": "users-svc", "target": "audit" },
                    { "id": "r-users-k8s", "type": "deployed-on", "source": "users-svc", "target": "k8s" }
                ]
            },
            "api": {
                "type": "api",
                "elements": [
                    { "id": "create-user", "type": "operation", "name": "createUser",
                      "properties": { "service": "users-svc", "method": "post", "path": "/users" } }
                ]
            },
            "datastore": {
                "type": "datastore",
                "elements": [
                    { "id": "db-main", "type": "database", "name": "PostgreSQL" }
                ]
            },
            "technology": {
                "type": "technology",
                "elements": [
                    { "id": "k8s", "type": "node", "name": "Production Cluster",
                      "properties": { "platform": "Kubernetes", "environment": "production" } }
                ]
            }
        }
    }))
}

#[test]
fn empty_model_yields_empty_graph_with_warning() {
    let graph = GraphBuilder::default().build(&ArchitectureModel::default());

    assert!(graph.is_empty());
    assert_eq!(graph.edge_count(), 0);
    assert_eq!(graph.metadata().warnings.len(), 1);
    assert_eq!(
        graph.metadata().warnings[0].kind,
        WarningKind::NoClassifiableLayers
    );
}

#[test]
fn service_owning_an_operation_becomes_api_container() {
    let graph = GraphBuilder::default().build(&shop_model());

    let users = graph.node("users-svc").expect("users-svc classified");
    assert_eq!(users.kind, AbstractionKind::Container);
    assert_eq!(users.container_type, Some(ContainerType::Api));
    assert_eq!(users.metadata.api_endpoint_count, 1);
    assert_eq!(users.technologies, vec!["Rust".to_string(), "Axum".to_string()]);
    assert_eq!(users.technology_source, TechnologySource::Explicit);
    assert_eq!(users.metadata.primary_language.as_deref(), Some("Rust"));

    let detection = users.metadata.detection.as_ref().expect("detection recorded");
    assert!(detection.confidence >= 0.9);

    assert!(graph.node("idle-svc").is_none(), "unlinked service must be excluded");
}

#[test]
fn postgres_datastore_becomes_database_container() {
    let graph = GraphBuilder::default().build(&shop_model());

    let db = graph.node("db-main").expect("datastore classified");
    assert_eq!(db.kind, AbstractionKind::Container);
    assert_eq!(db.container_type, Some(ContainerType::Database));
    assert_eq!(db.technologies, vec!["PostgreSQL".to_string()]);
    assert_eq!(db.technology_source, TechnologySource::Inferred);
    assert!(graph
        .indexes()
        .using_technology("postgresql")
        .is_some_and(|ids| ids.contains("db-main")));
}

#[test]
fn external_actors_from_business_and_security() {
    let graph = GraphBuilder::default().build(&shop_model());

    let customer = graph.node("customer").unwrap();
    assert_eq!(customer.kind, AbstractionKind::External);
    assert_eq!(customer.boundary, Boundary::External);
    assert_eq!(customer.metadata.is_external, Some(true));

    // realized by the portal, so it is not an external system
    assert!(graph.node("ordering").is_none());
    assert_eq!(
        graph.node("payments").unwrap().kind,
        AbstractionKind::External
    );

    let admin = graph.node("admin").unwrap();
    assert_eq!(admin.kind, AbstractionKind::External);
    assert_eq!(admin.metadata.is_external, Some(false));

    let without_security = GraphBuilder::new(GraphBuilderConfig {
        include_security_actors: false,
        ..Default::default()
    })
    .unwrap()
    .build(&shop_model());
    assert!(without_security.node("admin").is_none());
}

#[test]
fn edges_only_connect_classified_nodes() {
    let graph = GraphBuilder::default().build(&shop_model());

    for edge in graph.edges() {
        assert!(graph.contains_node(&edge.source), "missing source of {}", edge.id);
        assert!(graph.contains_node(&edge.target), "missing target of {}", edge.id);
    }
    assert!(graph.edge("r-users-ghost").is_none());
    // containment never becomes an edge
    assert!(graph.edge("r-users-audit").is_none());
}

#[test]
fn edge_protocol_and_operation_backing() {
    let graph = GraphBuilder::default().build(&shop_model());

    let call = graph.edge("r-portal-users").expect("portal -> users edge");
    assert_eq!(call.protocol, Protocol::Rest);
    assert_eq!(call.http_method.as_deref(), Some("POST"));
    assert_eq!(call.path.as_deref(), Some("/users"));
    assert_eq!(call.description, "Uses User Service");

    let access = graph.edge("r-users-db").expect("users -> db edge");
    assert_eq!(access.protocol, Protocol::Jdbc);
    assert_eq!(access.description, "Accesses PostgreSQL");
}

#[test]
fn components_resolve_parents_and_report_orphans() {
    let graph = GraphBuilder::default().build(&shop_model());

    let signup = graph.node("signup").unwrap();
    assert_eq!(signup.parent_container_id.as_deref(), Some("users-svc"));

    // parent derived from the containment relationship
    let audit = graph.node("audit").unwrap();
    assert_eq!(audit.parent_container_id.as_deref(), Some("users-svc"));

    let hierarchy = graph.hierarchy();
    for (child, parent) in &hierarchy.parent_child_map {
        assert_eq!(
            graph.indexes().component_container.get(child),
            Some(parent),
            "index disagrees for {child}"
        );
        assert!(hierarchy.children_of(parent).contains(child));
    }
    assert_eq!(graph.metadata().max_nesting_depth, 1);
    assert!(graph.metadata().validation_errors.is_empty());
}

#[test]
fn child_to_parent_containment_resolves_parent() {
    let graph = GraphBuilder::default().build(&model(json!({
        "layers": {
            "application": { "type": "application",
                "elements": [
                    { "id": "billing", "type": "service", "properties": { "realizes": "invoicing" } },
                    { "id": "ledger", "type": "component" },
                    { "id": "tax", "type": "component" }
                ],
                "relationships": [
                    { "id": "r1", "type": "part-of", "source": "ledger", "target": "billing" },
                    { "id": "r2", "type": "childOf", "source": "tax", "target": "billing" }
                ]
            }
        }
    })));

    assert_eq!(graph.node("ledger").unwrap().parent_container_id.as_deref(), Some("billing"));
    assert_eq!(graph.node("tax").unwrap().parent_container_id.as_deref(), Some("billing"));
    assert!(graph.edges().is_empty());
    assert!(graph.metadata().validation_errors.is_empty());
}

#[test]
fn unknown_parent_leaves_orphan() {
    let graph = GraphBuilder::default().build(&model(json!({
        "layers": {
            "application": { "type": "application", "elements": [
                { "id": "lonely", "type": "component", "properties": { "containerId": "nowhere" } }
            ]}
        }
    })));

    assert_eq!(graph.node("lonely").unwrap().parent_container_id, None);
    assert!(graph
        .metadata()
        .warnings
        .iter()
        .any(|w| w.kind == WarningKind::UnresolvedParent));
    let orphan = graph
        .metadata()
        .validation_errors
        .iter()
        .find(|e| e.kind == ValidationKind::OrphanComponent)
        .expect("orphan reported");
    assert_eq!(orphan.severity, Severity::Warning);
    assert_eq!(orphan.node_ids, vec!["lonely".to_string()]);
}

#[test]
fn containment_cycle_is_reported() {
    let graph = GraphBuilder::default().build(&model(json!({
        "layers": {
            "application": { "type": "application", "elements": [
                { "id": "a", "type": "component", "properties": { "parent": "b" } },
                { "id": "b", "type": "component", "properties": { "parent": "c" } },
                { "id": "c", "type": "component", "properties": { "parent": "a" } }
            ]}
        }
    })));

    assert_eq!(graph.node_count(), 3);
    assert!(graph.metadata().has_cycles);
    let cycle = graph
        .metadata()
        .validation_errors
        .iter()
        .find(|e| e.kind == ValidationKind::Cycle)
        .expect("cycle reported");
    assert_eq!(cycle.severity, Severity::Error);
    assert_eq!(
        cycle.node_ids,
        vec!["a".to_string(), "b".to_string(), "c".to_string()]
    );
}

#[test]
fn validation_can_be_disabled() {
    let graph = GraphBuilder::new(GraphBuilderConfig::fast())
        .unwrap()
        .build(&model(json!({
            "layers": {
                "application": { "type": "application", "elements": [
                    { "id": "a", "type": "component", "properties": { "parent": "a" } }
                ]}
            }
        })));
    assert!(!graph.metadata().has_cycles);
    assert!(graph.metadata().validation_errors.is_empty());
}

#[test]
fn duplicate_ids_keep_last_definition() {
    let graph = GraphBuilder::default().build(&model(json!({
        "layers": {
            "application": { "type": "application", "elements": [
                { "id": "svc", "type": "service", "name": "First", "properties": { "realizes": "x" } },
                { "id": "svc", "type": "service", "name": "Second", "properties": { "realizes": "x" } }
            ]}
        }
    })));

    assert_eq!(graph.node_count(), 1);
    assert_eq!(graph.node("svc").unwrap().name, "Second");
    assert!(graph
        .metadata()
        .warnings
        .iter()
        .any(|w| w.kind == WarningKind::DuplicateIdOverwritten));
    let duplicate = graph
        .metadata()
        .validation_errors
        .iter()
        .find(|e| e.kind == ValidationKind::DuplicateId)
        .expect("duplicate reported");
    assert_eq!(duplicate.severity, Severity::Warning);
}

#[test]
fn deployment_mapping_and_overlay_nodes() {
    let graph = GraphBuilder::default().build(&shop_model());

    assert_eq!(
        graph.deployment_map().get("users-svc"),
        Some(&vec!["k8s".to_string()])
    );
    let cluster = graph.node("k8s").expect("deployment node");
    assert_eq!(cluster.kind, AbstractionKind::Deployment);
    assert_eq!(
        cluster.metadata.deployment_environment.as_deref(),
        Some("production")
    );
    let edge = graph.edge("r-users-k8s").expect("deployment edge");
    assert!(edge.is_deployment);
    assert_eq!(edge.description, "Deployed on Production Cluster");

    let bare = GraphBuilder::new(GraphBuilderConfig {
        include_deployment_nodes: false,
        ..Default::default()
    })
    .unwrap()
    .build(&shop_model());
    assert!(bare.node("k8s").is_none());
    assert!(bare.deployment_map().contains_key("users-svc"));
}

#[test]
fn metadata_counts_and_technologies() {
    let graph = GraphBuilder::default().build(&shop_model());
    let metadata = graph.metadata();

    assert_eq!(metadata.node_counts.get(&AbstractionKind::Container), Some(&3));
    assert_eq!(metadata.node_counts.get(&AbstractionKind::Component), Some(&2));
    assert_eq!(metadata.container_type_counts.get(&ContainerType::Database), Some(&1));
    let mut sorted = metadata.technologies.clone();
    sorted.sort_by_key(|t| t.to_lowercase());
    assert_eq!(metadata.technologies, sorted);
    assert!(metadata.timing.total_ms >= metadata.timing.classification_ms);
}
