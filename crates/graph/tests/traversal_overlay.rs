use archview_graph::traverse::{highlighted_edges, path_between, trace_downstream, trace_upstream};
use archview_graph::{ChangeStatus, ClassifiedGraph, GraphBuilder};
use archview_model::{ArchitectureModel, Changeset};
use serde_json::json;
use std::collections::HashSet;

/// gateway -> orders <-> billing -> ledger, plus an unrelated reporting service
fn ring_graph() -> ClassifiedGraph {
    let model: ArchitectureModel = serde_json::from_value(json!({
        "layers": {
            "application": {
                "type": "application",
                "elements": [
                    { "id": "gateway", "type": "service", "properties": { "realizes": "b1" } },
                    { "id": "orders", "type": "service", "properties": { "realizes": "b2" } },
                    { "id": "billing", "type": "service", "properties": { "realizes": "b3" } },
                    { "id": "ledger", "type": "service", "properties": { "realizes": "b4" } },
                    { "id": "reporting", "type": "service", "properties": { "realizes": "b5" } }
                ],
                "relationships": [
                    { "id": "g-o", "type": "calls", "source": "gateway", "target": "orders" },
                    { "id": "o-b", "type": "calls", "source": "orders", "target": "billing" },
                    { "id": "b-o", "type": "triggers", "source": "billing", "target": "orders" },
                    { "id": "b-l", "type": "flow", "source": "billing", "target": "ledger" }
                ]
            }
        }
    }))
    .expect("model fixture");
    GraphBuilder::default().build(&model)
}

fn ids(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn traces_include_origin_and_survive_cycles() {
    let graph = ring_graph();

    assert_eq!(
        trace_downstream(&graph, "orders"),
        ids(&["orders", "billing", "ledger"])
    );
    assert_eq!(
        trace_upstream(&graph, "orders"),
        ids(&["orders", "billing", "gateway"])
    );
    assert_eq!(trace_upstream(&graph, "reporting"), ids(&["reporting"]));
}

#[test]
fn highlighted_edges_stay_inside_closure() {
    let graph = ring_graph();
    let closure = trace_downstream(&graph, "orders");
    let edges = highlighted_edges(&graph, &closure);

    assert_eq!(edges, ids(&["o-b", "b-o", "b-l"]));
    for id in &edges {
        let edge = graph.edge(id).unwrap();
        assert!(closure.contains(&edge.source) && closure.contains(&edge.target));
    }
}

#[test]
fn path_between_gateway_and_ledger() {
    let graph = ring_graph();
    assert_eq!(
        path_between(&graph, "gateway", "ledger"),
        ids(&["gateway", "orders", "billing", "ledger"])
    );
    assert!(path_between(&graph, "ledger", "gateway").is_empty());
}

#[test]
fn changeset_overlay_returns_new_graph() {
    let graph = ring_graph();
    let changeset = Changeset::from_json_str(
        r#"{
            "id": "cs-1",
            "changes": [
                { "operation": "add", "element_id": "ledger" },
                { "operation": "update", "elementId": "orders" },
                { "operation": "update", "elementId": "g-o" }
            ]
        }"#,
    )
    .unwrap();

    let overlaid = graph.with_changeset(&changeset);

    assert!(!graph.has_changes(), "source graph must stay untouched");
    assert!(overlaid.has_changes());
    assert_eq!(overlaid.node("ledger").unwrap().changeset, Some(ChangeStatus::New));
    assert_eq!(
        overlaid.node("orders").unwrap().changeset,
        Some(ChangeStatus::Modified)
    );
    assert_eq!(overlaid.node("billing").unwrap().changeset, None);

    // own status, inherited from a new endpoint, and none for a modified endpoint
    assert_eq!(overlaid.edge("g-o").unwrap().changeset, Some(ChangeStatus::Modified));
    assert_eq!(overlaid.edge("b-l").unwrap().changeset, Some(ChangeStatus::New));
    assert_eq!(overlaid.edge("o-b").unwrap().changeset, None);
}

#[test]
fn require_node_reports_unknown_ids() {
    let graph = ring_graph();
    assert!(graph.require_node("orders").is_ok());
    let err = graph.require_node("nope").unwrap_err();
    assert!(err.to_string().contains("nope"));
}
