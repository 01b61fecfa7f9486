use archview_graph::{ClassifiedGraph, GraphBuilder};
use archview_model::ArchitectureModel;
use serde_json::json;

/// Storefront -> Order Service -> {PostgreSQL, Order Events, Stripe}, with two
/// components inside the order service and a Kubernetes deployment target.
pub fn shop_graph() -> ClassifiedGraph {
    let model: ArchitectureModel = serde_json::from_value(json!({
        "layers": {
            "business": {
                "type": "business",
                "elements": [
                    { "id": "customer", "type": "BusinessActor", "name": "Customer" },
                    { "id": "stripe", "type": "BusinessService", "name": "Stripe" }
                ]
            },
            "application": {
                "type": "application",
                "elements": [
                    { "id": "web", "type": "ApplicationService", "name": "Storefront",
                      "properties": { "realizes": "shop", "framework": "React" } },
                    { "id": "orders-svc", "type": "ApplicationService", "name": "Order Service",
                      "description": "Accepts and tracks orders",
                      "properties": { "technology": "Java, Spring Boot" } },
                    { "id": "events", "type": "ApplicationService", "name": "Order Events",
                      "properties": { "realizes": "notify", "containerType": "queue", "technology": "Kafka" } },
                    { "id": "order-controller", "type": "ApplicationComponent", "name": "Order Controller",
                      "properties": { "parent": "orders-svc" } },
                    { "id": "order-repo", "type": "ApplicationComponent", "name": "Order Repository",
                      "properties": { "parent": "orders-svc" } }
                ],
                "relationships": [
                    { "id": "r-cust-web", "type": "uses", "source": "customer", "target": "web" },
                    { "id": "r-web-orders", "type": "uses", "source": "web", "target": "orders-svc" },
                    { "id": "r-orders-db", "type": "access", "source": "orders-svc", "target": "db",
                      "properties": { "protocol": "jdbc" } },
                    { "id": "r-orders-events", "type": "flow", "source": "orders-svc", "target": "events",
                      "properties": { "direction": "async" } },
                    { "id": "r-orders-stripe", "type": "calls", "source": "orders-svc", "target": "stripe" },
                    { "id": "r-ctrl-repo", "type": "calls", "source": "order-controller", "target": "order-repo" },
                    { "id": "r-repo-db", "type": "access", "source": "order-repo", "target": "db" },
                    { "id": "r-orders-k8s", "type": "runs-on", "source": "orders-svc", "target": "k8s" }
                ]
            },
            "api": {
                "type": "api",
                "elements": [
                    { "id": "place-order", "type": "operation", "name": "placeOrder",
                      "properties": { "service": "orders-svc", "method": "POST", "path": "/orders" } }
                ]
            },
            "datastore": {
                "type": "datastore",
                "elements": [ { "id": "db", "type": "database", "name": "PostgreSQL" } ]
            },
            "technology": {
                "type": "technology",
                "elements": [
                    { "id": "k8s", "type": "node", "name": "Cluster", "properties": { "platform": "Kubernetes" } }
                ]
            }
        }
    }))
    .expect("shop model fixture");
    GraphBuilder::default().build(&model)
}
