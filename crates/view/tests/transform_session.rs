use archview_view::{
    Bounds, GridLayout, LayoutAlgorithm, LayoutRequest, LayoutResponse, LayoutService, Position,
    TransformOptions, TransformSession, ViewError, ViewLevel, ViewTransformer,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

mod support;

/// Fails every request and counts how often it was asked
#[derive(Default)]
struct RefusingLayout {
    calls: AtomicUsize,
}

#[async_trait]
impl LayoutService for RefusingLayout {
    fn name(&self) -> &str {
        "refusing"
    }

    async fn layout(&self, _request: LayoutRequest) -> archview_view::Result<LayoutResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ViewError::layout("engine offline"))
    }
}

/// Grid layout that waits for a signal before answering
struct GatedLayout {
    gate: Arc<Notify>,
}

#[async_trait]
impl LayoutService for GatedLayout {
    fn name(&self) -> &str {
        "gated"
    }

    async fn layout(&self, request: LayoutRequest) -> archview_view::Result<LayoutResponse> {
        self.gate.notified().await;
        GridLayout::default().layout(request).await
    }
}

#[tokio::test]
async fn transform_positions_every_node_and_computes_bounds() {
    let graph = support::shop_graph();
    let transformer = ViewTransformer::new(TransformOptions::context()).unwrap();
    let result = transformer
        .transform(&graph, &GridLayout::default())
        .await
        .unwrap();

    assert_eq!(result.view_level, ViewLevel::Context);
    assert_eq!(result.nodes.len(), 6);
    for node in &result.nodes {
        assert!(node.position.x >= result.bounds.x);
        assert!(node.position.y >= result.bounds.y);
        assert!(node.position.x + node.size.width <= result.bounds.x + result.bounds.width);
        assert!(node.position.y + node.size.height <= result.bounds.y + result.bounds.height);
    }
    assert!(result.bounds.width > 0.0 && result.bounds.height > 0.0);
}

#[tokio::test]
async fn manual_layout_uses_supplied_positions_verbatim() {
    let graph = support::shop_graph();
    let layout = RefusingLayout::default();
    let options = TransformOptions {
        layout: LayoutAlgorithm::Manual,
        manual_positions: HashMap::from([("web".to_string(), Position::new(420.0, -35.5))]),
        ..TransformOptions::context()
    };

    let result = archview_view::transform(&graph, &options, &layout)
        .await
        .unwrap();

    assert_eq!(layout.calls.load(Ordering::SeqCst), 0);
    assert_eq!(result.node("web").unwrap().position, Position::new(420.0, -35.5));
    assert_eq!(result.node("db").unwrap().position, Position::ORIGIN);
}

#[tokio::test]
async fn layout_failure_surfaces_as_error() {
    let graph = support::shop_graph();
    let err = archview_view::transform(&graph, &TransformOptions::context(), &RefusingLayout::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ViewError::Layout(_)));
}

#[tokio::test]
async fn empty_view_skips_layout_and_has_zero_bounds() {
    let graph = support::shop_graph();
    let layout = RefusingLayout::default();
    let options = TransformOptions {
        changeset_only: true,
        ..TransformOptions::context()
    };

    let result = archview_view::transform(&graph, &options, &layout)
        .await
        .unwrap();
    assert!(result.nodes.is_empty());
    assert_eq!(result.bounds, Bounds::default());
    assert_eq!(layout.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn session_requires_a_loaded_graph() {
    let session = TransformSession::new();
    let err = session
        .transform(&TransformOptions::context(), &GridLayout::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ViewError::GraphNotLoaded));
    assert_eq!(session.generation(), 0, "rejected requests take no ticket");

    session.load(Arc::new(support::shop_graph()));
    assert!(session
        .transform(&TransformOptions::context(), &GridLayout::default())
        .await
        .is_ok());
}

#[tokio::test]
async fn superseded_request_result_is_discarded() {
    let session = TransformSession::new();
    session.load(Arc::new(support::shop_graph()));

    let gate = Arc::new(Notify::new());
    let slow = GatedLayout { gate: gate.clone() };
    let options = TransformOptions::context();

    let first = session.transform(&options, &slow);
    let second = async {
        let result = session
            .transform(&TransformOptions::container("orders-svc"), &GridLayout::default())
            .await;
        gate.notify_one();
        result
    };
    let (first, second) = tokio::join!(first, second);

    assert!(matches!(first, Err(ViewError::Superseded { .. })));
    assert_eq!(second.unwrap().view_level, ViewLevel::Container);
}

#[tokio::test]
async fn reloading_the_graph_supersedes_in_flight_requests() {
    let session = TransformSession::new();
    session.load(Arc::new(support::shop_graph()));
    let updates = session.subscribe();

    let gate = Arc::new(Notify::new());
    let slow = GatedLayout { gate: gate.clone() };
    let options = TransformOptions::context();

    let pending = session.transform(&options, &slow);
    let reload = async {
        session.load(Arc::new(support::shop_graph()));
        gate.notify_one();
    };
    let (result, ()) = tokio::join!(pending, reload);

    assert!(matches!(result, Err(ViewError::Superseded { .. })));
    assert!(updates.has_changed().unwrap());
}
