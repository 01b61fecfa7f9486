use crate::error::{Result, ViewError};
use crate::layout::LayoutService;
use crate::options::TransformOptions;
use crate::result::RenderResult;
use crate::transformer;
use archview_graph::ClassifiedGraph;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Current graph plus request sequencing for an interactive surface.
///
/// Every `transform` call and every `load` takes a new generation number. A
/// transform whose generation is no longer the latest when its layout
/// finishes is reported as [`ViewError::Superseded`] and its result dropped.
pub struct TransformSession {
    graph: watch::Sender<Option<Arc<ClassifiedGraph>>>,
    generation: AtomicU64,
}

impl Default for TransformSession {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformSession {
    pub fn new() -> Self {
        let (graph, _) = watch::channel(None);
        Self {
            graph,
            generation: AtomicU64::new(0),
        }
    }

    /// Replace the current graph; in-flight transforms become stale
    pub fn load(&self, graph: Arc<ClassifiedGraph>) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        log::debug!(
            "Loaded graph with {} nodes (generation {})",
            graph.node_count(),
            generation
        );
        self.graph.send_replace(Some(graph));
    }

    pub fn current(&self) -> Option<Arc<ClassifiedGraph>> {
        self.graph.borrow().clone()
    }

    /// Watch graph replacements
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<ClassifiedGraph>>> {
        self.graph.subscribe()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub async fn transform(
        &self,
        options: &TransformOptions,
        layout: &dyn LayoutService,
    ) -> Result<RenderResult> {
        options.validate()?;
        let graph = self.current().ok_or(ViewError::GraphNotLoaded)?;
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let result = transformer::transform(&graph, options, layout).await?;

        let current = self.generation();
        if current != ticket {
            log::debug!("Discarding transform {} (latest is {})", ticket, current);
            return Err(ViewError::Superseded { ticket, current });
        }
        Ok(result)
    }
}
