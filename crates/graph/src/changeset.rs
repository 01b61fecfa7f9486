use crate::types::ClassifiedGraph;
use archview_model::{ChangeStatus, Changeset};

impl ClassifiedGraph {
    /// Copy of this graph with change statuses attached.
    ///
    /// Nodes take the status of their element. Edges take the status of their
    /// relationship, else inherit `New`/`Deleted` from an endpoint; a modified
    /// endpoint does not mark its edges.
    pub fn with_changeset(&self, changeset: &Changeset) -> ClassifiedGraph {
        let statuses = changeset.statuses();

        let nodes: Vec<_> = self
            .nodes()
            .iter()
            .map(|n| {
                let mut n = n.clone();
                n.changeset = statuses.get(&n.id).copied();
                n
            })
            .collect();

        let endpoint_status = |id: &str| {
            statuses
                .get(id)
                .copied()
                .filter(|s| matches!(s, ChangeStatus::New | ChangeStatus::Deleted))
        };
        let edges: Vec<_> = self
            .edges()
            .iter()
            .map(|e| {
                let mut e = e.clone();
                e.changeset = statuses
                    .get(&e.id)
                    .copied()
                    .or_else(|| endpoint_status(&e.source))
                    .or_else(|| endpoint_status(&e.target));
                e
            })
            .collect();

        let changed = nodes.iter().filter(|n| n.changeset.is_some()).count();
        log::debug!(
            "Applied changeset with {} changes: {} nodes marked",
            changeset.changes.len(),
            changed
        );
        self.with_parts(nodes, edges)
    }

    /// Whether any node or edge carries a change status
    pub fn has_changes(&self) -> bool {
        self.nodes().iter().any(|n| n.changeset.is_some())
            || self.edges().iter().any(|e| e.changeset.is_some())
    }
}
