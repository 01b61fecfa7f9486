use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Status of an element relative to a tracked changeset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    New,
    Modified,
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOperation {
    Add,
    Update,
    Delete,
}

/// A single recorded change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    pub operation: ChangeOperation,

    #[serde(alias = "element_id")]
    pub element_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,

    #[serde(default, alias = "element_type", skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,
}

/// An ordered list of changes produced by the change-tracking feature
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Changeset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub changes: Vec<Change>,
}

impl Changeset {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Fold the change list into the final status of each touched element.
    ///
    /// An element added and later updated stays `New`; a delete always wins.
    pub fn statuses(&self) -> HashMap<String, ChangeStatus> {
        let mut out: HashMap<String, ChangeStatus> = HashMap::new();
        for change in &self.changes {
            let next = match (change.operation, out.get(&change.element_id)) {
                (ChangeOperation::Delete, _) => ChangeStatus::Deleted,
                (ChangeOperation::Add, _) => ChangeStatus::New,
                (ChangeOperation::Update, Some(ChangeStatus::New)) => ChangeStatus::New,
                (ChangeOperation::Update, _) => ChangeStatus::Modified,
            };
            out.insert(change.element_id.clone(), next);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn folds_operations_per_element() {
        let raw = r#"{
            "version": "1.0",
            "changes": [
                {"operation": "add", "element_id": "security.role.admin", "layer": "security"},
                {"operation": "update", "element_id": "security.role.admin"},
                {"operation": "update", "element_id": "application.service.auth"},
                {"operation": "add", "element_id": "tmp"},
                {"operation": "delete", "element_id": "tmp"}
            ]
        }"#;
        let statuses = Changeset::from_json_str(raw).unwrap().statuses();

        assert_eq!(statuses["security.role.admin"], ChangeStatus::New);
        assert_eq!(statuses["application.service.auth"], ChangeStatus::Modified);
        assert_eq!(statuses["tmp"], ChangeStatus::Deleted);
        assert_eq!(statuses.len(), 3);
    }
}
