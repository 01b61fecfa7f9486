//! # archview model
//!
//! The read-only input contract of the engine: a layered architecture model
//! (motivation, business, security, application, technology, api, datastore)
//! made of elements and relationships, plus the changeset documents produced
//! by change tracking.
//!
//! Models are tolerated as hand-authored: every field except element ids and
//! relationship endpoints is optional, and property lookups ignore case and
//! `-`/`_` separators.

mod changeset;
mod error;
mod layer;
mod types;

pub use changeset::{Change, ChangeOperation, ChangeStatus, Changeset};
pub use error::{ModelError, Result};
pub use layer::LayerKind;
pub use types::{normalize_token, ArchitectureModel, Element, Layer, Properties, Relationship};
