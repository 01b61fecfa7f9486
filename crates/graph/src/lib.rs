//! # archview graph
//!
//! Classifies a layered architecture model into a C4 graph.
//!
//! ## Features
//!
//! - **Container detection** - services owning API operations or realizing business services
//! - **Technology inference** - declared stacks plus a vocabulary scan of names and descriptions
//! - **Protocol inference** - ordered keyword tables, API-operation backing, relation semantics
//! - **Structural validation** - containment cycles, dangling references, duplicates, orphans
//! - **Traversal** - upstream/downstream traces and path highlighting
//!
//! ## Architecture
//!
//! ```text
//! ArchitectureModel
//!     │
//!     ├──> Graph Builder
//!     │      ├─ Pick layers (application, api, technology, business, security, datastore)
//!     │      ├─ Classify containers, components, external actors, datastores
//!     │      ├─ Infer edges (protocol, direction, description)
//!     │      ├─ Map deployments
//!     │      └─ Assemble hierarchy + metadata
//!     │
//!     ├──> Classified Graph (immutable)
//!     │      ├─ Nodes / Edges / Hierarchy
//!     │      └─ Indexes (kind, technology, container type, containment)
//!     │
//!     ├──> Validation (read-only report)
//!     │
//!     └──> Overlays & traversal
//!            ├─ Changeset statuses (new graph value)
//!            └─ Traces, neighbourhoods, paths
//! ```

mod builder;
mod changeset;
mod config;
mod error;
mod index;
pub mod inference;
pub mod traverse;
mod types;
mod validate;

pub use builder::GraphBuilder;
pub use config::GraphBuilderConfig;
pub use error::{GraphError, Result};
pub use index::GraphIndexes;
pub use types::{
    AbstractionKind, Boundary, BuildTiming, ClassifiedGraph, ContainerType, Detection,
    DetectionSignal, Direction, Edge, GraphMetadata, Hierarchy, Node, NodeMetadata, ParseWarning,
    Protocol, Severity, SourceRef, TechnologySource, ValidationError, ValidationKind, WarningKind,
};
pub use validate::{validate, ValidationReport};

pub use archview_model::ChangeStatus;
