//! # archview view
//!
//! Turns a classified graph into a render-ready view: one C4 level, filtered,
//! styled and positioned by an external layout service.
//!
//! ## Architecture
//!
//! ```text
//! ClassifiedGraph + TransformOptions
//!     │
//!     ├──> Projection (sync, pure)
//!     │      ├─ Resolve selection (stale -> nearest ancestor view)
//!     │      ├─ Level members (context / container / component)
//!     │      ├─ Filters (container type, technology, changeset)
//!     │      ├─ Deployment overlay + scenario presets
//!     │      └─ Highlights, focus dimming, semantic zoom, breadcrumbs
//!     │
//!     ├──> LayoutService (async, external)
//!     │      └─ Manual positions bypass the service
//!     │
//!     └──> RenderResult (positions, sizes, bounds)
//! ```
//!
//! [`TransformSession`] wraps the transformer for interactive use and drops
//! results of superseded requests.

mod breadcrumb;
mod error;
mod layout;
mod options;
mod projection;
mod result;
mod session;
mod transformer;

pub use breadcrumb::{Breadcrumb, CONTEXT_LABEL};
pub use error::{Result, ViewError};
pub use layout::{GridLayout, LayoutEdge, LayoutNode, LayoutRequest, LayoutResponse, LayoutService, Size};
pub use options::{
    DetailLevel, FocusSpec, LayoutAlgorithm, PathHighlight, PathMode, Position, ScenarioPreset,
    TransformOptions, ViewLevel,
};
pub use projection::{
    project, EdgeDisplay, FallbackNotice, NodeDisplay, ProjectedEdge, ProjectedNode, ViewProjection,
};
pub use result::{Bounds, RenderEdge, RenderNode, RenderResult};
pub use session::TransformSession;
pub use transformer::{transform, ViewTransformer};
