//! Atlas Model
//!
//! Shared records for the Atlas catalog.
//!
//! # Core Concepts
//!
//! - [`ItemPath`]: normalized `/`-delimited location in the virtual hierarchy
//! - [`PathItem`]: anything that can be filed under an [`ItemPath`]
//! - [`Environment`] / [`Diagram`]: the two item kinds served by the catalog
//! - [`GraphNode`] / [`GraphEdge`]: diagram contents, with container nesting
//!   via `parent_id`
//!
//! # Example
//!
//! ```rust
//! use atlas_model::ItemPath;
//!
//! let path = ItemPath::parse(" ops / /net ");
//! assert_eq!(path.to_string(), "ops/net");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod graph;
mod item;
mod path;

pub use graph::{
    Dimensions, Graph, GraphEdge, GraphNode, GroupEntry, Position, PositionEntry, Viewport,
    CONTAINER_TYPE,
};
pub use item::{Diagram, DiagramId, Environment, EnvironmentId, PathItem, WorkspaceId};
pub use path::{ItemPath, SEPARATOR};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
