//! Atlas Groups
//!
//! Container ("group") bookkeeping for diagram saves.
//!
//! A graph arrives from the canvas as a flat node list in which children
//! point at their container through `parent_id`. [`GroupLayout::compute`]
//! derives the `node_groups` / `node_positions` maps that are persisted with
//! the diagram so nesting survives a reload.
//!
//! # Example
//!
//! ```rust
//! use atlas_groups::GroupLayout;
//! use atlas_model::{GraphNode, Position};
//!
//! let nodes = vec![
//!     GraphNode::new("vpc", "group", Position::default()),
//!     GraphNode::new("db", "database", Position::new(10.0, 20.0)).with_parent("vpc"),
//! ];
//! let layout = GroupLayout::compute(&nodes);
//! assert_eq!(layout.group_of("db"), Some("vpc"));
//! ```

#![warn(unreachable_pub)]

pub mod layout;

pub use layout::{
    GroupLayout, LayoutError, PositionMap, DEFAULT_CHILD_DIMENSIONS, DEFAULT_GROUP_DIMENSIONS,
    DEFAULT_LABEL, DEFAULT_PROVIDER,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
