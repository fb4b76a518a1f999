//! Atlas Tree
//!
//! Virtual directory hierarchy for path-tagged catalog items.
//!
//! # Core Operations
//!
//! - **Build**: flat items → [`TreeNode`] rooted hierarchy ([`TreeNode::build`])
//! - **Search**: case-insensitive pruning filter ([`TreeNode::filter`])
//! - **Count**: recursive item count for folder badges ([`TreeNode::count_items`])
//! - **Move**: drag-to-move with delegated persistence ([`move_item`])
//!
//! # Example
//!
//! ```rust,ignore
//! use atlas_tree::TreeNode;
//!
//! let tree = TreeNode::build(&diagrams);
//! if let Some(hits) = tree.filter("gateway") {
//!     println!("{} matches", hits.count_items());
//! }
//! ```

#![warn(unreachable_pub)]

pub mod mutation;
pub mod tree;

pub use mutation::{move_item, plan_move, MoveError, MoveOutcome, MovePlan, MoveTarget, PathStore};
pub use tree::{NodeKind, TreeNode};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
