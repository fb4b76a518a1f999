//! Catalog records organized by path
//!
//! Environments and diagrams are both "items": named records carrying an
//! optional [`ItemPath`]. The [`PathItem`] trait is what the tree builder
//! and the move engine see of them.

use crate::graph::{GraphEdge, GraphNode, GroupEntry, PositionEntry, Viewport};
use crate::path::ItemPath;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create from any string-like value
            #[inline]
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the raw identifier
            #[inline]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

string_id!(
    /// Tenant scope under which environments and diagrams are namespaced
    WorkspaceId
);
string_id!(
    /// Server-assigned environment identifier
    EnvironmentId
);
string_id!(
    /// Server-assigned diagram identifier
    DiagramId
);

/// A record that can be placed in the virtual directory hierarchy
pub trait PathItem: Clone {
    /// Stable identifier
    fn id(&self) -> &str;

    /// Display name (sort key within a folder)
    fn name(&self) -> &str;

    /// Optional free-text description (searched by filters)
    fn description(&self) -> Option<&str>;

    /// Normalized location; root when the item has no path
    fn path(&self) -> &ItemPath;
}

/// Deployment environment (a folder-organized item)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub id: EnvironmentId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub path: ItemPath,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl PathItem for Environment {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn path(&self) -> &ItemPath {
        &self.path
    }
}

/// Node/edge graph stored under an environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    pub id: DiagramId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub path: ItemPath,
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
    /// Container → children ownership, as last persisted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_groups: Option<BTreeMap<String, GroupEntry>>,
    /// Container → child → relative placement, as last persisted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_positions: Option<BTreeMap<String, BTreeMap<String, PositionEntry>>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Diagram {
    /// Whether the diagram still holds graph nodes
    #[inline]
    #[must_use]
    pub fn has_nodes(&self) -> bool {
        !self.nodes.is_empty()
    }
}

impl PathItem for Diagram {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn path(&self) -> &ItemPath {
        &self.path
    }
}
