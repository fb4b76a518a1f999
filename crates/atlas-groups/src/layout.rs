//! Container layout derived from a flat node list
//!
//! The canvas reports every node with an optional `parent_id`. Before a save
//! we turn that into two persisted maps: which children each container owns,
//! and where each child sits relative to its container.

use atlas_model::{Dimensions, GraphNode, GroupEntry, PositionEntry};
use serde::Serialize;
use std::collections::BTreeMap;

/// Container size used when its style carries no numeric width/height
pub const DEFAULT_GROUP_DIMENSIONS: Dimensions = Dimensions {
    width: 300.0,
    height: 200.0,
};

/// Child size used when the canvas has not measured the node
pub const DEFAULT_CHILD_DIMENSIONS: Dimensions = Dimensions {
    width: 100.0,
    height: 50.0,
};

/// Provider recorded for containers without `data.provider`
pub const DEFAULT_PROVIDER: &str = "generic";

/// Label recorded for containers without `data.label`
pub const DEFAULT_LABEL: &str = "Group";

/// Per-container placement map
pub type PositionMap = BTreeMap<String, BTreeMap<String, PositionEntry>>;

/// Layout inconsistencies found by [`GroupLayout::validate`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    /// Placement recorded for a container that has no group entry
    #[error("positions recorded for unknown group {group}")]
    UnknownGroup { group: String },

    /// Placement recorded for a child the group does not own
    #[error("child {child} has a position in group {group} but is not a member")]
    NotAMember { group: String, child: String },
}

/// Derived container layout for one graph
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupLayout {
    /// Container id → owned children
    pub groups: BTreeMap<String, GroupEntry>,
    /// Container id → child id → relative placement
    pub positions: PositionMap,
    /// Nodes whose `parent_id` names no container, in node-list order
    pub orphans: Vec<String>,
}

impl GroupLayout {
    /// Derive the layout for `nodes`
    #[must_use]
    pub fn compute(nodes: &[GraphNode]) -> Self {
        let mut layout = Self::default();

        for container in nodes.iter().filter(|n| n.is_container()) {
            let children: Vec<&GraphNode> = nodes
                .iter()
                .filter(|n| n.parent_id.as_deref() == Some(container.id.as_str()))
                .collect();

            let placements = children
                .iter()
                .map(|child| {
                    let entry = PositionEntry {
                        relative_position: child.position,
                        dimensions: child_dimensions(child),
                    };
                    (child.id.clone(), entry)
                })
                .collect();

            layout.groups.insert(
                container.id.clone(),
                GroupEntry {
                    child_ids: children.iter().map(|c| c.id.clone()).collect(),
                    dimensions: container_dimensions(container),
                    provider: Some(non_blank(container.data_str("provider"), DEFAULT_PROVIDER)),
                    label: Some(non_blank(container.data_str("label"), DEFAULT_LABEL)),
                },
            );
            layout.positions.insert(container.id.clone(), placements);
        }

        layout.orphans = nodes
            .iter()
            .filter(|n| {
                n.parent_id
                    .as_deref()
                    .is_some_and(|parent| !layout.groups.contains_key(parent))
            })
            .map(|n| n.id.clone())
            .collect();

        if !layout.orphans.is_empty() {
            tracing::warn!(orphans = ?layout.orphans, "nodes reference missing containers");
        }
        tracing::debug!(
            groups = layout.groups.len(),
            grouped = layout.grouped_count(),
            "computed group layout"
        );
        layout
    }

    /// Check that every placed child is a member of its group
    ///
    /// # Errors
    /// The first inconsistency found, in container order.
    pub fn validate(&self) -> Result<(), LayoutError> {
        for (group, placements) in &self.positions {
            let entry = self
                .groups
                .get(group)
                .ok_or_else(|| LayoutError::UnknownGroup {
                    group: group.clone(),
                })?;
            if let Some(child) = placements.keys().find(|c| !entry.child_ids.contains(*c)) {
                return Err(LayoutError::NotAMember {
                    group: group.clone(),
                    child: child.clone(),
                });
            }
        }
        Ok(())
    }

    /// Container that owns `child`
    #[must_use]
    pub fn group_of(&self, child: &str) -> Option<&str> {
        self.groups
            .iter()
            .find(|(_, entry)| entry.child_ids.iter().any(|c| c == child))
            .map(|(group, _)| group.as_str())
    }

    /// Placement of `child` inside `group`
    #[must_use]
    pub fn position(&self, group: &str, child: &str) -> Option<&PositionEntry> {
        self.positions.get(group)?.get(child)
    }

    /// Children owned by any container
    #[must_use]
    pub fn grouped_count(&self) -> usize {
        self.groups.values().map(|g| g.child_ids.len()).sum()
    }

    /// Split into the persisted `(node_groups, node_positions)` pair
    #[must_use]
    pub fn into_parts(self) -> (BTreeMap<String, GroupEntry>, PositionMap) {
        (self.groups, self.positions)
    }
}

fn container_dimensions(node: &GraphNode) -> Dimensions {
    Dimensions::new(
        node.style_dimension("width")
            .unwrap_or(DEFAULT_GROUP_DIMENSIONS.width),
        node.style_dimension("height")
            .unwrap_or(DEFAULT_GROUP_DIMENSIONS.height),
    )
}

// Unmeasured nodes report zero until the renderer lays them out.
fn child_dimensions(node: &GraphNode) -> Dimensions {
    let measured = |v: Option<f64>| v.filter(|v| *v > 0.0);
    Dimensions::new(
        measured(node.width).unwrap_or(DEFAULT_CHILD_DIMENSIONS.width),
        measured(node.height).unwrap_or(DEFAULT_CHILD_DIMENSIONS.height),
    )
}

fn non_blank(value: Option<&str>, fallback: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback)
        .to_string()
}
