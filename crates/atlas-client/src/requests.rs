//! Request bodies for catalog writes
//!
//! Updates are partial. For `path`, three states matter on the wire:
//! field omitted (unchanged), `null` (move to root) and a string (move to
//! that folder). `Option<Option<ItemPath>>` carries all three.

use crate::error::{CatalogError, CatalogResult};
use atlas_model::{
    EnvironmentId, GraphEdge, GraphNode, GroupEntry, ItemPath, PositionEntry, Viewport,
};
use serde::Serialize;
use std::collections::BTreeMap;

fn require_name(name: &str, kind: &str) -> CatalogResult<()> {
    if name.trim().is_empty() {
        return Err(CatalogError::validation(format!("{kind} name is required")));
    }
    Ok(())
}

/// Path field of a partial update
fn path_change(path: &ItemPath) -> Option<Option<ItemPath>> {
    if path.is_root() {
        Some(None)
    } else {
        Some(Some(path.clone()))
    }
}

/// Body of `POST /environments`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewEnvironment {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<ItemPath>,
}

impl NewEnvironment {
    /// Environment with a trimmed name and normalized path
    #[must_use]
    pub fn new(name: &str, path: &str) -> Self {
        let path = ItemPath::parse(path);
        Self {
            name: name.trim().to_string(),
            description: None,
            path: (!path.is_root()).then_some(path),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// # Errors
    /// `CatalogError::Validation` for a blank name.
    pub fn validate(&self) -> CatalogResult<()> {
        require_name(&self.name, "environment")
    }
}

/// Body of `POST /diagrams`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewDiagram {
    pub environment_id: EnvironmentId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<ItemPath>,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl NewDiagram {
    /// Empty diagram with a trimmed name and normalized path
    #[must_use]
    pub fn new(environment_id: EnvironmentId, name: &str, path: &str) -> Self {
        let path = ItemPath::parse(path);
        Self {
            environment_id,
            name: name.trim().to_string(),
            description: None,
            path: (!path.is_root()).then_some(path),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// # Errors
    /// `CatalogError::Validation` for a blank name.
    pub fn validate(&self) -> CatalogResult<()> {
        require_name(&self.name, "diagram")
    }
}

/// Body of `PUT /environments/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnvironmentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Option<ItemPath>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl EnvironmentPatch {
    /// Patch that only moves the environment
    #[must_use]
    pub fn move_to(path: &ItemPath) -> Self {
        Self {
            path: path_change(path),
            ..Self::default()
        }
    }
}

/// Body of `PUT /diagrams/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiagramPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Option<ItemPath>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<GraphNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edges: Option<Vec<GraphEdge>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_groups: Option<BTreeMap<String, GroupEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_positions: Option<BTreeMap<String, BTreeMap<String, PositionEntry>>>,
}

impl DiagramPatch {
    /// Patch that only moves the diagram
    #[must_use]
    pub fn move_to(path: &ItemPath) -> Self {
        Self {
            path: path_change(path),
            ..Self::default()
        }
    }

    /// Whether the patch changes nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn omitted_path_is_not_serialized() {
        let patch = DiagramPatch {
            name: Some("Renamed".into()),
            ..DiagramPatch::default()
        };
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({"name": "Renamed"}));
    }

    #[test]
    fn move_to_root_sends_explicit_null() {
        let patch = DiagramPatch::move_to(&ItemPath::parse(" / "));
        assert_eq!(patch.path, Some(None));
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({"path": null}));
    }

    #[test]
    fn move_to_folder_sends_normalized_string() {
        let patch = EnvironmentPatch::move_to(&ItemPath::parse("ops/ net"));
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({"path": "ops/net"}));
    }

    #[test]
    fn new_diagram_drops_root_path() {
        let body = NewDiagram::new(EnvironmentId::new("e1"), "  Edge  ", " ");
        assert_eq!(body.name, "Edge");
        assert!(body.path.is_none());
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["environment_id"], json!("e1"));
        assert!(value.get("path").is_none());
    }

    #[test]
    fn blank_names_are_rejected() {
        assert!(NewEnvironment::new("   ", "a").validate().is_err());
        assert!(NewDiagram::new(EnvironmentId::new("e"), "", "").validate().is_err());
        assert!(NewEnvironment::new("Prod", "").validate().is_ok());
    }

    #[test]
    fn default_patch_is_empty() {
        assert!(DiagramPatch::default().is_empty());
        assert!(!DiagramPatch::move_to(&ItemPath::root()).is_empty());
    }
}
