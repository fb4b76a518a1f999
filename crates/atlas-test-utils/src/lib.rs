//! Testing utilities for the Atlas workspace
//!
//! Shared fixtures and an in-memory catalog.

#![allow(missing_docs)]

mod fake;

pub use fake::{Call, FakeCatalog, Op};

use atlas_model::{
    Diagram, DiagramId, Environment, EnvironmentId, GraphEdge, GraphNode, ItemPath, Position,
    WorkspaceId, CONTAINER_TYPE,
};
use chrono::{DateTime, Utc};

/// Timestamp used by every fixture
pub fn fixed_time() -> DateTime<Utc> {
    DateTime::from_timestamp(1_704_067_200, 0).unwrap()
}

pub fn workspace() -> WorkspaceId {
    WorkspaceId::new("ws-test")
}

pub fn environment(id: &str, name: &str, path: &str) -> Environment {
    Environment {
        id: EnvironmentId::new(id),
        name: name.to_string(),
        description: None,
        path: ItemPath::parse(path),
        is_active: true,
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

pub fn diagram(id: &str, name: &str, path: &str) -> Diagram {
    Diagram {
        id: DiagramId::new(id),
        name: name.to_string(),
        description: None,
        path: ItemPath::parse(path),
        nodes: Vec::new(),
        edges: Vec::new(),
        viewport: None,
        node_groups: None,
        node_positions: None,
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

/// Diagram holding the given nodes
pub fn diagram_with_nodes(id: &str, name: &str, nodes: Vec<GraphNode>) -> Diagram {
    Diagram {
        nodes,
        ..diagram(id, name, "")
    }
}

pub fn node(id: &str, x: f64, y: f64) -> GraphNode {
    GraphNode::new(id, "compute", Position::new(x, y))
}

pub fn container(id: &str, x: f64, y: f64) -> GraphNode {
    GraphNode::new(id, CONTAINER_TYPE, Position::new(x, y))
}

pub fn child(id: &str, parent: &str, x: f64, y: f64) -> GraphNode {
    node(id, x, y).with_parent(parent)
}

pub fn edge(source: &str, target: &str) -> GraphEdge {
    GraphEdge::new(format!("{source}->{target}"), source, target)
}
