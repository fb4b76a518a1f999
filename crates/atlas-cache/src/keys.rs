//! Composite keys for the three catalog keyspaces

use atlas_model::{DiagramId, EnvironmentId, WorkspaceId};

/// Environment list of a workspace
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnvironmentsKey {
    pub workspace: WorkspaceId,
}

impl EnvironmentsKey {
    #[must_use]
    pub fn new(workspace: &WorkspaceId) -> Self {
        Self {
            workspace: workspace.clone(),
        }
    }
}

/// Diagram list of one environment
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiagramsKey {
    pub workspace: WorkspaceId,
    pub environment: EnvironmentId,
}

impl DiagramsKey {
    #[must_use]
    pub fn new(workspace: &WorkspaceId, environment: &EnvironmentId) -> Self {
        Self {
            workspace: workspace.clone(),
            environment: environment.clone(),
        }
    }
}

/// A single diagram with its graph
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiagramKey {
    pub workspace: WorkspaceId,
    pub environment: EnvironmentId,
    pub diagram: DiagramId,
}

impl DiagramKey {
    #[must_use]
    pub fn new(workspace: &WorkspaceId, environment: &EnvironmentId, diagram: &DiagramId) -> Self {
        Self {
            workspace: workspace.clone(),
            environment: environment.clone(),
            diagram: diagram.clone(),
        }
    }

    /// Whether the diagram belongs to the given environment
    #[inline]
    #[must_use]
    pub fn is_under(&self, workspace: &WorkspaceId, environment: &EnvironmentId) -> bool {
        &self.workspace == workspace && &self.environment == environment
    }
}
