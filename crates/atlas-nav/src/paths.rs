//! Path persistence for drag-to-move
//!
//! Adapters that let the move engine persist through the cached catalog.
//! The catalog invalidates the affected list on update, so the list read
//! that follows is a fresh fetch.

use async_trait::async_trait;
use atlas_client::{CachedCatalog, Catalog, CatalogError, DiagramPatch, EnvironmentPatch};
use atlas_model::{Diagram, DiagramId, Environment, EnvironmentId, ItemPath, WorkspaceId};
use atlas_tree::PathStore;

/// Diagrams of one environment
#[derive(Debug)]
pub struct DiagramPaths<'a> {
    pub catalog: &'a CachedCatalog,
    pub workspace: &'a WorkspaceId,
    pub environment: &'a EnvironmentId,
}

#[async_trait]
impl<'a> PathStore<Diagram> for DiagramPaths<'a> {
    type Error = CatalogError;

    async fn update_path(&self, item_id: &str, path: &ItemPath) -> Result<Vec<Diagram>, CatalogError> {
        self.catalog
            .update_diagram(
                self.workspace,
                self.environment,
                &DiagramId::new(item_id),
                &DiagramPatch::move_to(path),
            )
            .await?;
        self.catalog
            .diagrams(self.workspace, self.environment, false)
            .await
    }
}

/// Environments of one workspace
#[derive(Debug)]
pub struct EnvironmentPaths<'a> {
    pub catalog: &'a CachedCatalog,
    pub workspace: &'a WorkspaceId,
}

#[async_trait]
impl<'a> PathStore<Environment> for EnvironmentPaths<'a> {
    type Error = CatalogError;

    async fn update_path(
        &self,
        item_id: &str,
        path: &ItemPath,
    ) -> Result<Vec<Environment>, CatalogError> {
        self.catalog
            .update_environment(
                self.workspace,
                &EnvironmentId::new(item_id),
                &EnvironmentPatch::move_to(path),
            )
            .await?;
        self.catalog.environments(self.workspace, false).await
    }
}
