//! Data-access seam

use crate::error::CatalogResult;
use crate::requests::{DiagramPatch, EnvironmentPatch, NewDiagram, NewEnvironment};
use async_trait::async_trait;
use atlas_model::{Diagram, DiagramId, Environment, EnvironmentId, WorkspaceId};

/// Environment and diagram CRUD for one backend
///
/// List calls answer a missing collection with an empty list; detail calls
/// answer a missing record with `CatalogError::NotFound`.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn list_environments(&self, workspace: &WorkspaceId) -> CatalogResult<Vec<Environment>>;

    async fn create_environment(
        &self,
        workspace: &WorkspaceId,
        request: &NewEnvironment,
    ) -> CatalogResult<Environment>;

    async fn update_environment(
        &self,
        workspace: &WorkspaceId,
        environment: &EnvironmentId,
        patch: &EnvironmentPatch,
    ) -> CatalogResult<Environment>;

    async fn delete_environment(
        &self,
        workspace: &WorkspaceId,
        environment: &EnvironmentId,
    ) -> CatalogResult<()>;

    async fn list_diagrams(
        &self,
        workspace: &WorkspaceId,
        environment: &EnvironmentId,
    ) -> CatalogResult<Vec<Diagram>>;

    async fn get_diagram(
        &self,
        workspace: &WorkspaceId,
        environment: &EnvironmentId,
        diagram: &DiagramId,
    ) -> CatalogResult<Diagram>;

    async fn create_diagram(
        &self,
        workspace: &WorkspaceId,
        request: &NewDiagram,
    ) -> CatalogResult<Diagram>;

    async fn update_diagram(
        &self,
        workspace: &WorkspaceId,
        environment: &EnvironmentId,
        diagram: &DiagramId,
        patch: &DiagramPatch,
    ) -> CatalogResult<Diagram>;

    async fn delete_diagram(
        &self,
        workspace: &WorkspaceId,
        environment: &EnvironmentId,
        diagram: &DiagramId,
    ) -> CatalogResult<()>;
}
