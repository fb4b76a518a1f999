//! Cache-aware catalog
//!
//! Reads go to the cache first unless a refresh is forced. Writes go to the
//! backend and, once it accepts them, drop every key the change touches so
//! the next read refetches.

use crate::catalog::Catalog;
use crate::error::CatalogResult;
use crate::requests::{DiagramPatch, EnvironmentPatch, NewDiagram, NewEnvironment};
use async_trait::async_trait;
use atlas_cache::CatalogCache;
use atlas_model::{Diagram, DiagramId, Environment, EnvironmentId, WorkspaceId};
use std::sync::Arc;

/// [`Catalog`] decorated with a [`CatalogCache`]
#[derive(Clone)]
pub struct CachedCatalog {
    inner: Arc<dyn Catalog>,
    cache: CatalogCache,
}

impl std::fmt::Debug for CachedCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedCatalog")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl CachedCatalog {
    #[must_use]
    pub fn new(inner: Arc<dyn Catalog>, cache: CatalogCache) -> Self {
        Self { inner, cache }
    }

    /// Shared cache handle
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &CatalogCache {
        &self.cache
    }

    /// Environment list, from cache unless `force_refresh`
    ///
    /// # Errors
    /// Backend failures; the cache is left untouched.
    pub async fn environments(
        &self,
        workspace: &WorkspaceId,
        force_refresh: bool,
    ) -> CatalogResult<Vec<Environment>> {
        if !force_refresh {
            if let Some(hit) = self.cache.environments(workspace).await {
                return Ok(hit);
            }
        }
        let items = self.inner.list_environments(workspace).await?;
        self.cache
            .store_environments(workspace, items.clone())
            .await;
        Ok(items)
    }

    /// Diagram list of an environment, from cache unless `force_refresh`
    ///
    /// # Errors
    /// Backend failures; the cache is left untouched.
    pub async fn diagrams(
        &self,
        workspace: &WorkspaceId,
        environment: &EnvironmentId,
        force_refresh: bool,
    ) -> CatalogResult<Vec<Diagram>> {
        if !force_refresh {
            if let Some(hit) = self.cache.diagrams(workspace, environment).await {
                return Ok(hit);
            }
        }
        let items = self.inner.list_diagrams(workspace, environment).await?;
        self.cache
            .store_diagrams(workspace, environment, items.clone())
            .await;
        Ok(items)
    }

    /// Single diagram, from cache unless `force_refresh`
    ///
    /// # Errors
    /// Backend failures, including `NotFound`.
    pub async fn diagram(
        &self,
        workspace: &WorkspaceId,
        environment: &EnvironmentId,
        diagram: &DiagramId,
        force_refresh: bool,
    ) -> CatalogResult<Diagram> {
        if !force_refresh {
            if let Some(hit) = self.cache.diagram(workspace, environment, diagram).await {
                return Ok(hit);
            }
        }
        let item = self.inner.get_diagram(workspace, environment, diagram).await?;
        self.cache
            .store_diagram(workspace, environment, item.clone())
            .await;
        Ok(item)
    }
}

#[async_trait]
impl Catalog for CachedCatalog {
    async fn list_environments(&self, workspace: &WorkspaceId) -> CatalogResult<Vec<Environment>> {
        self.environments(workspace, false).await
    }

    async fn create_environment(
        &self,
        workspace: &WorkspaceId,
        request: &NewEnvironment,
    ) -> CatalogResult<Environment> {
        let created = self.inner.create_environment(workspace, request).await?;
        self.cache.invalidate_environments(workspace).await;
        Ok(created)
    }

    async fn update_environment(
        &self,
        workspace: &WorkspaceId,
        environment: &EnvironmentId,
        patch: &EnvironmentPatch,
    ) -> CatalogResult<Environment> {
        let updated = self
            .inner
            .update_environment(workspace, environment, patch)
            .await?;
        self.cache.invalidate_environments(workspace).await;
        Ok(updated)
    }

    async fn delete_environment(
        &self,
        workspace: &WorkspaceId,
        environment: &EnvironmentId,
    ) -> CatalogResult<()> {
        self.inner.delete_environment(workspace, environment).await?;
        self.cache.invalidate_environments(workspace).await;
        self.cache.invalidate_environment(workspace, environment).await;
        Ok(())
    }

    async fn list_diagrams(
        &self,
        workspace: &WorkspaceId,
        environment: &EnvironmentId,
    ) -> CatalogResult<Vec<Diagram>> {
        self.diagrams(workspace, environment, false).await
    }

    async fn get_diagram(
        &self,
        workspace: &WorkspaceId,
        environment: &EnvironmentId,
        diagram: &DiagramId,
    ) -> CatalogResult<Diagram> {
        self.diagram(workspace, environment, diagram, false).await
    }

    async fn create_diagram(
        &self,
        workspace: &WorkspaceId,
        request: &NewDiagram,
    ) -> CatalogResult<Diagram> {
        let created = self.inner.create_diagram(workspace, request).await?;
        self.cache
            .invalidate_diagrams(workspace, &request.environment_id)
            .await;
        Ok(created)
    }

    async fn update_diagram(
        &self,
        workspace: &WorkspaceId,
        environment: &EnvironmentId,
        diagram: &DiagramId,
        patch: &DiagramPatch,
    ) -> CatalogResult<Diagram> {
        let updated = self
            .inner
            .update_diagram(workspace, environment, diagram, patch)
            .await?;
        self.cache.invalidate_diagrams(workspace, environment).await;
        self.cache
            .invalidate_diagram(workspace, environment, diagram)
            .await;
        Ok(updated)
    }

    async fn delete_diagram(
        &self,
        workspace: &WorkspaceId,
        environment: &EnvironmentId,
        diagram: &DiagramId,
    ) -> CatalogResult<()> {
        self.inner
            .delete_diagram(workspace, environment, diagram)
            .await?;
        self.cache.invalidate_diagrams(workspace, environment).await;
        self.cache
            .invalidate_diagram(workspace, environment, diagram)
            .await;
        Ok(())
    }
}
