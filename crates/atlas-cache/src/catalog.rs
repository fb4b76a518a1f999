//! Catalog cache service
//!
//! One value owning the three keyspaces, handed to the data-access layer
//! instead of living in a global. Cloning shares the underlying stores.

use crate::config::CacheConfig;
use crate::keys::{DiagramKey, DiagramsKey, EnvironmentsKey};
use crate::ttl::{CacheStore, TtlCache};
use atlas_model::{Diagram, DiagramId, Environment, EnvironmentId, WorkspaceId};
use serde::Serialize;
use std::sync::Arc;

type Store<K, V> = Arc<dyn CacheStore<K, V>>;

/// Entry counts per keyspace
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub environment_lists: u64,
    pub diagram_lists: u64,
    pub diagrams: u64,
}

impl CacheStats {
    /// Entries across all keyspaces
    #[must_use]
    pub fn total(&self) -> u64 {
        self.environment_lists + self.diagram_lists + self.diagrams
    }
}

/// Environments, diagram lists and single diagrams, each with its own TTL
#[derive(Clone)]
pub struct CatalogCache {
    config: CacheConfig,
    environments: Store<EnvironmentsKey, Vec<Environment>>,
    diagram_lists: Store<DiagramsKey, Vec<Diagram>>,
    diagrams: Store<DiagramKey, Diagram>,
}

impl std::fmt::Debug for CatalogCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogCache")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl CatalogCache {
    /// moka-backed keyspaces sized by `config`
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            environments: Arc::new(TtlCache::<EnvironmentsKey, Vec<Environment>>::new(
                "environments",
                config.max_capacity,
            )),
            diagram_lists: Arc::new(TtlCache::<DiagramsKey, Vec<Diagram>>::new(
                "diagram_lists",
                config.max_capacity,
            )),
            diagrams: Arc::new(TtlCache::<DiagramKey, Diagram>::new(
                "diagrams",
                config.max_capacity,
            )),
        }
    }

    /// Cache over caller-provided stores
    #[must_use]
    pub fn with_stores(
        config: CacheConfig,
        environments: Store<EnvironmentsKey, Vec<Environment>>,
        diagram_lists: Store<DiagramsKey, Vec<Diagram>>,
        diagrams: Store<DiagramKey, Diagram>,
    ) -> Self {
        Self {
            config,
            environments,
            diagram_lists,
            diagrams,
        }
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // Environments

    /// Cached environment list of a workspace
    pub async fn environments(&self, workspace: &WorkspaceId) -> Option<Vec<Environment>> {
        self.environments.get(&EnvironmentsKey::new(workspace)).await
    }

    pub async fn store_environments(&self, workspace: &WorkspaceId, items: Vec<Environment>) {
        self.environments
            .set(
                EnvironmentsKey::new(workspace),
                items,
                self.config.environments_ttl(),
            )
            .await;
    }

    pub async fn invalidate_environments(&self, workspace: &WorkspaceId) {
        self.environments
            .invalidate(&EnvironmentsKey::new(workspace))
            .await;
    }

    // Diagram lists

    pub async fn diagrams(
        &self,
        workspace: &WorkspaceId,
        environment: &EnvironmentId,
    ) -> Option<Vec<Diagram>> {
        self.diagram_lists
            .get(&DiagramsKey::new(workspace, environment))
            .await
    }

    pub async fn store_diagrams(
        &self,
        workspace: &WorkspaceId,
        environment: &EnvironmentId,
        items: Vec<Diagram>,
    ) {
        self.diagram_lists
            .set(
                DiagramsKey::new(workspace, environment),
                items,
                self.config.diagrams_ttl(),
            )
            .await;
    }

    pub async fn invalidate_diagrams(&self, workspace: &WorkspaceId, environment: &EnvironmentId) {
        self.diagram_lists
            .invalidate(&DiagramsKey::new(workspace, environment))
            .await;
    }

    // Single diagrams

    /// Cached diagram with its graph
    pub async fn diagram(
        &self,
        workspace: &WorkspaceId,
        environment: &EnvironmentId,
        diagram: &DiagramId,
    ) -> Option<Diagram> {
        self.diagrams
            .get(&DiagramKey::new(workspace, environment, diagram))
            .await
    }

    pub async fn store_diagram(
        &self,
        workspace: &WorkspaceId,
        environment: &EnvironmentId,
        item: Diagram,
    ) {
        let key = DiagramKey::new(workspace, environment, &item.id);
        self.diagrams
            .set(key, item, self.config.diagram_ttl())
            .await;
    }

    pub async fn invalidate_diagram(
        &self,
        workspace: &WorkspaceId,
        environment: &EnvironmentId,
        diagram: &DiagramId,
    ) {
        self.diagrams
            .invalidate(&DiagramKey::new(workspace, environment, diagram))
            .await;
    }

    /// Drop the diagram list and every cached diagram of an environment
    pub async fn invalidate_environment(
        &self,
        workspace: &WorkspaceId,
        environment: &EnvironmentId,
    ) {
        self.invalidate_diagrams(workspace, environment).await;
        let removed = self
            .diagrams
            .invalidate_matching(&|key: &DiagramKey| key.is_under(workspace, environment))
            .await;
        tracing::debug!(
            workspace = %workspace,
            environment = %environment,
            removed,
            "invalidated environment"
        );
    }

    /// Empty every keyspace
    pub async fn invalidate_all(&self) {
        self.environments.invalidate_all().await;
        self.diagram_lists.invalidate_all().await;
        self.diagrams.invalidate_all().await;
        tracing::debug!("catalog cache cleared");
    }

    /// Sweep stale entries from every keyspace; returns how many were removed
    pub async fn clear_expired(&self) -> usize {
        self.environments.clear_expired().await
            + self.diagram_lists.clear_expired().await
            + self.diagrams.clear_expired().await
    }

    /// Current entry counts
    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            environment_lists: self.environments.len().await,
            diagram_lists: self.diagram_lists.len().await,
            diagrams: self.diagrams.len().await,
        }
    }
}
