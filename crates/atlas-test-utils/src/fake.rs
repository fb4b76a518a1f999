//! In-memory catalog that records calls
//!
//! Supports per-environment latency (to stage overlapping navigations) and
//! per-operation failure injection.

use crate::fixed_time;
use async_trait::async_trait;
use atlas_client::{
    Catalog, CatalogError, CatalogResult, DiagramPatch, EnvironmentPatch, NewDiagram,
    NewEnvironment,
};
use atlas_model::{Diagram, DiagramId, Environment, EnvironmentId, ItemPath, WorkspaceId};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Catalog operation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    ListEnvironments,
    CreateEnvironment,
    UpdateEnvironment,
    DeleteEnvironment,
    ListDiagrams,
    GetDiagram,
    CreateDiagram,
    UpdateDiagram,
    DeleteDiagram,
}

/// One recorded call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListEnvironments,
    CreateEnvironment(String),
    UpdateEnvironment(EnvironmentId, EnvironmentPatch),
    DeleteEnvironment(EnvironmentId),
    ListDiagrams(EnvironmentId),
    GetDiagram(DiagramId),
    CreateDiagram(String),
    UpdateDiagram(DiagramId, DiagramPatch),
    DeleteDiagram(DiagramId),
}

impl Call {
    pub fn op(&self) -> Op {
        match self {
            Self::ListEnvironments => Op::ListEnvironments,
            Self::CreateEnvironment(_) => Op::CreateEnvironment,
            Self::UpdateEnvironment(..) => Op::UpdateEnvironment,
            Self::DeleteEnvironment(_) => Op::DeleteEnvironment,
            Self::ListDiagrams(_) => Op::ListDiagrams,
            Self::GetDiagram(_) => Op::GetDiagram,
            Self::CreateDiagram(_) => Op::CreateDiagram,
            Self::UpdateDiagram(..) => Op::UpdateDiagram,
            Self::DeleteDiagram(_) => Op::DeleteDiagram,
        }
    }
}

#[derive(Default)]
struct State {
    environments: Vec<Environment>,
    diagrams: BTreeMap<EnvironmentId, Vec<Diagram>>,
    calls: Vec<Call>,
    failures: HashMap<Op, CatalogError>,
    delays: HashMap<EnvironmentId, Duration>,
    next_id: u64,
}

/// In-memory [`Catalog`]
#[derive(Default)]
pub struct FakeCatalog {
    state: Mutex<State>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_environment(self, environment: Environment) -> Self {
        self.state.lock().environments.push(environment);
        self
    }

    pub fn with_diagram(self, environment: &str, diagram: Diagram) -> Self {
        self.state
            .lock()
            .diagrams
            .entry(EnvironmentId::new(environment))
            .or_default()
            .push(diagram);
        self
    }

    /// Delay diagram reads in `environment`
    pub fn delay_environment(&self, environment: &str, delay: Duration) {
        self.state
            .lock()
            .delays
            .insert(EnvironmentId::new(environment), delay);
    }

    /// Fail every `op` call with `error` until cleared
    pub fn fail(&self, op: Op, error: CatalogError) {
        self.state.lock().failures.insert(op, error);
    }

    pub fn clear_failure(&self, op: Op) {
        self.state.lock().failures.remove(&op);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn count(&self, op: Op) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| c.op() == op)
            .count()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Stored diagrams of an environment, bypassing the call log
    pub fn stored_diagrams(&self, environment: &str) -> Vec<Diagram> {
        self.state
            .lock()
            .diagrams
            .get(&EnvironmentId::new(environment))
            .cloned()
            .unwrap_or_default()
    }

    /// Record `call`, then report the injected failure and delay for it
    fn enter(&self, call: Call, environment: Option<&EnvironmentId>) -> (Option<CatalogError>, Option<Duration>) {
        let mut state = self.state.lock();
        let failure = state.failures.get(&call.op()).cloned();
        let delay = environment.and_then(|e| state.delays.get(e).copied());
        state.calls.push(call);
        (failure, delay)
    }

    async fn begin(&self, call: Call, environment: Option<&EnvironmentId>) -> CatalogResult<()> {
        let (failure, delay) = self.enter(call, environment);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        failure.map_or(Ok(()), Err)
    }

    fn next_id(&self, prefix: &str) -> String {
        let mut state = self.state.lock();
        state.next_id += 1;
        format!("{prefix}-{}", state.next_id)
    }
}

fn apply_path(current: &mut ItemPath, change: Option<&Option<ItemPath>>) {
    match change {
        Some(Some(path)) => *current = path.clone(),
        Some(None) => *current = ItemPath::root(),
        None => {}
    }
}

fn not_found(resource: &'static str, id: &str) -> CatalogError {
    CatalogError::NotFound {
        resource,
        id: id.to_string(),
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn list_environments(&self, _workspace: &WorkspaceId) -> CatalogResult<Vec<Environment>> {
        self.begin(Call::ListEnvironments, None).await?;
        Ok(self.state.lock().environments.clone())
    }

    async fn create_environment(
        &self,
        _workspace: &WorkspaceId,
        request: &NewEnvironment,
    ) -> CatalogResult<Environment> {
        self.begin(Call::CreateEnvironment(request.name.clone()), None)
            .await?;
        request.validate()?;
        let created = Environment {
            id: EnvironmentId::new(self.next_id("env")),
            name: request.name.clone(),
            description: request.description.clone(),
            path: request.path.clone().unwrap_or_default(),
            is_active: true,
            created_at: fixed_time(),
            updated_at: fixed_time(),
        };
        self.state.lock().environments.push(created.clone());
        Ok(created)
    }

    async fn update_environment(
        &self,
        _workspace: &WorkspaceId,
        environment: &EnvironmentId,
        patch: &EnvironmentPatch,
    ) -> CatalogResult<Environment> {
        self.begin(
            Call::UpdateEnvironment(environment.clone(), patch.clone()),
            None,
        )
        .await?;
        let mut state = self.state.lock();
        let target = state
            .environments
            .iter_mut()
            .find(|e| &e.id == environment)
            .ok_or_else(|| not_found("environment", environment.as_str()))?;
        if let Some(name) = &patch.name {
            target.name.clone_from(name);
        }
        if let Some(description) = &patch.description {
            target.description = Some(description.clone());
        }
        if let Some(active) = patch.is_active {
            target.is_active = active;
        }
        apply_path(&mut target.path, patch.path.as_ref());
        Ok(target.clone())
    }

    async fn delete_environment(
        &self,
        _workspace: &WorkspaceId,
        environment: &EnvironmentId,
    ) -> CatalogResult<()> {
        self.begin(Call::DeleteEnvironment(environment.clone()), None)
            .await?;
        let mut state = self.state.lock();
        let before = state.environments.len();
        state.environments.retain(|e| &e.id != environment);
        if state.environments.len() == before {
            return Err(not_found("environment", environment.as_str()));
        }
        state.diagrams.remove(environment);
        Ok(())
    }

    async fn list_diagrams(
        &self,
        _workspace: &WorkspaceId,
        environment: &EnvironmentId,
    ) -> CatalogResult<Vec<Diagram>> {
        self.begin(Call::ListDiagrams(environment.clone()), Some(environment))
            .await?;
        Ok(self
            .state
            .lock()
            .diagrams
            .get(environment)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_diagram(
        &self,
        _workspace: &WorkspaceId,
        environment: &EnvironmentId,
        diagram: &DiagramId,
    ) -> CatalogResult<Diagram> {
        self.begin(Call::GetDiagram(diagram.clone()), Some(environment))
            .await?;
        self.state
            .lock()
            .diagrams
            .get(environment)
            .and_then(|list| list.iter().find(|d| &d.id == diagram).cloned())
            .ok_or_else(|| not_found("diagram", diagram.as_str()))
    }

    async fn create_diagram(
        &self,
        _workspace: &WorkspaceId,
        request: &NewDiagram,
    ) -> CatalogResult<Diagram> {
        self.begin(Call::CreateDiagram(request.name.clone()), None)
            .await?;
        request.validate()?;
        let created = Diagram {
            path: request.path.clone().unwrap_or_default(),
            description: request.description.clone(),
            nodes: request.nodes.clone(),
            edges: request.edges.clone(),
            ..crate::diagram(&self.next_id("diagram"), &request.name, "")
        };
        self.state
            .lock()
            .diagrams
            .entry(request.environment_id.clone())
            .or_default()
            .push(created.clone());
        Ok(created)
    }

    async fn update_diagram(
        &self,
        _workspace: &WorkspaceId,
        environment: &EnvironmentId,
        diagram: &DiagramId,
        patch: &DiagramPatch,
    ) -> CatalogResult<Diagram> {
        self.begin(Call::UpdateDiagram(diagram.clone(), patch.clone()), None)
            .await?;
        let mut state = self.state.lock();
        let target = state
            .diagrams
            .get_mut(environment)
            .and_then(|list| list.iter_mut().find(|d| &d.id == diagram))
            .ok_or_else(|| not_found("diagram", diagram.as_str()))?;
        if let Some(name) = &patch.name {
            target.name.clone_from(name);
        }
        if let Some(description) = &patch.description {
            target.description = Some(description.clone());
        }
        apply_path(&mut target.path, patch.path.as_ref());
        if let Some(nodes) = &patch.nodes {
            target.nodes.clone_from(nodes);
        }
        if let Some(edges) = &patch.edges {
            target.edges.clone_from(edges);
        }
        if patch.viewport.is_some() {
            target.viewport = patch.viewport;
        }
        if patch.node_groups.is_some() {
            target.node_groups.clone_from(&patch.node_groups);
        }
        if patch.node_positions.is_some() {
            target.node_positions.clone_from(&patch.node_positions);
        }
        Ok(target.clone())
    }

    async fn delete_diagram(
        &self,
        _workspace: &WorkspaceId,
        environment: &EnvironmentId,
        diagram: &DiagramId,
    ) -> CatalogResult<()> {
        self.begin(Call::DeleteDiagram(diagram.clone()), None)
            .await?;
        let mut state = self.state.lock();
        let list = state
            .diagrams
            .get_mut(environment)
            .ok_or_else(|| not_found("diagram", diagram.as_str()))?;
        let before = list.len();
        list.retain(|d| &d.id != diagram);
        if list.len() == before {
            return Err(not_found("diagram", diagram.as_str()));
        }
        Ok(())
    }
}
