//! Navigation state machine
//!
//! Sequences environment → diagram list → diagram detail loads and publishes
//! the result through a `watch` channel.
//!
//! Guarantees:
//! - one action at a time: a navigation requested while another holds the
//!   guard is dropped, not queued
//! - every action's data changes land in one [`Transition`]
//! - nothing is committed after [`Navigator::teardown`]
//! - the loading indicator stays up for at least `min_loading`

use crate::config::NavigatorConfig;
use crate::error::{NavError, NavResult};
use crate::events::{CanvasEvent, EventBus};
use crate::location::{slugify, Location, LocationHint, LocationReconciler, LocationSink};
use crate::notify::{Notification, Notifier};
use crate::paths::{DiagramPaths, EnvironmentPaths};
use crate::state::{NavigationState, Phase};
use crate::transition::Transition;
use atlas_client::{CachedCatalog, Catalog, DiagramPatch, NewDiagram, NewEnvironment};
use atlas_groups::GroupLayout;
use atlas_model::{
    Diagram, DiagramId, Environment, EnvironmentId, Graph, GraphNode, WorkspaceId,
};
use atlas_tree::{move_item, MoveOutcome, MoveTarget};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// What happened to a navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    /// Results were committed
    Committed,
    /// Another action held the guard; nothing ran
    Dropped,
    /// The navigator was torn down before the commit
    Discarded,
}

/// Result of [`Navigator::save_graph`]
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// Persisted with the derived container layout
    Saved(GroupLayout),
    /// A navigation was in flight; nothing was sent
    Skipped,
}

/// Releases the re-entrancy guard on every exit path
struct ActionGuard<'a> {
    nav: &'a Navigator,
}

impl Drop for ActionGuard<'_> {
    fn drop(&mut self) {
        // An action that never reached its final commit leaves these set.
        if self.nav.is_alive() {
            self.nav.state.send_if_modified(|state| {
                let stuck = state.in_flight;
                if stuck {
                    state.in_flight = false;
                    state.loading = false;
                }
                stuck
            });
        }
        self.nav.busy.store(false, Ordering::Release);
    }
}

/// Environment/diagram navigator for one workspace
pub struct Navigator {
    workspace: WorkspaceId,
    catalog: CachedCatalog,
    config: NavigatorConfig,
    state: Arc<watch::Sender<NavigationState>>,
    busy: AtomicBool,
    alive: Arc<AtomicBool>,
    loading_timer: Mutex<Option<JoinHandle<()>>>,
    location: LocationReconciler,
    events: EventBus,
    notifier: Notifier,
}

impl std::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("workspace", &self.workspace)
            .field("busy", &self.busy.load(Ordering::Relaxed))
            .field("alive", &self.alive.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl Navigator {
    #[must_use]
    pub fn new(
        workspace: WorkspaceId,
        catalog: CachedCatalog,
        sink: Arc<dyn LocationSink>,
        config: NavigatorConfig,
    ) -> Self {
        let (state, _) = watch::channel(NavigationState::default());
        Self {
            workspace,
            catalog,
            events: EventBus::new(config.event_capacity, config.group_resize_debounce()),
            notifier: Notifier::new(config.event_capacity),
            config,
            state: Arc::new(state),
            busy: AtomicBool::new(false),
            alive: Arc::new(AtomicBool::new(true)),
            loading_timer: Mutex::new(None),
            location: LocationReconciler::new(sink),
        }
    }

    // Accessors

    #[inline]
    #[must_use]
    pub fn workspace(&self) -> &WorkspaceId {
        &self.workspace
    }

    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &CachedCatalog {
        &self.catalog
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    /// Canvas event bus
    #[inline]
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.notifier.subscribe()
    }

    /// Observe state changes
    pub fn subscribe(&self) -> watch::Receiver<NavigationState> {
        self.state.subscribe()
    }

    /// Copy of the current state
    #[must_use]
    pub fn snapshot(&self) -> NavigationState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Whether an action holds the re-entrancy guard
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Stop committing and cancel the loading timer
    ///
    /// Requests still running finish their I/O but their results are
    /// discarded.
    pub fn teardown(&self) {
        if self.alive.swap(false, Ordering::AcqRel) {
            tracing::debug!(workspace = %self.workspace, "navigator torn down");
        }
        self.cancel_loading_timer();
    }

    // Navigation

    /// Initial load, honoring a location hint when it names known items
    ///
    /// # Errors
    /// Catalog failures after the partial state has been committed.
    pub async fn load(&self, hint: Option<&LocationHint>) -> NavResult<NavOutcome> {
        self.load_with(hint, false).await
    }

    /// Reload everything from the backend, keeping the current selection
    ///
    /// # Errors
    /// As [`Navigator::load`].
    pub async fn reload(&self) -> NavResult<NavOutcome> {
        let hint = {
            let state = self.state.borrow();
            LocationHint {
                environment_id: state.selected_environment_id.clone(),
                diagram_id: state.selected_diagram_id.clone(),
                ..LocationHint::default()
            }
        };
        self.load_with(Some(&hint), true).await
    }

    async fn load_with(&self, hint: Option<&LocationHint>, force: bool) -> NavResult<NavOutcome> {
        let Some(_guard) = self.try_acquire() else {
            tracing::debug!("navigation in flight; dropping load");
            return Ok(NavOutcome::Dropped);
        };
        let started = self.begin(Phase::LoadingEnvironments)?;

        let environments = match self.catalog.environments(&self.workspace, force).await {
            Ok(items) => items,
            Err(e) => {
                let error = self.fail("Could not load environments", e);
                let failed = Transition::new()
                    .phase(Phase::Error)
                    .error(Some(error.to_string()));
                self.finish(started, failed)?;
                return Err(error);
            }
        };

        let pick = pick_environment(&environments, hint);
        let base = Transition::new().environments(environments);
        let Some(environment) = pick else {
            let empty = base
                .select_environment(None)
                .diagrams(Vec::new())
                .select_diagram(None)
                .current_diagram(None)
                .phase(Phase::Ready)
                .error(None);
            return self.finish(started, empty);
        };

        self.set_phase(Phase::LoadingDiagramList);
        let preferred = hint.map(|h| (h.diagram_id.as_ref(), h.diagram_slug.as_deref()));
        let (view, failure) = self
            .environment_view(base, &environment, preferred.unwrap_or_default(), force)
            .await;
        let outcome = self.finish(started, view)?;
        failure.map_or(Ok(outcome), Err)
    }

    /// Switch environment: load its diagram list and first diagram, then
    /// commit everything at once
    ///
    /// On a list failure the environment stays selected with an empty
    /// diagram list.
    ///
    /// # Errors
    /// Catalog failures after the partial state has been committed.
    pub async fn select_environment(&self, id: &EnvironmentId) -> NavResult<NavOutcome> {
        let Some(_guard) = self.try_acquire() else {
            tracing::debug!(environment = %id, "navigation in flight; dropping environment switch");
            return Ok(NavOutcome::Dropped);
        };
        let started = self.begin(Phase::LoadingDiagramList)?;

        let (view, failure) = self
            .environment_view(Transition::new(), id, (None, None), false)
            .await;
        let outcome = self.finish(started, view)?;
        failure.map_or(Ok(outcome), Err)
    }

    /// Open a diagram of the selected environment
    ///
    /// # Errors
    /// `NoEnvironmentSelected`, or catalog failures after the error state
    /// has been committed.
    pub async fn select_diagram(&self, id: &DiagramId) -> NavResult<NavOutcome> {
        let environment = self.require_environment()?;
        let Some(_guard) = self.try_acquire() else {
            tracing::debug!(diagram = %id, "navigation in flight; dropping diagram switch");
            return Ok(NavOutcome::Dropped);
        };
        let started = self.begin(Phase::LoadingDiagramDetail)?;
        let previous = self.state.borrow().selected_diagram_id.clone();

        match self
            .catalog
            .diagram(&self.workspace, &environment, id, false)
            .await
        {
            Ok(diagram) => {
                let mut done = Transition::new()
                    .select_diagram(Some(id.clone()))
                    .current_diagram(Some(diagram))
                    .phase(Phase::Ready)
                    .error(None);
                if previous.as_ref() != Some(id) {
                    done = done.previous_diagram(previous);
                }
                self.finish(started, done)
            }
            Err(e) => {
                let error = self.fail("Could not load diagram", e);
                let failed = Transition::new()
                    .phase(Phase::Error)
                    .error(Some(error.to_string()));
                self.finish(started, failed)?;
                Err(error)
            }
        }
    }

    /// Diagram list and detail for `environment`, layered over `base`
    async fn environment_view(
        &self,
        base: Transition,
        environment: &EnvironmentId,
        preferred: (Option<&DiagramId>, Option<&str>),
        force: bool,
    ) -> (Transition, Option<NavError>) {
        let mut view = base
            .select_environment(Some(environment.clone()))
            .diagrams(Vec::new())
            .select_diagram(None)
            .current_diagram(None);
        if self.state.borrow().selected_environment_id.as_ref() != Some(environment) {
            view = view.previous_diagram(None);
        }

        let diagrams = match self
            .catalog
            .diagrams(&self.workspace, environment, force)
            .await
        {
            Ok(items) => items,
            Err(e) => {
                let error = self.fail("Could not load diagrams", e);
                let failed = view.phase(Phase::Error).error(Some(error.to_string()));
                return (failed, Some(error));
            }
        };

        let pick = pick_diagram(&diagrams, preferred.0, preferred.1);
        let view = view.diagrams(diagrams);
        let Some(diagram_id) = pick else {
            return (view.phase(Phase::Ready).error(None), None);
        };

        self.set_phase(Phase::LoadingDiagramDetail);
        let view = view.select_diagram(Some(diagram_id.clone()));
        match self
            .catalog
            .diagram(&self.workspace, environment, &diagram_id, force)
            .await
        {
            Ok(diagram) => (
                view.current_diagram(Some(diagram))
                    .phase(Phase::Ready)
                    .error(None),
                None,
            ),
            Err(e) => {
                let error = self.fail("Could not load diagram", e);
                let failed = view.phase(Phase::Error).error(Some(error.to_string()));
                (failed, Some(error))
            }
        }
    }

    // Catalog changes

    /// Create an environment and refresh the list
    ///
    /// # Errors
    /// `Busy` while a navigation runs; validation or catalog failures.
    pub async fn create_environment(
        &self,
        name: &str,
        path: &str,
        description: Option<&str>,
    ) -> NavResult<Environment> {
        let mut request = NewEnvironment::new(name, path);
        if let Some(description) = description {
            request = request.with_description(description);
        }
        request.validate()?;
        let _guard = self.try_acquire().ok_or(NavError::Busy)?;

        let created = self
            .catalog
            .create_environment(&self.workspace, &request)
            .await
            .map_err(|e| self.fail("Could not create environment", e))?;
        let environments = self
            .catalog
            .environments(&self.workspace, false)
            .await
            .map_err(|e| self.fail("Could not refresh environments", e))?;

        self.commit(Transition::new().environments(environments))?;
        self.notifier
            .success(format!("Environment \"{}\" created", created.name));
        Ok(created)
    }

    /// Create a diagram in the selected environment and open it
    ///
    /// # Errors
    /// `NoEnvironmentSelected`, `Busy`, validation or catalog failures.
    pub async fn create_diagram(
        &self,
        name: &str,
        path: &str,
        description: Option<&str>,
    ) -> NavResult<Diagram> {
        let environment = self.require_environment()?;
        let mut request = NewDiagram::new(environment.clone(), name, path);
        if let Some(description) = description {
            request = request.with_description(description);
        }
        request.validate()?;
        let _guard = self.try_acquire().ok_or(NavError::Busy)?;

        let created = self
            .catalog
            .create_diagram(&self.workspace, &request)
            .await
            .map_err(|e| self.fail("Could not create diagram", e))?;
        let diagrams = self
            .catalog
            .diagrams(&self.workspace, &environment, false)
            .await
            .map_err(|e| self.fail("Could not refresh diagrams", e))?;

        let previous = self.state.borrow().selected_diagram_id.clone();
        self.commit(
            Transition::new()
                .diagrams(diagrams)
                .previous_diagram(previous)
                .select_diagram(Some(created.id.clone()))
                .current_diagram(Some(created.clone())),
        )?;
        self.reconcile_location();
        self.notifier
            .success(format!("Diagram \"{}\" created", created.name));
        Ok(created)
    }

    /// Delete an environment; if it was selected, the first remaining one
    /// is selected instead
    ///
    /// # Errors
    /// `Busy` or catalog failures.
    pub async fn delete_environment(&self, id: &EnvironmentId) -> NavResult<()> {
        let _guard = self.try_acquire().ok_or(NavError::Busy)?;

        self.catalog
            .delete_environment(&self.workspace, id)
            .await
            .map_err(|e| self.fail("Could not delete environment", e))?;
        let environments = self
            .catalog
            .environments(&self.workspace, false)
            .await
            .map_err(|e| self.fail("Could not refresh environments", e))?;

        let was_selected = self.state.borrow().selected_environment_id.as_ref() == Some(id);
        let next = environments.first().map(|e| e.id.clone());
        let base = Transition::new().environments(environments);

        let (transition, failure) = match (was_selected, next) {
            (false, _) => (base, None),
            (true, Some(next)) => {
                self.set_phase(Phase::LoadingDiagramList);
                self.environment_view(base, &next, (None, None), false)
                    .await
            }
            (true, None) => (
                base.select_environment(None)
                    .diagrams(Vec::new())
                    .select_diagram(None)
                    .previous_diagram(None)
                    .current_diagram(None),
                None,
            ),
        };

        self.commit(transition)?;
        self.reconcile_location();
        self.notifier.success("Environment deleted");
        failure.map_or(Ok(()), Err)
    }

    /// Delete a diagram of the selected environment
    ///
    /// Diagrams that still hold nodes are refused before any request is
    /// sent. If the deleted diagram was open, the first remaining one opens.
    ///
    /// # Errors
    /// `NoEnvironmentSelected`, `Busy`, `Validation` for non-empty diagrams,
    /// or catalog failures.
    pub async fn delete_diagram(&self, id: &DiagramId) -> NavResult<()> {
        let environment = self.require_environment()?;
        let _guard = self.try_acquire().ok_or(NavError::Busy)?;

        let (current, selected) = {
            let state = self.state.borrow();
            (
                state.current_diagram.clone(),
                state.selected_diagram_id.clone(),
            )
        };
        let target = match current.filter(|d| &d.id == id) {
            Some(diagram) => diagram,
            None => self
                .catalog
                .diagram(&self.workspace, &environment, id, false)
                .await
                .map_err(|e| self.fail("Could not delete diagram", e))?,
        };
        if target.has_nodes() {
            let error = NavError::Validation(format!(
                "Diagram \"{}\" still contains {} node(s); remove them before deleting it",
                target.name,
                target.nodes.len()
            ));
            self.notifier.warning(error.to_string());
            return Err(error);
        }

        self.catalog
            .delete_diagram(&self.workspace, &environment, id)
            .await
            .map_err(|e| self.fail("Could not delete diagram", e))?;
        let diagrams = self
            .catalog
            .diagrams(&self.workspace, &environment, false)
            .await
            .map_err(|e| self.fail("Could not refresh diagrams", e))?;

        let next = diagrams.first().map(|d| d.id.clone());
        let mut transition = Transition::new().diagrams(diagrams);
        let mut failure = None;
        if selected.as_ref() == Some(id) {
            transition = transition.previous_diagram(None);
            match next {
                None => transition = transition.select_diagram(None).current_diagram(None),
                Some(next) => {
                    transition = transition.select_diagram(Some(next.clone()));
                    match self
                        .catalog
                        .diagram(&self.workspace, &environment, &next, false)
                        .await
                    {
                        Ok(diagram) => transition = transition.current_diagram(Some(diagram)),
                        Err(e) => {
                            let error = self.fail("Could not load diagram", e);
                            transition = transition
                                .current_diagram(None)
                                .error(Some(error.to_string()));
                            failure = Some(error);
                        }
                    }
                }
            }
        }

        self.commit(transition)?;
        self.reconcile_location();
        self.notifier
            .success(format!("Diagram \"{}\" deleted", target.name));
        failure.map_or(Ok(()), Err)
    }

    /// Move a diagram of the selected environment; `false` if its path was
    /// already the target
    ///
    /// # Errors
    /// `NoEnvironmentSelected`, `Busy`, or the move failure. The visible
    /// tree is unchanged on error.
    pub async fn move_diagram(&self, id: &DiagramId, target: &MoveTarget) -> NavResult<bool> {
        let environment = self.require_environment()?;
        let _guard = self.try_acquire().ok_or(NavError::Busy)?;

        let items = self.state.borrow().diagrams.clone();
        let store = DiagramPaths {
            catalog: &self.catalog,
            workspace: &self.workspace,
            environment: &environment,
        };
        let outcome = move_item(&store, &items, id.as_str(), target)
            .await
            .map_err(|e| self.fail("Could not move diagram", e))?;

        let MoveOutcome::Moved { plan, items, .. } = outcome else {
            return Ok(false);
        };
        let current = self.state.borrow().current_diagram.clone().map(|mut d| {
            if &d.id == id {
                d.path = plan.to.clone();
            }
            d
        });
        self.commit(Transition::new().diagrams(items).current_diagram(current))?;
        self.notifier.success(format!("Moved to /{}", plan.to));
        Ok(true)
    }

    /// Move an environment; `false` if its path was already the target
    ///
    /// # Errors
    /// `Busy` or the move failure.
    pub async fn move_environment(&self, id: &EnvironmentId, target: &MoveTarget) -> NavResult<bool> {
        let _guard = self.try_acquire().ok_or(NavError::Busy)?;

        let items = self.state.borrow().environments.clone();
        let store = EnvironmentPaths {
            catalog: &self.catalog,
            workspace: &self.workspace,
        };
        let outcome = move_item(&store, &items, id.as_str(), target)
            .await
            .map_err(|e| self.fail("Could not move environment", e))?;

        let MoveOutcome::Moved { plan, items, .. } = outcome else {
            return Ok(false);
        };
        self.commit(Transition::new().environments(items))?;
        self.notifier.success(format!("Moved to /{}", plan.to));
        Ok(true)
    }

    /// Persist the canvas graph of the open diagram with its container
    /// layout
    ///
    /// # Errors
    /// `NoEnvironmentSelected`/`NoDiagramSelected`, an inconsistent layout,
    /// or catalog failures.
    pub async fn save_graph(&self, graph: Graph) -> NavResult<SaveOutcome> {
        let Some(_guard) = self.try_acquire() else {
            tracing::debug!("navigation in flight; skipping save");
            return Ok(SaveOutcome::Skipped);
        };

        let (environment, current) = {
            let state = self.state.borrow();
            (
                state.selected_environment_id.clone(),
                state.current_diagram.clone(),
            )
        };
        let environment = environment.ok_or(NavError::NoEnvironmentSelected)?;
        let current = current.ok_or(NavError::NoDiagramSelected)?;

        let layout = GroupLayout::compute(&graph.nodes);
        layout.validate()?;
        let (node_groups, node_positions) = layout.clone().into_parts();
        let patch = DiagramPatch {
            name: Some(current.name.clone()),
            description: current.description.clone(),
            nodes: Some(graph.nodes),
            edges: Some(graph.edges),
            viewport: graph.viewport,
            node_groups: Some(node_groups),
            node_positions: Some(node_positions),
            ..DiagramPatch::default()
        };

        let saved = self
            .catalog
            .update_diagram(&self.workspace, &environment, &current.id, &patch)
            .await
            .map_err(|e| self.fail("Could not save diagram", e))?;

        let diagrams: Vec<Diagram> = self
            .state
            .borrow()
            .diagrams
            .iter()
            .map(|d| if d.id == saved.id { saved.clone() } else { d.clone() })
            .collect();
        self.commit(
            Transition::new()
                .diagrams(diagrams)
                .current_diagram(Some(saved)),
        )?;
        tracing::info!(diagram = %current.id, groups = layout.groups.len(), "diagram saved");
        self.notifier.success("Diagram saved");
        Ok(SaveOutcome::Saved(layout))
    }

    // Canvas events

    /// Fold a canvas event into the state; returns whether it changed
    ///
    /// Only `GroupResized` for the open diagram is applied, and only when no
    /// action holds the guard.
    pub fn apply_canvas_event(&self, event: &CanvasEvent) -> bool {
        let CanvasEvent::GroupResized { diagram_id, nodes } = event else {
            return false;
        };
        let Some(_guard) = self.try_acquire() else {
            return false;
        };
        let current = self.state.borrow().current_diagram.clone();
        let Some(mut diagram) = current.filter(|d| &d.id == diagram_id) else {
            return false;
        };
        merge_nodes(&mut diagram.nodes, nodes);
        self.commit(Transition::new().current_diagram(Some(diagram)))
            .unwrap_or(false)
    }

    /// Apply bus events until the navigator is dropped or torn down
    pub fn spawn_event_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let mut rx = self.events.subscribe();
        let nav = Arc::downgrade(self);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        let Some(nav) = nav.upgrade() else { break };
                        if !nav.is_alive() {
                            break;
                        }
                        nav.apply_canvas_event(&event);
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "canvas event listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    // Internals

    fn try_acquire(&self) -> Option<ActionGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(ActionGuard { nav: self })
    }

    /// Raise the loading indicator for a navigation starting in `phase`
    fn begin(&self, phase: Phase) -> NavResult<Instant> {
        self.cancel_loading_timer();
        self.commit(
            Transition::new()
                .phase(phase)
                .in_flight(true)
                .loading(true),
        )?;
        Ok(Instant::now())
    }

    /// Final commit of a navigation
    fn finish(&self, started: Instant, transition: Transition) -> NavResult<NavOutcome> {
        if !self.commit(transition.in_flight(false))? {
            return Ok(NavOutcome::Discarded);
        }
        self.reconcile_location();
        self.schedule_loading_clear(started);
        Ok(NavOutcome::Committed)
    }

    /// Apply `transition` unless torn down; `Ok(false)` when discarded
    fn commit(&self, transition: Transition) -> NavResult<bool> {
        if !self.is_alive() {
            tracing::debug!("navigator torn down; discarding commit");
            return Ok(false);
        }
        let mut outcome = Ok(());
        self.state.send_if_modified(|state| match transition.apply(state) {
            Ok(()) => true,
            Err(e) => {
                outcome = Err(e);
                false
            }
        });
        outcome.map(|()| true)
    }

    fn set_phase(&self, phase: Phase) {
        if let Err(e) = self.commit(Transition::new().phase(phase)) {
            tracing::warn!(error = %e, "phase change rejected");
        }
    }

    fn schedule_loading_clear(&self, started: Instant) {
        let remaining = self.config.min_loading().saturating_sub(started.elapsed());
        if remaining.is_zero() {
            clear_loading(&self.state);
            return;
        }

        let state = Arc::clone(&self.state);
        let alive = Arc::clone(&self.alive);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(remaining).await;
            if alive.load(Ordering::Acquire) {
                clear_loading(&state);
            }
        });
        if let Some(previous) = self.loading_timer.lock().replace(timer) {
            previous.abort();
        }
    }

    fn cancel_loading_timer(&self) {
        if let Some(timer) = self.loading_timer.lock().take() {
            timer.abort();
        }
    }

    fn require_environment(&self) -> NavResult<EnvironmentId> {
        self.state
            .borrow()
            .selected_environment_id
            .clone()
            .ok_or(NavError::NoEnvironmentSelected)
    }

    fn reconcile_location(&self) {
        let target = {
            let state = self.state.borrow();
            location_for(&self.workspace, &state)
        };
        if let Some(target) = target {
            self.location.reconcile(&target);
        }
    }

    /// Notify the user and convert
    fn fail(&self, context: &str, error: impl Into<NavError>) -> NavError {
        let error = error.into();
        self.notifier
            .error(format!("{context}: {}", error.user_message()));
        error
    }
}

impl Drop for Navigator {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn clear_loading(state: &watch::Sender<NavigationState>) {
    state.send_if_modified(|s| std::mem::replace(&mut s.loading, false));
}

fn location_for(workspace: &WorkspaceId, state: &NavigationState) -> Option<Location> {
    let environment = state.selected_environment_id.clone()?;
    let environment_slug = state.selected_environment().map(|e| slugify(&e.name));
    let diagram_slug = state
        .current_diagram
        .as_ref()
        .filter(|d| Some(&d.id) == state.selected_diagram_id.as_ref())
        .map(|d| slugify(&d.name))
        .or_else(|| state.selected_diagram().map(|d| slugify(&d.name)));
    Some(Location {
        workspace: workspace.clone(),
        environment_id: Some(environment),
        diagram_id: state.selected_diagram_id.clone(),
        environment_slug,
        diagram_slug,
    })
}

/// Hinted environment by id, then by name slug, else the first
fn pick_environment(items: &[Environment], hint: Option<&LocationHint>) -> Option<EnvironmentId> {
    let by_id = hint
        .and_then(|h| h.environment_id.as_ref())
        .and_then(|id| items.iter().find(|e| &e.id == id));
    let by_slug = || {
        let slug = hint.and_then(|h| h.environment_slug.as_deref())?;
        items.iter().find(|e| slugify(&e.name) == slug)
    };
    by_id
        .or_else(by_slug)
        .or_else(|| items.first())
        .map(|e| e.id.clone())
}

/// Preferred diagram by id, then by name slug, else the first
fn pick_diagram(items: &[Diagram], id: Option<&DiagramId>, slug: Option<&str>) -> Option<DiagramId> {
    id.and_then(|id| items.iter().find(|d| &d.id == id))
        .or_else(|| slug.and_then(|s| items.iter().find(|d| slugify(&d.name) == s)))
        .or_else(|| items.first())
        .map(|d| d.id.clone())
}

fn merge_nodes(nodes: &mut Vec<GraphNode>, updates: &[GraphNode]) {
    for update in updates {
        match nodes.iter_mut().find(|n| n.id == update.id) {
            Some(slot) => *slot = update.clone(),
            None => nodes.push(update.clone()),
        }
    }
}
