//! Navigation state and its phase machine

use crate::error::NavError;
use atlas_model::{Diagram, DiagramId, Environment, EnvironmentId};
use atlas_tree::TreeNode;

/// Where the navigator is in its load sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// Nothing loaded yet
    #[default]
    Idle,
    /// Fetching the environment list
    LoadingEnvironments,
    /// Fetching the diagram list of the selected environment
    LoadingDiagramList,
    /// Fetching the selected diagram with its graph
    LoadingDiagramDetail,
    /// Selection and data are consistent
    Ready,
    /// The last load failed
    Error,
}

impl Phase {
    /// Whether a load is running
    #[inline]
    #[must_use]
    pub fn is_loading(self) -> bool {
        matches!(
            self,
            Self::LoadingEnvironments | Self::LoadingDiagramList | Self::LoadingDiagramDetail
        )
    }
}

const LOADS: [Phase; 3] = [
    Phase::LoadingEnvironments,
    Phase::LoadingDiagramList,
    Phase::LoadingDiagramDetail,
];

/// Phases reachable from `from`
///
/// Any phase may start a new load; only loads may finish in `Ready` or
/// `Error`.
#[must_use]
pub fn allowed_transitions(from: Phase) -> Vec<Phase> {
    let mut next = LOADS.to_vec();
    if from.is_loading() {
        next.extend([Phase::Ready, Phase::Error]);
    }
    next
}

/// Check a phase change against [`allowed_transitions`]
///
/// # Errors
/// `NavError::IllegalTransition` when `to` is not reachable from `from`.
pub fn validate_transition(from: Phase, to: Phase) -> Result<(), NavError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(NavError::IllegalTransition { from, to })
    }
}

/// Environment/diagram pair shown in the location bar
pub type LocationPair = (Option<EnvironmentId>, Option<DiagramId>);

/// Everything the UI renders from
///
/// Published through a `watch` channel; observers only ever see states
/// produced by whole [`Transition`](crate::Transition)s.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationState {
    pub environments: Vec<Environment>,
    pub environment_tree: TreeNode<Environment>,
    pub selected_environment_id: Option<EnvironmentId>,
    pub diagrams: Vec<Diagram>,
    pub diagram_tree: TreeNode<Diagram>,
    pub selected_diagram_id: Option<DiagramId>,
    /// Diagram selected before the current one
    pub previous_diagram_id: Option<DiagramId>,
    pub current_diagram: Option<Diagram>,
    pub phase: Phase,
    /// A navigation action holds the re-entrancy guard
    pub in_flight: bool,
    /// Loading indicator; stays up for a minimum visible duration
    pub loading: bool,
    pub last_error: Option<String>,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self {
            environments: Vec::new(),
            environment_tree: TreeNode::root(),
            selected_environment_id: None,
            diagrams: Vec::new(),
            diagram_tree: TreeNode::root(),
            selected_diagram_id: None,
            previous_diagram_id: None,
            current_diagram: None,
            phase: Phase::Idle,
            in_flight: false,
            loading: false,
            last_error: None,
        }
    }
}

impl NavigationState {
    #[must_use]
    pub fn selected_environment(&self) -> Option<&Environment> {
        let id = self.selected_environment_id.as_ref()?;
        self.environments.iter().find(|e| &e.id == id)
    }

    #[must_use]
    pub fn selected_diagram(&self) -> Option<&Diagram> {
        let id = self.selected_diagram_id.as_ref()?;
        self.diagrams.iter().find(|d| &d.id == id)
    }

    /// Current selection as a location pair
    #[must_use]
    pub fn location_pair(&self) -> LocationPair {
        (
            self.selected_environment_id.clone(),
            self.selected_diagram_id.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_phase_may_start_a_load() {
        for from in [
            Phase::Idle,
            Phase::Ready,
            Phase::Error,
            Phase::LoadingDiagramList,
        ] {
            for to in LOADS {
                assert!(validate_transition(from, to).is_ok(), "{from:?} -> {to:?}");
            }
        }
    }

    #[test]
    fn only_loads_settle() {
        assert!(validate_transition(Phase::LoadingEnvironments, Phase::Ready).is_ok());
        assert!(validate_transition(Phase::LoadingDiagramDetail, Phase::Error).is_ok());
        assert!(matches!(
            validate_transition(Phase::Idle, Phase::Ready),
            Err(NavError::IllegalTransition { .. })
        ));
        assert!(validate_transition(Phase::Ready, Phase::Error).is_err());
    }

    #[test]
    fn default_state_is_idle_and_empty() {
        let state = NavigationState::default();
        assert_eq!(state.phase, Phase::Idle);
        assert!(state.environment_tree.is_empty());
        assert_eq!(state.location_pair(), (None, None));
    }
}
