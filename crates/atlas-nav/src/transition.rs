//! Batched state changes
//!
//! A navigation action accumulates every field it changes in one
//! [`Transition`] and applies it in a single step, so observers never see
//! a new environment paired with the old diagram list.

use crate::error::NavError;
use crate::state::{validate_transition, NavigationState, Phase};
use atlas_model::{Diagram, DiagramId, Environment, EnvironmentId};
use atlas_tree::TreeNode;

/// Pending changes to [`NavigationState`]; `None` fields stay as they are
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use]
pub struct Transition {
    environments: Option<Vec<Environment>>,
    selected_environment_id: Option<Option<EnvironmentId>>,
    diagrams: Option<Vec<Diagram>>,
    selected_diagram_id: Option<Option<DiagramId>>,
    previous_diagram_id: Option<Option<DiagramId>>,
    current_diagram: Option<Option<Diagram>>,
    phase: Option<Phase>,
    in_flight: Option<bool>,
    loading: Option<bool>,
    last_error: Option<Option<String>>,
}

impl Transition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the environment list (the tree is rebuilt on apply)
    pub fn environments(mut self, items: Vec<Environment>) -> Self {
        self.environments = Some(items);
        self
    }

    pub fn select_environment(mut self, id: Option<EnvironmentId>) -> Self {
        self.selected_environment_id = Some(id);
        self
    }

    /// Replace the diagram list (the tree is rebuilt on apply)
    pub fn diagrams(mut self, items: Vec<Diagram>) -> Self {
        self.diagrams = Some(items);
        self
    }

    pub fn select_diagram(mut self, id: Option<DiagramId>) -> Self {
        self.selected_diagram_id = Some(id);
        self
    }

    pub fn previous_diagram(mut self, id: Option<DiagramId>) -> Self {
        self.previous_diagram_id = Some(id);
        self
    }

    pub fn current_diagram(mut self, diagram: Option<Diagram>) -> Self {
        self.current_diagram = Some(diagram);
        self
    }

    pub fn phase(mut self, phase: Phase) -> Self {
        self.phase = Some(phase);
        self
    }

    pub fn in_flight(mut self, in_flight: bool) -> Self {
        self.in_flight = Some(in_flight);
        self
    }

    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = Some(loading);
        self
    }

    pub fn error(mut self, message: Option<String>) -> Self {
        self.last_error = Some(message);
        self
    }

    /// Whether the transition changes nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Target phase, if the transition sets one
    #[must_use]
    pub fn target_phase(&self) -> Option<Phase> {
        self.phase
    }

    /// Apply every change to `state`
    ///
    /// The phase change is validated first; on error `state` is untouched.
    ///
    /// # Errors
    /// `NavError::IllegalTransition` for a phase change the machine forbids.
    pub fn apply(self, state: &mut NavigationState) -> Result<(), NavError> {
        if let Some(phase) = self.phase {
            if phase != state.phase {
                validate_transition(state.phase, phase)?;
            }
        }

        if let Some(items) = self.environments {
            state.environment_tree = TreeNode::build(&items);
            state.environments = items;
        }
        if let Some(id) = self.selected_environment_id {
            state.selected_environment_id = id;
        }
        if let Some(items) = self.diagrams {
            state.diagram_tree = TreeNode::build(&items);
            state.diagrams = items;
        }
        if let Some(id) = self.selected_diagram_id {
            state.selected_diagram_id = id;
        }
        if let Some(id) = self.previous_diagram_id {
            state.previous_diagram_id = id;
        }
        if let Some(diagram) = self.current_diagram {
            state.current_diagram = diagram;
        }
        if let Some(phase) = self.phase {
            if phase != state.phase {
                tracing::debug!(from = ?state.phase, to = ?phase, "navigation phase");
            }
            state.phase = phase;
        }
        if let Some(in_flight) = self.in_flight {
            state.in_flight = in_flight;
        }
        if let Some(loading) = self.loading {
            state.loading = loading;
        }
        if let Some(message) = self.last_error {
            state.last_error = message;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_test_utils::{diagram, environment};

    #[test]
    fn apply_sets_only_named_fields() {
        let mut state = NavigationState {
            last_error: Some("old".into()),
            ..NavigationState::default()
        };

        Transition::new()
            .environments(vec![environment("e1", "Prod", "cloud")])
            .select_environment(Some(EnvironmentId::new("e1")))
            .phase(Phase::LoadingDiagramList)
            .apply(&mut state)
            .unwrap();

        assert_eq!(state.selected_environment().map(|e| e.name.as_str()), Some("Prod"));
        assert_eq!(state.environment_tree.count_items(), 1);
        assert_eq!(state.last_error.as_deref(), Some("old"));
        assert_eq!(state.phase, Phase::LoadingDiagramList);
    }

    #[test]
    fn illegal_phase_leaves_state_untouched() {
        let mut state = NavigationState::default();
        let result = Transition::new()
            .diagrams(vec![diagram("d1", "One", "")])
            .phase(Phase::Ready)
            .apply(&mut state);

        assert!(matches!(result, Err(NavError::IllegalTransition { .. })));
        assert!(state.diagrams.is_empty());
        assert_eq!(state.phase, Phase::Idle);
    }

    #[test]
    fn same_phase_is_not_a_transition() {
        let mut state = NavigationState {
            phase: Phase::Ready,
            ..NavigationState::default()
        };
        Transition::new().phase(Phase::Ready).apply(&mut state).unwrap();
        assert_eq!(state.phase, Phase::Ready);
    }

    #[test]
    fn clearing_fields_is_explicit() {
        let mut state = NavigationState {
            selected_diagram_id: Some(DiagramId::new("d1")),
            current_diagram: Some(diagram("d1", "One", "")),
            ..NavigationState::default()
        };
        Transition::new()
            .select_diagram(None)
            .current_diagram(None)
            .apply(&mut state)
            .unwrap();
        assert!(state.selected_diagram_id.is_none());
        assert!(state.current_diagram.is_none());
        assert!(Transition::new().is_empty());
    }
}
