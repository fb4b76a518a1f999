//! Navigation errors

use crate::state::Phase;
use atlas_client::CatalogError;
use atlas_groups::LayoutError;
use atlas_tree::MoveError;

/// Navigator result alias
pub type NavResult<T> = Result<T, NavError>;

/// Failures surfaced by the navigator
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    /// Data access failed
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Drag-to-move rejected or not persisted
    #[error("move failed: {0}")]
    Move(#[from] MoveError<CatalogError>),

    /// Group layout is inconsistent
    #[error("invalid group layout: {0}")]
    Layout(#[from] LayoutError),

    /// Request refused before reaching the catalog
    #[error("{0}")]
    Validation(String),

    /// Operation needs a selected environment
    #[error("no environment selected")]
    NoEnvironmentSelected,

    /// Operation needs a selected diagram
    #[error("no diagram selected")]
    NoDiagramSelected,

    /// Another action holds the navigator
    #[error("navigation in progress")]
    Busy,

    /// Phase change not permitted by the state machine
    #[error("illegal phase transition: {from:?} -> {to:?}")]
    IllegalTransition { from: Phase, to: Phase },

    /// Configuration could not be read
    #[error("configuration error: {0}")]
    Config(String),
}

impl NavError {
    /// Check if the user may simply try again
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Catalog(e) | Self::Move(MoveError::Persistence(e)) => e.is_transient(),
            Self::Busy => true,
            _ => false,
        }
    }

    /// Message shown to the user
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Catalog(CatalogError::Authorization(_)) => {
                "You do not have permission to perform this action".to_string()
            }
            Self::Catalog(e) if e.is_transient() => {
                "Could not reach the server. Please try again".to_string()
            }
            other => other.to_string(),
        }
    }
}
