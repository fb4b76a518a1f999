//! Drag-to-move for path-organized items
//!
//! A move is planned against the current item list, persisted through a
//! [`PathStore`], and answered with a tree rebuilt from the list the store
//! returns. Nothing is changed optimistically: if persistence fails the
//! caller keeps its old tree.

use crate::tree::TreeNode;
use async_trait::async_trait;
use atlas_model::{ItemPath, PathItem};

/// Where an item was dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveTarget {
    /// Top level of the hierarchy
    Root,
    /// A folder, by path
    Folder(ItemPath),
    /// Another item; the moved item joins that item's folder
    Item(String),
}

impl MoveTarget {
    /// Folder target parsed from user input; blank input means the root
    #[must_use]
    pub fn folder(raw: &str) -> Self {
        let path = ItemPath::parse(raw);
        if path.is_root() {
            Self::Root
        } else {
            Self::Folder(path)
        }
    }
}

/// Persistence seam for path updates
#[async_trait]
pub trait PathStore<T: PathItem + Send + Sync>: Send + Sync {
    /// Error produced by the backing store
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persist `path` for the item and return the refreshed item list
    ///
    /// The root path must reach the server as an explicit "move to root",
    /// never as "path unchanged".
    async fn update_path(&self, item_id: &str, path: &ItemPath) -> Result<Vec<T>, Self::Error>;
}

/// Validated move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    pub item_id: String,
    pub from: ItemPath,
    pub to: ItemPath,
}

/// Result of a move request
#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome<T> {
    /// Target equals the current path; nothing was sent
    Unchanged,
    /// Persisted; `tree` was rebuilt from `items`
    Moved {
        plan: MovePlan,
        items: Vec<T>,
        tree: TreeNode<T>,
    },
}

/// Move failures
#[derive(Debug, thiserror::Error)]
pub enum MoveError<E> {
    /// The dragged item is not in the list
    #[error("unknown item: {0}")]
    UnknownItem(String),

    /// The drop target item is not in the list
    #[error("unknown drop target: {0}")]
    UnknownTarget(String),

    /// Item dropped onto itself
    #[error("cannot drop item {0} onto itself")]
    OntoSelf(String),

    /// The store rejected the update
    #[error("failed to persist move: {0}")]
    Persistence(#[source] E),
}

/// Resolve a drop into a plan; `Ok(None)` when the path would not change
///
/// # Errors
/// - `MoveError::UnknownItem` / `MoveError::UnknownTarget` for ids not in `items`
/// - `MoveError::OntoSelf` when the target is the dragged item
pub fn plan_move<T: PathItem, E>(
    items: &[T],
    item_id: &str,
    target: &MoveTarget,
) -> Result<Option<MovePlan>, MoveError<E>> {
    if matches!(target, MoveTarget::Item(target_id) if target_id == item_id) {
        return Err(MoveError::OntoSelf(item_id.to_string()));
    }

    let item = items
        .iter()
        .find(|item| item.id() == item_id)
        .ok_or_else(|| MoveError::UnknownItem(item_id.to_string()))?;

    let to = match target {
        MoveTarget::Root => ItemPath::root(),
        MoveTarget::Folder(path) => path.clone(),
        MoveTarget::Item(target_id) => items
            .iter()
            .find(|other| other.id() == target_id)
            .map(|other| other.path().clone())
            .ok_or_else(|| MoveError::UnknownTarget(target_id.clone()))?,
    };

    if &to == item.path() {
        return Ok(None);
    }

    Ok(Some(MovePlan {
        item_id: item_id.to_string(),
        from: item.path().clone(),
        to,
    }))
}

/// Plan, persist and rebuild
///
/// # Errors
/// Planning errors as in [`plan_move`]; `MoveError::Persistence` when the
/// store fails, in which case no tree is produced.
pub async fn move_item<T, S>(
    store: &S,
    items: &[T],
    item_id: &str,
    target: &MoveTarget,
) -> Result<MoveOutcome<T>, MoveError<S::Error>>
where
    T: PathItem + Send + Sync,
    S: PathStore<T> + ?Sized,
{
    let Some(plan) = plan_move::<T, S::Error>(items, item_id, target)? else {
        tracing::debug!(item_id, "move target equals current path; skipping update");
        return Ok(MoveOutcome::Unchanged);
    };

    tracing::info!(item_id, from = %plan.from, to = %plan.to, "moving item");
    let refreshed = match store.update_path(item_id, &plan.to).await {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(item_id, error = %e, "move rejected by store");
            return Err(MoveError::Persistence(e));
        }
    };

    let tree = TreeNode::build(&refreshed);
    Ok(MoveOutcome::Moved {
        plan,
        items: refreshed,
        tree,
    })
}
