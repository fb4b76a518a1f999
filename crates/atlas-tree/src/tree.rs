//! Directory tree built from flat, path-tagged items
//!
//! The tree is a pure projection: it is rebuilt from the item list whenever
//! that list changes and is never patched in place.

use atlas_model::{ItemPath, PathItem};
use serde::Serialize;
use std::collections::BTreeMap;

/// Kind of tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// The single top-level node
    Root,
    /// A folder derived from a path segment
    Group,
}

/// Node of the directory tree
///
/// Invariant: every item handed to [`TreeNode::build`] is stored in exactly
/// one node, the one whose `full_path` equals the item's path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode<T> {
    /// Root or group
    pub kind: NodeKind,
    /// Folder name (last path segment); `None` for the root
    pub name: Option<String>,
    /// Full folder path; the root path for the root node
    pub full_path: ItemPath,
    /// Sub-folders keyed by segment, ordered by segment
    pub children: BTreeMap<String, TreeNode<T>>,
    /// Items filed directly in this folder, ordered by name
    pub items: Vec<T>,
}

impl<T> TreeNode<T> {
    /// Empty root node
    #[must_use]
    pub fn root() -> Self {
        Self {
            kind: NodeKind::Root,
            name: None,
            full_path: ItemPath::root(),
            children: BTreeMap::new(),
            items: Vec::new(),
        }
    }

    fn group(full_path: ItemPath) -> Self {
        Self {
            kind: NodeKind::Group,
            name: full_path.last().map(str::to_string),
            full_path,
            children: BTreeMap::new(),
            items: Vec::new(),
        }
    }

    fn empty_like(&self) -> Self {
        Self {
            kind: self.kind,
            name: self.name.clone(),
            full_path: self.full_path.clone(),
            children: BTreeMap::new(),
            items: Vec::new(),
        }
    }

    /// Whether the node has neither items nor sub-folders
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.children.is_empty()
    }

    /// Items in this node and all descendants (directory badge count)
    #[must_use]
    pub fn count_items(&self) -> usize {
        self.items.len()
            + self
                .children
                .values()
                .map(TreeNode::count_items)
                .sum::<usize>()
    }

    /// Node at the given folder path
    #[must_use]
    pub fn find(&self, path: &ItemPath) -> Option<&TreeNode<T>> {
        if !self.full_path.is_prefix_of(path) {
            return None;
        }
        path.segments()[self.full_path.len()..]
            .iter()
            .try_fold(self, |node, seg| node.children.get(seg))
    }

    /// Every folder path below this node, depth-first in segment order
    #[must_use]
    pub fn folder_paths(&self) -> Vec<ItemPath> {
        let mut out = Vec::new();
        self.collect_folders(&mut out);
        out
    }

    fn collect_folders(&self, out: &mut Vec<ItemPath>) {
        for child in self.children.values() {
            out.push(child.full_path.clone());
            child.collect_folders(out);
        }
    }

    /// All leaves, this node's items first, then each child depth-first
    #[must_use]
    pub fn leaves(&self) -> Vec<&T> {
        let mut out = Vec::with_capacity(self.count_items());
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a T>) {
        out.extend(self.items.iter());
        for child in self.children.values() {
            child.collect_leaves(out);
        }
    }
}

impl<T: PathItem> TreeNode<T> {
    /// Build the tree for a flat item list
    ///
    /// Items are ordered by `(path, name)` (id breaks ties) before insertion,
    /// so building twice from the same list yields identical trees.
    #[must_use]
    pub fn build(items: &[T]) -> Self {
        let mut sorted: Vec<&T> = items.iter().collect();
        sorted.sort_by_cached_key(|item| {
            (
                item.path().to_string(),
                item.name().to_string(),
                item.id().to_string(),
            )
        });

        let mut root = Self::root();
        for item in sorted {
            let mut node = &mut root;
            for (segment, prefix) in item.path().segments().iter().zip(item.path().prefixes()) {
                node = node
                    .children
                    .entry(segment.clone())
                    .or_insert_with(|| Self::group(prefix));
            }
            node.items.push(item.clone());
        }

        tracing::trace!(items = items.len(), "rebuilt path tree");
        root
    }

    /// Case-insensitive search over item names and descriptions
    ///
    /// A blank query returns the tree unchanged. Otherwise a node survives
    /// iff it holds a matching item or a surviving child; `None` means
    /// nothing matched.
    #[must_use]
    pub fn filter(&self, query: &str) -> Option<Self> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Some(self.clone());
        }
        self.filter_by(&|item: &T| item_matches(item, &needle))
    }

    /// Keep only items accepted by `predicate`, pruning empty branches
    #[must_use]
    pub fn filter_by<P>(&self, predicate: &P) -> Option<Self>
    where
        P: Fn(&T) -> bool,
    {
        let mut kept = self.empty_like();
        kept.items = self
            .items
            .iter()
            .filter(|item| predicate(*item))
            .cloned()
            .collect();

        for (segment, child) in &self.children {
            if let Some(filtered) = child.filter_by(predicate) {
                kept.children.insert(segment.clone(), filtered);
            }
        }

        if kept.is_empty() {
            None
        } else {
            Some(kept)
        }
    }

    /// Node that files the item with `id`
    #[must_use]
    pub fn locate(&self, id: &str) -> Option<&TreeNode<T>> {
        if self.items.iter().any(|item| item.id() == id) {
            return Some(self);
        }
        self.children.values().find_map(|child| child.locate(id))
    }
}

fn item_matches<T: PathItem>(item: &T, needle: &str) -> bool {
    item.name().to_lowercase().contains(needle)
        || item
            .description()
            .is_some_and(|d| d.to_lowercase().contains(needle))
}
