//! Structural guarantees of the path tree.
//!
//! - Building is deterministic regardless of input order.
//! - Every item lands in exactly one node, the one matching its path.
//! - Moves conserve the leaf count.

use atlas_model::{Diagram, ItemPath, PathItem};
use atlas_test_utils::diagram;
use atlas_tree::{move_item, MoveOutcome, MoveTarget, PathStore, TreeNode};
use async_trait::async_trait;
use proptest::prelude::*;
use std::sync::Mutex;

fn path_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(prop_oneof![Just("ops"), Just("net"), Just(" "), Just("eu")], 0..4)
        .prop_map(|segs| segs.join("/"))
}

fn items_strategy() -> impl Strategy<Value = Vec<Diagram>> {
    prop::collection::vec(("[a-d]{1,3}", path_strategy()), 0..24).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (name, path))| diagram(&format!("id{i}"), &name, &path))
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_build_is_deterministic(items in items_strategy()) {
        let first = TreeNode::build(&items);
        let second = TreeNode::build(&items);
        prop_assert_eq!(&first, &second);

        let mut reversed = items.clone();
        reversed.reverse();
        prop_assert_eq!(&first, &TreeNode::build(&reversed));
    }

    #[test]
    fn prop_every_item_filed_once_at_its_path(items in items_strategy()) {
        let tree = TreeNode::build(&items);
        prop_assert_eq!(tree.count_items(), items.len());

        for item in &items {
            let node = tree.locate(item.id()).expect("item must be filed");
            prop_assert_eq!(&node.full_path, item.path());
            let copies = tree.leaves().into_iter().filter(|d| d.id == item.id).count();
            prop_assert_eq!(copies, 1);
        }
    }

    #[test]
    fn prop_filter_only_keeps_matches(items in items_strategy(), needle in "[a-d]") {
        let tree = TreeNode::build(&items);
        match tree.filter(&needle) {
            Some(filtered) => {
                for leaf in filtered.leaves() {
                    prop_assert!(leaf.name.contains(needle.as_str()));
                }
                let expected = items.iter().filter(|d| d.name.contains(needle.as_str())).count();
                prop_assert_eq!(filtered.count_items(), expected);
            }
            None => prop_assert!(items.iter().all(|d| !d.name.contains(needle.as_str()))),
        }
    }
}

#[test]
fn scenario_root_and_nested_folder() {
    let tree = TreeNode::build(&[
        diagram("X", "X", ""),
        diagram("Z", "Z", "ops/net"),
        diagram("Y", "Y", "ops/net"),
    ]);

    let root_ids: Vec<&str> = tree.items.iter().map(PathItem::id).collect();
    assert_eq!(root_ids, vec!["X"]);

    let net = &tree.children["ops"].children["net"];
    let net_ids: Vec<&str> = net.items.iter().map(PathItem::id).collect();
    assert_eq!(net_ids, vec!["Y", "Z"]);
}

#[test]
fn scenario_filter_keeps_only_matching_branch() {
    let tree = TreeNode::build(&[
        diagram("X", "X", ""),
        diagram("Y", "Y", "ops/net"),
        diagram("Z", "Z", "ops/net"),
    ]);

    let filtered = tree.filter("y").expect("Y matches");
    assert!(filtered.items.is_empty());
    assert_eq!(filtered.children.len(), 1);

    let net = filtered.find(&ItemPath::parse("ops/net")).unwrap();
    let ids: Vec<&str> = net.items.iter().map(PathItem::id).collect();
    assert_eq!(ids, vec!["Y"]);
    assert!(filtered.children["ops"].items.is_empty());
}

#[derive(Debug, thiserror::Error)]
#[error("unreachable")]
struct Never;

struct MemoryStore(Mutex<Vec<Diagram>>);

#[async_trait]
impl PathStore<Diagram> for MemoryStore {
    type Error = Never;

    async fn update_path(&self, item_id: &str, path: &ItemPath) -> Result<Vec<Diagram>, Never> {
        let mut items = self.0.lock().unwrap();
        if let Some(item) = items.iter_mut().find(|d| d.id.as_str() == item_id) {
            item.path = path.clone();
        }
        Ok(items.clone())
    }
}

#[tokio::test]
async fn move_conserves_leaf_count() {
    let items = vec![
        diagram("a", "A", "one"),
        diagram("b", "B", "one/two"),
        diagram("c", "C", ""),
    ];
    let before = TreeNode::build(&items);
    let store = MemoryStore(Mutex::new(items.clone()));

    let outcome = move_item(&store, &items, "b", &MoveTarget::folder("three"))
        .await
        .unwrap();
    let MoveOutcome::Moved { tree: after, .. } = outcome else {
        panic!("expected move");
    };

    assert_eq!(before.count_items(), after.count_items());
    assert!(after
        .find(&ItemPath::parse("one/two"))
        .is_none());
    assert_eq!(
        after.locate("b").map(|n| n.full_path.to_string()),
        Some("three".to_string())
    );
}
