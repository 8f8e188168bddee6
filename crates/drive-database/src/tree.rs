//! Subtree traversal primitives.
//!
//! A subtree is an item plus everything reachable from it by repeatedly
//! following child links. All three primitives walk breadth-first over
//! [`ItemStore::list_children`] with a visited set, so they terminate in
//! O(subtree) lookups even if the stored parent links were corrupted into a
//! cycle.

use std::collections::{HashSet, VecDeque};

use uuid::Uuid;

use drive_core::result::AppResult;
use drive_entity::item::Item;

use crate::store::ItemStore;

/// An item reached during a subtree walk, with its distance from the root.
#[derive(Debug, Clone)]
pub struct SubtreeNode {
    /// The item.
    pub item: Item,
    /// 0 for the walk root, 1 for its children, and so on.
    pub depth: usize,
}

/// Whether `candidate_id` is `root_id` or one of its descendants.
pub async fn exists_in_subtree<S>(store: &mut S, root_id: Uuid, candidate_id: Uuid) -> AppResult<bool>
where
    S: ItemStore + ?Sized,
{
    if root_id == candidate_id {
        return Ok(true);
    }

    let mut visited = HashSet::from([root_id]);
    let mut queue = VecDeque::from([root_id]);

    while let Some(id) = queue.pop_front() {
        for child in store.list_children(id).await? {
            if child.id == candidate_id {
                return Ok(true);
            }
            if visited.insert(child.id) {
                queue.push_back(child.id);
            }
        }
    }

    Ok(false)
}

/// Every item in the subtree rooted at `root_id`, breadth-first, root first.
/// Empty if the root does not exist.
pub async fn walk_subtree<S>(store: &mut S, root_id: Uuid) -> AppResult<Vec<SubtreeNode>>
where
    S: ItemStore + ?Sized,
{
    let Some(root) = store.find_item(root_id).await? else {
        return Ok(Vec::new());
    };

    let mut visited = HashSet::from([root_id]);
    let mut nodes = vec![SubtreeNode {
        item: root,
        depth: 0,
    }];
    let mut cursor = 0;

    while cursor < nodes.len() {
        let (parent_id, depth) = (nodes[cursor].item.id, nodes[cursor].depth);
        cursor += 1;

        for child in store.list_children(parent_id).await? {
            if visited.insert(child.id) {
                nodes.push(SubtreeNode {
                    item: child,
                    depth: depth + 1,
                });
            }
        }
    }

    Ok(nodes)
}

/// Blob keys of every file in the subtree, including the root itself.
pub async fn list_file_keys_in_subtree<S>(store: &mut S, root_id: Uuid) -> AppResult<Vec<String>>
where
    S: ItemStore + ?Sized,
{
    Ok(walk_subtree(store, root_id)
        .await?
        .into_iter()
        .filter(|node| node.item.is_file())
        .filter_map(|node| node.item.blob_key)
        .collect())
}

/// Every ID in the subtree ordered so that each item comes before its parent.
pub async fn subtree_ids_deepest_first<S>(store: &mut S, root_id: Uuid) -> AppResult<Vec<Uuid>>
where
    S: ItemStore + ?Sized,
{
    let mut nodes = walk_subtree(store, root_id).await?;
    nodes.sort_by(|a, b| b.depth.cmp(&a.depth));
    Ok(nodes.into_iter().map(|node| node.item.id).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::store::{DriveStore, UnitOfWork};

    /// Builds `a/{f1, b/{f2}}` and returns `(a, b, f1, f2)`.
    async fn seed(store: &MemoryStore) -> (Item, Item, Item, Item) {
        let owner = Uuid::new_v4();
        let a = Item::new_folder(owner, None, "a");
        let b = Item::new_folder(owner, Some(a.id), "b");
        let f1 = Item::new_file(owner, Some(a.id), "f1.txt", None, 1);
        let f2 = Item::new_file(owner, Some(b.id), "f2.txt", None, 2);

        let mut tx = store.begin().await.unwrap();
        for item in [&a, &b, &f1, &f2] {
            tx.insert_item(item).await.unwrap();
        }
        tx.commit().await.unwrap();
        (a, b, f1, f2)
    }

    #[tokio::test]
    async fn test_exists_in_subtree_is_reflexive() {
        let store = MemoryStore::new();
        let (a, b, ..) = seed(&store).await;
        let mut tx = store.begin().await.unwrap();
        assert!(exists_in_subtree(tx.as_mut(), a.id, a.id).await.unwrap());
        assert!(exists_in_subtree(tx.as_mut(), b.id, b.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_exists_in_subtree_descends_but_not_upwards() {
        let store = MemoryStore::new();
        let (a, b, f1, f2) = seed(&store).await;
        let mut tx = store.begin().await.unwrap();
        assert!(exists_in_subtree(tx.as_mut(), a.id, f2.id).await.unwrap());
        assert!(exists_in_subtree(tx.as_mut(), a.id, b.id).await.unwrap());
        assert!(!exists_in_subtree(tx.as_mut(), b.id, a.id).await.unwrap());
        assert!(!exists_in_subtree(tx.as_mut(), b.id, f1.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_file_keys_cover_whole_subtree() {
        let store = MemoryStore::new();
        let (a, b, f1, f2) = seed(&store).await;
        let mut tx = store.begin().await.unwrap();

        let mut keys = list_file_keys_in_subtree(tx.as_mut(), a.id).await.unwrap();
        keys.sort();
        let mut expected = vec![f1.blob_key.clone().unwrap(), f2.blob_key.clone().unwrap()];
        expected.sort();
        assert_eq!(keys, expected);

        let keys = list_file_keys_in_subtree(tx.as_mut(), b.id).await.unwrap();
        assert_eq!(keys, vec![f2.blob_key.clone().unwrap()]);

        let keys = list_file_keys_in_subtree(tx.as_mut(), f1.id).await.unwrap();
        assert_eq!(keys, vec![f1.blob_key.clone().unwrap()]);
    }

    #[tokio::test]
    async fn test_deepest_first_puts_children_before_parents() {
        let store = MemoryStore::new();
        let (a, b, f1, f2) = seed(&store).await;
        let mut tx = store.begin().await.unwrap();

        let ids = subtree_ids_deepest_first(tx.as_mut(), a.id).await.unwrap();
        assert_eq!(ids.len(), 4);
        let pos = |id: Uuid| ids.iter().position(|x| *x == id).unwrap();
        assert!(pos(f2.id) < pos(b.id));
        assert!(pos(b.id) < pos(a.id));
        assert!(pos(f1.id) < pos(a.id));
        assert_eq!(*ids.last().unwrap(), a.id);
    }

    #[tokio::test]
    async fn test_missing_root_yields_empty_walk() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let ids = subtree_ids_deepest_first(tx.as_mut(), Uuid::new_v4()).await.unwrap();
        assert!(ids.is_empty());
    }
}
