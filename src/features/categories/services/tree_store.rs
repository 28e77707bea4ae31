//! Working copy of the category tree used while an admin edits ordering.
//!
//! The store keeps two layers:
//!
//! - `confirmed`: the last tree the server acknowledged (fetched or reordered),
//! - `working`: `confirmed` with every pending drag gesture replayed on top.
//!
//! Rolling back a failed gesture is therefore "drop it from the pending queue
//! and replay the rest", never an attempt to undo a move in place.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::categories::models::{
    position_of_category, Category, DragItem, DragMove, Subcategory, TreeSnapshot, TreeVersion,
};

/// Identifier of an applied but not yet persisted drag gesture
pub type GestureId = u64;

pub type SharedTreeStore = Arc<RwLock<TreeStore>>;

#[derive(Debug, Clone)]
struct PendingGesture {
    id: GestureId,
    movement: DragMove,
}

#[derive(Debug, Default)]
pub struct TreeStore {
    confirmed: TreeSnapshot,
    working: Vec<Category>,
    pending: VecDeque<PendingGesture>,
    next_gesture: GestureId,
    loaded: bool,
    stale: bool,
}

impl TreeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedTreeStore {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Replace the whole tree with a fresh server snapshot.
    ///
    /// Gestures still waiting for the server are replayed on top, so a refetch
    /// during an in-flight reorder never hides the optimistic order.
    pub fn load(&mut self, snapshot: TreeSnapshot) {
        if !self.pending.is_empty() {
            tracing::debug!(
                "Replaying {} pending gesture(s) over loaded tree",
                self.pending.len()
            );
        }
        self.rebase(snapshot);
    }

    /// Replace the confirmed layer with a fresh snapshot, keeping pending gestures.
    ///
    /// Gestures that no longer apply to the new tree are dropped.
    pub fn rebase(&mut self, snapshot: TreeSnapshot) {
        self.confirmed = snapshot;
        self.loaded = true;
        self.stale = false;
        self.replay();
    }

    /// Tree to render: confirmed plus pending gestures
    pub fn current_snapshot(&self) -> &[Category] {
        &self.working
    }

    pub fn confirmed_snapshot(&self) -> &TreeSnapshot {
        &self.confirmed
    }

    pub fn version(&self) -> Option<&TreeVersion> {
        self.confirmed.version.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Mark the local copy as outdated; the next refresh refetches it
    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Apply a drag gesture optimistically to the working tree.
    ///
    /// Returns `None` for a no-op move (item dropped on itself).
    pub fn apply_gesture(&mut self, movement: DragMove) -> Result<Option<GestureId>> {
        if movement.is_noop() {
            return Ok(None);
        }

        self.working = move_item(&self.working, movement)?;

        let id = self.next_gesture;
        self.next_gesture += 1;
        self.pending.push_back(PendingGesture { id, movement });

        Ok(Some(id))
    }

    /// Tree to submit for a pending gesture: the gesture applied to `confirmed`
    pub fn submission_for(&self, id: GestureId) -> Result<(Vec<Category>, Option<TreeVersion>)> {
        let gesture = self
            .pending
            .iter()
            .find(|g| g.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Gesture {} is no longer pending", id)))?;

        let tree = move_item(&self.confirmed.categories, gesture.movement)?;
        Ok((tree, self.confirmed.version.clone()))
    }

    /// Record a server-acknowledged gesture.
    ///
    /// A gesture that is no longer pending leaves the local copy unreliable, so
    /// the store is invalidated and the next refresh refetches it.
    pub fn confirm(&mut self, id: GestureId, tree: Vec<Category>, version: Option<TreeVersion>) {
        if !self.remove_pending(id) {
            tracing::warn!("Confirmation for unknown gesture {}, invalidating tree", id);
            self.stale = true;
            return;
        }
        self.confirmed = TreeSnapshot::new(tree, version);
        self.replay();
    }

    /// Drop a gesture the server refused and revert its effect on the working tree
    pub fn reject(&mut self, id: GestureId) {
        if self.remove_pending(id) {
            self.replay();
        }
    }

    pub fn find_category(&self, id: Uuid) -> Option<&Category> {
        self.working.iter().find(|c| c.id == id)
    }

    pub fn find_subcategory(&self, id: Uuid) -> Option<&Subcategory> {
        self.working
            .iter()
            .flat_map(|c| c.subcategories.iter())
            .find(|s| s.id == id)
    }

    fn remove_pending(&mut self, id: GestureId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|g| g.id != id);
        self.pending.len() != before
    }

    fn replay(&mut self) {
        let mut tree = self.confirmed.categories.clone();
        self.pending.retain(|gesture| match move_item(&tree, gesture.movement) {
            Ok(next) => {
                tree = next;
                true
            }
            Err(e) => {
                tracing::warn!("Dropping pending gesture {}: {}", gesture.id, e);
                false
            }
        });
        self.working = tree;
    }
}

/// Compute the tree that results from dropping `movement.active` over `movement.over`.
///
/// - category over category: array move within the category list
/// - subcategory over subcategory: array move within the owning category, or a
///   transfer to the other category at the hovered index
/// - mixed kinds are rejected
pub fn move_item(tree: &[Category], movement: DragMove) -> Result<Vec<Category>> {
    if movement.is_noop() {
        return Ok(tree.to_vec());
    }

    match (movement.active, movement.over) {
        (DragItem::Category { id: active }, DragItem::Category { id: over }) => {
            let from = category_index(tree, active)?;
            let to = category_index(tree, over)?;

            let mut next = tree.to_vec();
            array_move(&mut next, from, to);
            Ok(next)
        }
        (
            DragItem::Subcategory {
                id: active,
                parent_id: source_id,
            },
            DragItem::Subcategory {
                id: over,
                parent_id: target_id,
            },
        ) => {
            let source = category_index(tree, source_id)?;
            let target = category_index(tree, target_id)?;
            let from = subcategory_index(&tree[source], active)?;
            let to = subcategory_index(&tree[target], over)?;

            let mut next = tree.to_vec();
            if source == target {
                array_move(&mut next[source].subcategories, from, to);
            } else {
                let mut moved = next[source].subcategories.remove(from);
                moved.category_id = next[target].id;
                next[target].subcategories.insert(to, moved);
            }
            Ok(next)
        }
        (DragItem::Subcategory { .. }, DragItem::Category { .. }) => Err(
            AppError::UnsupportedMove("Drop the subcategory onto another subcategory".to_string()),
        ),
        (DragItem::Category { .. }, DragItem::Subcategory { .. }) => Err(
            AppError::UnsupportedMove("Categories cannot be nested under a category".to_string()),
        ),
    }
}

fn array_move<T>(items: &mut Vec<T>, from: usize, to: usize) {
    let item = items.remove(from);
    items.insert(to, item);
}

fn category_index(tree: &[Category], id: Uuid) -> Result<usize> {
    position_of_category(tree, id)
        .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))
}

fn subcategory_index(category: &Category, id: Uuid) -> Result<usize> {
    category.position_of(id).ok_or_else(|| {
        AppError::NotFound(format!(
            "Subcategory {} not found in category {}",
            id, category.id
        ))
    })
}
