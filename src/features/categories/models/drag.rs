use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Item picked up or hovered during a drag gesture.
///
/// Subcategories carry their parent so the tree never has to be scanned to
/// find the owning category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DragItem {
    Category {
        id: Uuid,
    },
    #[serde(rename_all = "camelCase")]
    Subcategory {
        id: Uuid,
        parent_id: Uuid,
    },
}

impl DragItem {
    pub fn id(&self) -> Uuid {
        match self {
            DragItem::Category { id } | DragItem::Subcategory { id, .. } => *id,
        }
    }
}

/// A completed drag: `active` was dropped over `over`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragMove {
    pub active: DragItem,
    pub over: DragItem,
}

impl DragMove {
    pub fn new(active: DragItem, over: DragItem) -> Self {
        Self { active, over }
    }

    pub fn is_noop(&self) -> bool {
        self.active.id() == self.over.id()
    }
}
