use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category as served by the admin API.
///
/// Position is implicit: the index within the ordered tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub is_active: bool,
    #[serde(default)]
    pub subcategories: Vec<Subcategory>,
}

/// Subcategory nested under exactly one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subcategory {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub is_active: bool,
    pub category_id: Uuid,
}

/// Opaque version of a fetched tree, carried as an HTTP entity tag
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TreeVersion(pub String);

impl TreeVersion {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Full ordered tree together with the version it was fetched at
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeSnapshot {
    pub categories: Vec<Category>,
    pub version: Option<TreeVersion>,
}

impl TreeSnapshot {
    pub fn new(categories: Vec<Category>, version: Option<TreeVersion>) -> Self {
        Self {
            categories,
            version,
        }
    }
}

impl Category {
    pub fn position_of(&self, subcategory_id: Uuid) -> Option<usize> {
        self.subcategories
            .iter()
            .position(|s| s.id == subcategory_id)
    }
}

pub fn position_of_category(tree: &[Category], id: Uuid) -> Option<usize> {
    tree.iter().position(|c| c.id == id)
}
