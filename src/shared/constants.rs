// =============================================================================
// ADMIN API PATHS
// =============================================================================

/// Category tree (GET) and category creation (POST)
pub const CATEGORIES_PATH: &str = "/api/admin/categories";

/// Bulk reorder of the full tree
pub const REORDER_PATH: &str = "/api/admin/categories/reorder";

/// Subcategory creation (POST); `/{id}` for update and deactivation
pub const SUBCATEGORIES_PATH: &str = "/api/admin/categories/subcategory";

