//! Admin editor for the ordered category tree.
//!
//! Categories and their subcategories form a two-level tree whose order is
//! the storefront display order. Drag gestures are applied optimistically
//! and persisted with a bulk reorder; create, update and deactivate go
//! through the mutation gateway and force a refetch.
//!
//! ## Admin API
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/admin/categories` | Full ordered tree (`ETag` = version) |
//! | PUT | `/api/admin/categories/reorder` | Replace the ordering (`If-Match`) |
//! | POST | `/api/admin/categories` | Create category |
//! | PUT/DELETE | `/api/admin/categories/{id}` | Update / deactivate category |
//! | POST | `/api/admin/categories/subcategory` | Create subcategory |
//! | PUT/DELETE | `/api/admin/categories/subcategory/{id}` | Update / deactivate subcategory |

pub mod clients;
pub mod dtos;
pub mod models;
pub mod services;

pub use clients::{AdminApiClient, AdminCategoryApi};
pub use services::{MutationGateway, Reconciler, TreeStore};
