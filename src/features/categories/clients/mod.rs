mod admin_api_client;

pub use admin_api_client::{AdminApiClient, AdminCategoryApi};
