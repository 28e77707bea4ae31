use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    http::{
        header::{AUTHORIZATION, ETAG, IF_MATCH},
        HeaderMap, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use fake::{faker::lorem::en::Word, Fake};
use tokio::{
    net::TcpListener,
    sync::{mpsc, Mutex},
};
use uuid::Uuid;

use crate::core::config::AdminApiConfig;
use crate::core::error::{AppError, Result};
use crate::features::categories::clients::AdminCategoryApi;
use crate::features::categories::dtos::{
    CreateCategoryDto, CreateSubcategoryDto, ReorderRequestDto, UpdateCategoryDto,
    UpdateSubcategoryDto,
};
use crate::features::categories::models::{Category, Subcategory, TreeSnapshot, TreeVersion};
use crate::shared::types::ApiResponse;
use crate::shared::validation::slugify;

pub fn category(name: &str) -> Category {
    Category {
        id: Uuid::new_v4(),
        name: name.to_string(),
        slug: slugify(name),
        is_active: true,
        subcategories: Vec::new(),
    }
}

pub fn subcategory(category_id: Uuid, name: &str) -> Subcategory {
    Subcategory {
        id: Uuid::new_v4(),
        name: name.to_string(),
        slug: slugify(name),
        is_active: true,
        category_id,
    }
}

/// Category with a generated name and up to four subcategories
pub fn random_category() -> Category {
    let mut c = category(&Word().fake::<String>());
    let count = (0..5).fake::<usize>();
    c.subcategories = (0..count)
        .map(|i| subcategory(c.id, &format!("{} {}", Word().fake::<String>(), i)))
        .collect();
    c
}

pub fn category_ids(tree: &[Category]) -> Vec<Uuid> {
    tree.iter().map(|c| c.id).collect()
}

pub fn subcategory_ids(category: &Category) -> Vec<Uuid> {
    category.subcategories.iter().map(|s| s.id).collect()
}

// =============================================================================
// IN-MEMORY ADMIN API
// =============================================================================

#[derive(Default)]
struct MockState {
    tree: Vec<Category>,
    version: u64,
    requests: usize,
    fetches: usize,
    reorders: usize,
    failing_reorders: usize,
    last_authorization: Option<String>,
}

impl MockState {
    fn etag(&self) -> String {
        format!("\"{}\"", self.version)
    }

    fn record(&mut self, headers: &HeaderMap) {
        self.requests += 1;
        self.last_authorization = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
    }

    fn find_subcategory(&self, id: Uuid) -> Option<(usize, usize)> {
        self.tree.iter().enumerate().find_map(|(ci, c)| {
            c.subcategories
                .iter()
                .position(|s| s.id == id)
                .map(|si| (ci, si))
        })
    }
}

/// Admin categories API served by axum on an ephemeral local port
#[derive(Clone)]
pub struct MockAdminApi {
    base_url: String,
    state: Arc<Mutex<MockState>>,
}

pub async fn spawn_admin_api(tree: Vec<Category>) -> MockAdminApi {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");

    let api = MockAdminApi {
        base_url: format!("http://{addr}"),
        state: Arc::new(Mutex::new(MockState {
            tree,
            version: 1,
            ..Default::default()
        })),
    };

    let app = Router::new()
        .route(
            "/api/admin/categories",
            get(fetch_tree).post(create_category),
        )
        .route("/api/admin/categories/reorder", put(reorder))
        .route(
            "/api/admin/categories/{id}",
            put(update_category).delete(deactivate_category),
        )
        .route("/api/admin/categories/subcategory", post(create_subcategory))
        .route(
            "/api/admin/categories/subcategory/{id}",
            put(update_subcategory).delete(deactivate_subcategory),
        )
        .with_state(api.clone());

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    api
}

impl MockAdminApi {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn config(&self) -> AdminApiConfig {
        AdminApiConfig::new(self.base_url.clone(), None)
    }

    pub async fn tree(&self) -> Vec<Category> {
        self.state.lock().await.tree.clone()
    }

    /// Simulate another admin changing the tree (bumps the version)
    pub async fn replace_tree(&self, tree: Vec<Category>) {
        let mut state = self.state.lock().await;
        state.tree = tree;
        state.version += 1;
    }

    pub async fn fail_next_reorders(&self, count: usize) {
        self.state.lock().await.failing_reorders = count;
    }

    pub async fn request_count(&self) -> usize {
        self.state.lock().await.requests
    }

    pub async fn fetch_count(&self) -> usize {
        self.state.lock().await.fetches
    }

    pub async fn reorder_count(&self) -> usize {
        self.state.lock().await.reorders
    }

    pub async fn last_authorization(&self) -> Option<String> {
        self.state.lock().await.last_authorization.clone()
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ApiResponse::<()>::error(Some(message.to_string()), None)),
    )
        .into_response()
}

fn ack(message: &str) -> Response {
    Json(ApiResponse::<()>::success(None, Some(message.to_string()), None)).into_response()
}

async fn fetch_tree(State(api): State<MockAdminApi>, headers: HeaderMap) -> Response {
    let mut state = api.state.lock().await;
    state.record(&headers);
    state.fetches += 1;

    (
        [(ETAG, state.etag())],
        Json(ApiResponse::success(Some(state.tree.clone()), None, None)),
    )
        .into_response()
}

async fn reorder(
    State(api): State<MockAdminApi>,
    headers: HeaderMap,
    Json(body): Json<ReorderRequestDto>,
) -> Response {
    let mut state = api.state.lock().await;
    state.record(&headers);
    state.reorders += 1;

    if let Some(expected) = headers.get(IF_MATCH).and_then(|v| v.to_str().ok()) {
        if expected != state.etag() {
            return error_response(StatusCode::PRECONDITION_FAILED, "Category tree changed");
        }
    }

    if state.failing_reorders > 0 {
        state.failing_reorders -= 1;
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
    }

    state.tree = body.categories;
    state.version += 1;

    ([(ETAG, state.etag())], ack("Categories reordered")).into_response()
}

async fn create_category(
    State(api): State<MockAdminApi>,
    headers: HeaderMap,
    Json(dto): Json<CreateCategoryDto>,
) -> Response {
    let mut state = api.state.lock().await;
    state.record(&headers);

    let created = Category {
        id: Uuid::new_v4(),
        slug: dto.slug.unwrap_or_else(|| slugify(&dto.name)),
        name: dto.name,
        is_active: dto.is_active,
        subcategories: Vec::new(),
    };
    state.tree.push(created.clone());
    state.version += 1;

    // Bare body, unlike the other endpoints
    (StatusCode::CREATED, Json(created)).into_response()
}

async fn update_category(
    State(api): State<MockAdminApi>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(dto): Json<UpdateCategoryDto>,
) -> Response {
    let mut state = api.state.lock().await;
    state.record(&headers);

    let Some(category) = state.tree.iter_mut().find(|c| c.id == id) else {
        return error_response(StatusCode::NOT_FOUND, "Category not found");
    };
    if let Some(name) = dto.name {
        category.name = name;
    }
    if let Some(slug) = dto.slug {
        category.slug = slug;
    }
    if let Some(is_active) = dto.is_active {
        category.is_active = is_active;
    }
    let updated = category.clone();
    state.version += 1;

    Json(ApiResponse::success(Some(updated), None, None)).into_response()
}

async fn deactivate_category(
    State(api): State<MockAdminApi>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Response {
    let mut state = api.state.lock().await;
    state.record(&headers);

    let Some(category) = state.tree.iter_mut().find(|c| c.id == id) else {
        return error_response(StatusCode::NOT_FOUND, "Category not found");
    };
    category.is_active = false;
    state.version += 1;

    ack("Category deactivated")
}

async fn create_subcategory(
    State(api): State<MockAdminApi>,
    headers: HeaderMap,
    Json(dto): Json<CreateSubcategoryDto>,
) -> Response {
    let mut state = api.state.lock().await;
    state.record(&headers);

    let Some(category) = state.tree.iter_mut().find(|c| c.id == dto.category_id) else {
        return error_response(StatusCode::NOT_FOUND, "Category not found");
    };
    let created = Subcategory {
        id: Uuid::new_v4(),
        slug: dto.slug.unwrap_or_else(|| slugify(&dto.name)),
        name: dto.name,
        is_active: dto.is_active,
        category_id: category.id,
    };
    category.subcategories.push(created.clone());
    state.version += 1;

    (
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(created), None, None)),
    )
        .into_response()
}

async fn update_subcategory(
    State(api): State<MockAdminApi>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(dto): Json<UpdateSubcategoryDto>,
) -> Response {
    let mut state = api.state.lock().await;
    state.record(&headers);

    let Some((ci, si)) = state.find_subcategory(id) else {
        return error_response(StatusCode::NOT_FOUND, "Subcategory not found");
    };
    let mut subcategory = state.tree[ci].subcategories.remove(si);
    if let Some(name) = dto.name {
        subcategory.name = name;
    }
    if let Some(slug) = dto.slug {
        subcategory.slug = slug;
    }
    if let Some(is_active) = dto.is_active {
        subcategory.is_active = is_active;
    }

    let target = match dto.category_id {
        Some(category_id) if category_id != state.tree[ci].id => {
            match state.tree.iter().position(|c| c.id == category_id) {
                Some(target) => target,
                None => {
                    state.tree[ci].subcategories.insert(si, subcategory);
                    return error_response(StatusCode::NOT_FOUND, "Category not found");
                }
            }
        }
        _ => ci,
    };

    subcategory.category_id = state.tree[target].id;
    let updated = subcategory.clone();
    if target == ci {
        state.tree[ci].subcategories.insert(si, subcategory);
    } else {
        state.tree[target].subcategories.push(subcategory);
    }
    state.version += 1;

    Json(ApiResponse::success(Some(updated), None, None)).into_response()
}

async fn deactivate_subcategory(
    State(api): State<MockAdminApi>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Response {
    let mut state = api.state.lock().await;
    state.record(&headers);

    let Some((ci, si)) = state.find_subcategory(id) else {
        return error_response(StatusCode::NOT_FOUND, "Subcategory not found");
    };
    state.tree[ci].subcategories[si].is_active = false;
    state.version += 1;

    ack("Subcategory deactivated")
}

// =============================================================================
// GATED API
// =============================================================================

/// `AdminCategoryApi` whose reorder calls block until the test releases them
pub struct GatedApi {
    snapshot: TreeSnapshot,
    responses_tx: mpsc::UnboundedSender<Result<Option<TreeVersion>>>,
    responses_rx: Mutex<mpsc::UnboundedReceiver<Result<Option<TreeVersion>>>>,
    answered: Mutex<usize>,
    last_reorder: Mutex<Option<Vec<Category>>>,
}

impl GatedApi {
    pub fn new(snapshot: TreeSnapshot) -> Arc<Self> {
        let (responses_tx, responses_rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            snapshot,
            responses_tx,
            responses_rx: Mutex::new(responses_rx),
            answered: Mutex::new(0),
            last_reorder: Mutex::new(None),
        })
    }

    /// Answer the next (possibly future) reorder call
    pub fn release(&self, result: Result<Option<TreeVersion>>) {
        let _ = self.responses_tx.send(result);
    }

    pub async fn answered_reorders(&self) -> usize {
        *self.answered.lock().await
    }

    pub async fn last_reorder(&self) -> Option<Vec<Category>> {
        self.last_reorder.lock().await.clone()
    }
}

#[async_trait]
impl AdminCategoryApi for GatedApi {
    async fn fetch_tree(&self) -> Result<TreeSnapshot> {
        Ok(self.snapshot.clone())
    }

    async fn reorder(
        &self,
        categories: Vec<Category>,
        _version: Option<TreeVersion>,
    ) -> Result<Option<TreeVersion>> {
        *self.last_reorder.lock().await = Some(categories);
        let result = self
            .responses_rx
            .lock()
            .await
            .recv()
            .await
            .unwrap_or_else(|| Err(AppError::Internal("gate closed".to_string())));
        *self.answered.lock().await += 1;
        result
    }

    async fn create_category(&self, _dto: &CreateCategoryDto) -> Result<Category> {
        Err(AppError::Internal("not supported".to_string()))
    }

    async fn update_category(&self, _id: Uuid, _dto: &UpdateCategoryDto) -> Result<Category> {
        Err(AppError::Internal("not supported".to_string()))
    }

    async fn deactivate_category(&self, _id: Uuid) -> Result<()> {
        Err(AppError::Internal("not supported".to_string()))
    }

    async fn create_subcategory(&self, _dto: &CreateSubcategoryDto) -> Result<Subcategory> {
        Err(AppError::Internal("not supported".to_string()))
    }

    async fn update_subcategory(
        &self,
        _id: Uuid,
        _dto: &UpdateSubcategoryDto,
    ) -> Result<Subcategory> {
        Err(AppError::Internal("not supported".to_string()))
    }

    async fn deactivate_subcategory(&self, _id: Uuid) -> Result<()> {
        Err(AppError::Internal("not supported".to_string()))
    }
}
