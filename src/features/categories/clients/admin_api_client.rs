use async_trait::async_trait;
use reqwest::header::{ETAG, IF_MATCH};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::core::config::AdminApiConfig;
use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::{
    CreateCategoryDto, CreateSubcategoryDto, ReorderRequestDto, UpdateCategoryDto,
    UpdateSubcategoryDto,
};
use crate::features::categories::models::{Category, Subcategory, TreeSnapshot, TreeVersion};
use crate::shared::constants::{CATEGORIES_PATH, REORDER_PATH, SUBCATEGORIES_PATH};
use crate::shared::types::Payload;

/// Admin categories HTTP API
#[async_trait]
pub trait AdminCategoryApi: Send + Sync {
    /// Full ordered tree and the version it was served at
    async fn fetch_tree(&self) -> Result<TreeSnapshot>;

    /// Persist a complete ordering; all-or-nothing.
    ///
    /// Returns `StaleVersion` when `version` no longer matches the server tree.
    async fn reorder(
        &self,
        categories: Vec<Category>,
        version: Option<TreeVersion>,
    ) -> Result<Option<TreeVersion>>;

    async fn create_category(&self, dto: &CreateCategoryDto) -> Result<Category>;

    async fn update_category(&self, id: Uuid, dto: &UpdateCategoryDto) -> Result<Category>;

    async fn deactivate_category(&self, id: Uuid) -> Result<()>;

    async fn create_subcategory(&self, dto: &CreateSubcategoryDto) -> Result<Subcategory>;

    async fn update_subcategory(&self, id: Uuid, dto: &UpdateSubcategoryDto)
        -> Result<Subcategory>;

    async fn deactivate_subcategory(&self, id: Uuid) -> Result<()>;
}

/// reqwest-backed client for the admin categories API
pub struct AdminApiClient {
    config: AdminApiConfig,
    http_client: reqwest::Client,
}

impl AdminApiClient {
    pub fn new(config: AdminApiConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http_client.request(method, self.config.url(path));
        match &self.config.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and turn non-2xx responses into `AppError`
    async fn send(&self, builder: RequestBuilder, action: &str) -> Result<Response> {
        let response = builder.send().await.map_err(|e| {
            tracing::error!("Failed to {}: {}", action, e);
            AppError::ExternalServiceError(format!("Failed to {}: {}", action, e))
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::error!("Admin API error on {}: HTTP {} - {}", action, status, body);
        Err(AppError::from_response(status, &body))
    }

    async fn parse<T: DeserializeOwned>(response: Response, action: &str) -> Result<T> {
        let payload = response.json::<Payload<T>>().await.map_err(|e| {
            tracing::error!("Failed to parse response to {}: {}", action, e);
            AppError::ExternalServiceError(format!("Failed to parse response: {}", e))
        })?;

        payload.into_data().ok_or_else(|| {
            AppError::ExternalServiceError(format!("Empty response to {}", action))
        })
    }
}

fn version_of(response: &Response) -> Option<TreeVersion> {
    response
        .headers()
        .get(ETAG)
        .and_then(|value| value.to_str().ok())
        .map(|value| TreeVersion(value.to_string()))
}

fn category_path(id: Uuid) -> String {
    format!("{}/{}", CATEGORIES_PATH, id)
}

fn subcategory_path(id: Uuid) -> String {
    format!("{}/{}", SUBCATEGORIES_PATH, id)
}

#[async_trait]
impl AdminCategoryApi for AdminApiClient {
    async fn fetch_tree(&self) -> Result<TreeSnapshot> {
        tracing::debug!("Fetching category tree from {}", self.base_url());

        let response = self
            .send(self.request(Method::GET, CATEGORIES_PATH), "fetch categories")
            .await?;
        let version = version_of(&response);
        let categories: Vec<Category> = Self::parse(response, "fetch categories").await?;

        tracing::debug!(
            "Fetched {} categories (version: {:?})",
            categories.len(),
            version
        );
        Ok(TreeSnapshot::new(categories, version))
    }

    async fn reorder(
        &self,
        categories: Vec<Category>,
        version: Option<TreeVersion>,
    ) -> Result<Option<TreeVersion>> {
        let mut builder = self
            .request(Method::PUT, REORDER_PATH)
            .json(&ReorderRequestDto { categories });
        if let Some(version) = &version {
            builder = builder.header(IF_MATCH, version.as_str());
        }

        tracing::debug!("Submitting category reorder (if-match: {:?})", version);

        let response = match self.send(builder, "reorder categories").await {
            Ok(response) => response,
            Err(AppError::Conflict(msg)) => return Err(AppError::StaleVersion(msg)),
            Err(e) => return Err(e),
        };

        Ok(version_of(&response))
    }

    async fn create_category(&self, dto: &CreateCategoryDto) -> Result<Category> {
        let response = self
            .send(
                self.request(Method::POST, CATEGORIES_PATH).json(dto),
                "create category",
            )
            .await?;
        let category: Category = Self::parse(response, "create category").await?;

        tracing::info!("Created category {} ({})", category.id, category.slug);
        Ok(category)
    }

    async fn update_category(&self, id: Uuid, dto: &UpdateCategoryDto) -> Result<Category> {
        let response = self
            .send(
                self.request(Method::PUT, &category_path(id)).json(dto),
                "update category",
            )
            .await?;
        let category: Category = Self::parse(response, "update category").await?;

        tracing::info!("Updated category {}", id);
        Ok(category)
    }

    async fn deactivate_category(&self, id: Uuid) -> Result<()> {
        self.send(
            self.request(Method::DELETE, &category_path(id)),
            "deactivate category",
        )
        .await?;

        tracing::info!("Deactivated category {}", id);
        Ok(())
    }

    async fn create_subcategory(&self, dto: &CreateSubcategoryDto) -> Result<Subcategory> {
        let response = self
            .send(
                self.request(Method::POST, SUBCATEGORIES_PATH).json(dto),
                "create subcategory",
            )
            .await?;
        let subcategory: Subcategory = Self::parse(response, "create subcategory").await?;

        tracing::info!(
            "Created subcategory {} under category {}",
            subcategory.id,
            subcategory.category_id
        );
        Ok(subcategory)
    }

    async fn update_subcategory(
        &self,
        id: Uuid,
        dto: &UpdateSubcategoryDto,
    ) -> Result<Subcategory> {
        let response = self
            .send(
                self.request(Method::PUT, &subcategory_path(id)).json(dto),
                "update subcategory",
            )
            .await?;
        let subcategory: Subcategory = Self::parse(response, "update subcategory").await?;

        tracing::info!("Updated subcategory {}", id);
        Ok(subcategory)
    }

    async fn deactivate_subcategory(&self, id: Uuid) -> Result<()> {
        self.send(
            self.request(Method::DELETE, &subcategory_path(id)),
            "deactivate subcategory",
        )
        .await?;

        tracing::info!("Deactivated subcategory {}", id);
        Ok(())
    }
}
