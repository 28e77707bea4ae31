use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::categories::clients::AdminCategoryApi;
use crate::features::categories::dtos::{
    CreateCategoryDto, CreateSubcategoryDto, UpdateCategoryDto, UpdateSubcategoryDto,
};
use crate::features::categories::models::{Category, Subcategory, TreeSnapshot, TreeVersion};
use crate::features::categories::services::notifier::{Notification, Notifier};
use crate::features::categories::services::tree_store::SharedTreeStore;

/// Single entry point to the admin categories API.
///
/// Create, update and deactivate invalidate the tree store on success so the
/// next refresh refetches it. Reorder does not: the reconciler keeps its
/// optimistic tree.
pub struct MutationGateway {
    api: Arc<dyn AdminCategoryApi>,
    store: SharedTreeStore,
    notifier: Arc<dyn Notifier>,
}

impl MutationGateway {
    pub fn new(
        api: Arc<dyn AdminCategoryApi>,
        store: SharedTreeStore,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            api,
            store,
            notifier,
        }
    }

    pub fn store(&self) -> &SharedTreeStore {
        &self.store
    }

    pub async fn fetch_tree(&self) -> Result<TreeSnapshot> {
        self.api.fetch_tree().await
    }

    pub async fn reorder(
        &self,
        categories: Vec<Category>,
        version: Option<TreeVersion>,
    ) -> Result<Option<TreeVersion>> {
        self.api.reorder(categories, version).await
    }

    /// Refetch the tree if it was never loaded or a mutation invalidated it
    pub async fn ensure_fresh(&self) -> Result<()> {
        {
            let store = self.store.read().await;
            if store.is_loaded() && !store.is_stale() {
                return Ok(());
            }
        }

        let snapshot = self.api.fetch_tree().await?;
        tracing::debug!("Loaded {} categories", snapshot.categories.len());
        self.store.write().await.load(snapshot);
        Ok(())
    }

    pub async fn create_category(&self, mut dto: CreateCategoryDto) -> Result<Category> {
        let result = async {
            dto.ensure_slug()?;
            validate(&dto)?;
            self.api.create_category(&dto).await
        }
        .await;
        self.settle(result, |c| format!("Category \"{}\" created", c.name))
            .await
    }

    pub async fn update_category(&self, id: Uuid, dto: UpdateCategoryDto) -> Result<Category> {
        let result = async {
            validate(&dto)?;
            self.api.update_category(id, &dto).await
        }
        .await;
        self.settle(result, |c| format!("Category \"{}\" updated", c.name))
            .await
    }

    /// Soft-delete: the category stays in place, marked inactive
    pub async fn deactivate_category(&self, id: Uuid) -> Result<()> {
        let result = self.api.deactivate_category(id).await;
        self.settle(result, |_| "Category deactivated".to_string())
            .await
    }

    pub async fn create_subcategory(&self, mut dto: CreateSubcategoryDto) -> Result<Subcategory> {
        let result = async {
            dto.ensure_slug()?;
            validate(&dto)?;
            self.api.create_subcategory(&dto).await
        }
        .await;
        self.settle(result, |s| format!("Subcategory \"{}\" created", s.name))
            .await
    }

    pub async fn update_subcategory(
        &self,
        id: Uuid,
        dto: UpdateSubcategoryDto,
    ) -> Result<Subcategory> {
        let result = async {
            validate(&dto)?;
            self.api.update_subcategory(id, &dto).await
        }
        .await;
        self.settle(result, |s| format!("Subcategory \"{}\" updated", s.name))
            .await
    }

    pub async fn deactivate_subcategory(&self, id: Uuid) -> Result<()> {
        let result = self.api.deactivate_subcategory(id).await;
        self.settle(result, |_| "Subcategory deactivated".to_string())
            .await
    }

    /// Invalidate on success and report the outcome either way
    async fn settle<T>(&self, result: Result<T>, describe: impl FnOnce(&T) -> String) -> Result<T> {
        match result {
            Ok(value) => {
                self.store.write().await.invalidate();
                self.notifier.notify(Notification::success(describe(&value)));
                Ok(value)
            }
            Err(e) => {
                tracing::warn!("Category mutation failed: {}", e);
                self.notifier.notify(Notification::failure(e.user_message()));
                Err(e)
            }
        }
    }
}

fn validate<T: Validate>(dto: &T) -> Result<()> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))
}
