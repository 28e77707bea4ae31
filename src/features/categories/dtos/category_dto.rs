use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::categories::models::Category;
use crate::shared::validation::slugify;

fn default_true() -> bool {
    true
}

/// Fill an omitted slug from the name.
///
/// Names without latin letters or digits yield no slug, so one must be given.
fn derive_slug(slug: &mut Option<String>, name: &str) -> Result<()> {
    if slug.as_deref().map_or(false, |s| !s.trim().is_empty()) {
        return Ok(());
    }

    let derived = slugify(name);
    if derived.is_empty() {
        return Err(AppError::Validation(format!(
            "Cannot derive a slug from \"{}\", please enter one",
            name.trim()
        )));
    }
    *slug = Some(derived);
    Ok(())
}

/// Request DTO for creating a category
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryDto {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Derived from the name when omitted
    #[validate(
        length(min = 1, max = 120, message = "Slug must be 1-120 characters"),
        regex(
            path = "*crate::shared::validation::SLUG_REGEX",
            message = "Slug must be lowercase alphanumeric words separated by single hyphens"
        )
    )]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl CreateCategoryDto {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: None,
            is_active: true,
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// Fill in the slug from the name if it was left empty
    pub fn ensure_slug(&mut self) -> Result<()> {
        derive_slug(&mut self.slug, &self.name)
    }
}

/// Request DTO for updating a category (partial)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryDto {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[validate(
        length(min = 1, max = 120, message = "Slug must be 1-120 characters"),
        regex(
            path = "*crate::shared::validation::SLUG_REGEX",
            message = "Slug must be lowercase alphanumeric words separated by single hyphens"
        )
    )]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Request DTO for creating a subcategory
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubcategoryDto {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(
        length(min = 1, max = 120, message = "Slug must be 1-120 characters"),
        regex(
            path = "*crate::shared::validation::SLUG_REGEX",
            message = "Slug must be lowercase alphanumeric words separated by single hyphens"
        )
    )]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    pub category_id: Uuid,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl CreateSubcategoryDto {
    pub fn new(category_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: None,
            category_id,
            is_active: true,
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn ensure_slug(&mut self) -> Result<()> {
        derive_slug(&mut self.slug, &self.name)
    }
}

/// Request DTO for updating a subcategory (partial)
///
/// Setting `category_id` moves the subcategory to another category.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubcategoryDto {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[validate(
        length(min = 1, max = 120, message = "Slug must be 1-120 characters"),
        regex(
            path = "*crate::shared::validation::SLUG_REGEX",
            message = "Slug must be lowercase alphanumeric words separated by single hyphens"
        )
    )]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Body of the bulk reorder call: the whole tree in the desired order
#[derive(Debug, Serialize, Deserialize)]
pub struct ReorderRequestDto {
    pub categories: Vec<Category>,
}
