// storefront/src/models/category.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const CATEGORY_NAME_MAX: usize = 50;
pub const CATEGORY_SLUG_MAX: usize = 100;
pub const CATEGORY_DESCRIPTION_MAX: usize = 255;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
  pub id: Uuid,
  pub category_name: String,
  pub slug: String,
  pub description: String,
  /// Relative path under the media root, e.g. `photos/categories/shirts.jpg`.
  pub cat_image: Option<String>,
}

impl Category {
  /// Listing page for products in this category.
  pub fn url(&self) -> String {
    format!("/store/category/{}/", self.slug)
  }
}

/// Input for creating a category.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
  pub category_name: String,
  /// Derived from the name when absent.
  pub slug: Option<String>,
  #[serde(default)]
  pub description: String,
  pub cat_image: Option<String>,
}

impl NewCategory {
  pub fn named(category_name: impl Into<String>) -> Self {
    Self {
      category_name: category_name.into(),
      slug: None,
      description: String::new(),
      cat_image: None,
    }
  }

  pub fn resolved_slug(&self) -> String {
    self
      .slug
      .clone()
      .filter(|s| !s.is_empty())
      .unwrap_or_else(|| super::slugify(&self.category_name))
  }

  /// Field length and presence checks, mirroring the column limits.
  pub fn validate(&self) -> Result<(), String> {
    let name = self.category_name.trim();
    if name.is_empty() {
      return Err("Category name is required.".to_string());
    }
    if name.chars().count() > CATEGORY_NAME_MAX {
      return Err(format!("Category name exceeds {} characters.", CATEGORY_NAME_MAX));
    }
    let slug = self.resolved_slug();
    if slug.is_empty() || slug.chars().count() > CATEGORY_SLUG_MAX {
      return Err(format!("Category slug must be 1 to {} characters.", CATEGORY_SLUG_MAX));
    }
    if self.description.chars().count() > CATEGORY_DESCRIPTION_MAX {
      return Err(format!(
        "Category description exceeds {} characters.",
        CATEGORY_DESCRIPTION_MAX
      ));
    }
    Ok(())
  }
}
