// storefront/src/models/product.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const PRODUCT_NAME_MAX: usize = 200;
pub const PRODUCT_DESCRIPTION_MAX: usize = 500;
/// Highest accepted unit price, in cents.
pub const PRODUCT_PRICE_MAX_CENTS: i64 = 100_000_000_000;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
  pub id: Uuid,
  pub category_id: Uuid,
  pub product_name: String,
  pub slug: String,
  pub description: String,
  pub price_cents: i64,
  /// Relative image path under the media root.
  pub images: String,
  pub stock: i32,
  pub is_available: bool,
  pub created_date: DateTime<Utc>,
  pub modified_date: DateTime<Utc>,
}

impl Product {
  /// Detail page URL; needs the owning category's slug.
  pub fn url(&self, category_slug: &str) -> String {
    format!("/store/category/{}/{}/", category_slug, self.slug)
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
  pub category_id: Uuid,
  pub product_name: String,
  pub slug: Option<String>,
  #[serde(default)]
  pub description: String,
  pub price_cents: i64,
  #[serde(default)]
  pub images: String,
  pub stock: i32,
  #[serde(default = "default_available")]
  pub is_available: bool,
}

fn default_available() -> bool {
  true
}

impl NewProduct {
  pub fn resolved_slug(&self) -> String {
    self
      .slug
      .clone()
      .filter(|s| !s.is_empty())
      .unwrap_or_else(|| super::slugify(&self.product_name))
  }

  pub fn validate(&self) -> Result<(), String> {
    let name = self.product_name.trim();
    if name.is_empty() || name.chars().count() > PRODUCT_NAME_MAX {
      return Err(format!("Product name must be 1 to {} characters.", PRODUCT_NAME_MAX));
    }
    if self.resolved_slug().is_empty() {
      return Err("Product slug cannot be empty.".to_string());
    }
    if self.description.chars().count() > PRODUCT_DESCRIPTION_MAX {
      return Err(format!(
        "Product description exceeds {} characters.",
        PRODUCT_DESCRIPTION_MAX
      ));
    }
    if !(0..=PRODUCT_PRICE_MAX_CENTS).contains(&self.price_cents) {
      return Err(format!(
        "Product price must be between 0 and {} cents.",
        PRODUCT_PRICE_MAX_CENTS
      ));
    }
    if self.stock < 0 {
      return Err("Product stock cannot be negative.".to_string());
    }
    Ok(())
  }
}

/// The kinds of variation a product can be offered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "variation_category_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VariationCategory {
  Color,
  Size,
}

impl VariationCategory {
  pub fn as_str(self) -> &'static str {
    match self {
      VariationCategory::Color => "color",
      VariationCategory::Size => "size",
    }
  }
}

impl fmt::Display for VariationCategory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for VariationCategory {
  type Err = String;

  /// Case-insensitive; surrounding whitespace is ignored.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "color" => Ok(VariationCategory::Color),
      "size" => Ok(VariationCategory::Size),
      other => Err(format!("unknown variation category '{}'", other)),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Variation {
  pub id: Uuid,
  pub product_id: Uuid,
  pub variation_category: VariationCategory,
  pub variation_value: String,
  pub is_active: bool,
  pub created_date: DateTime<Utc>,
}

impl Variation {
  /// Case-insensitive match on both category and value.
  pub fn matches(&self, category: VariationCategory, value: &str) -> bool {
    self.variation_category == category && self.variation_value.to_lowercase() == value.trim().to_lowercase()
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewVariation {
  pub product_id: Uuid,
  pub variation_category: VariationCategory,
  pub variation_value: String,
  #[serde(default = "default_available")]
  pub is_active: bool,
}

impl NewVariation {
  pub fn new(product_id: Uuid, variation_category: VariationCategory, variation_value: impl Into<String>) -> Self {
    Self {
      product_id,
      variation_category,
      variation_value: variation_value.into(),
      is_active: true,
    }
  }
}
