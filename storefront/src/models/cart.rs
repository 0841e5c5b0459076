// storefront/src/models/cart.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeSet;
use uuid::Uuid;

use super::product::{Product, Variation};

/// One cart per cart key.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Cart {
  pub id: Uuid,
  pub cart_key: String,
  pub date_added: NaiveDate,
}

/// A stored line item. Its variations live in a join table and are attached
/// when the item is loaded as a [`CartLine`].
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CartItem {
  pub id: Uuid,
  pub cart_id: Uuid,
  pub product_id: Uuid,
  /// Canonical form of the item's variation set, see [`VariationSet::key`].
  #[serde(skip_serializing)]
  pub variation_key: String,
  pub quantity: i32,
  pub is_active: bool,
  pub created_at: DateTime<Utc>,
}

/// The identity of a line's variation combination.
///
/// Two selections with the same variations compare equal whatever order the
/// caller listed them in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct VariationSet(BTreeSet<Uuid>);

impl VariationSet {
  pub fn from_variations<'a>(variations: impl IntoIterator<Item = &'a Variation>) -> Self {
    Self(variations.into_iter().map(|v| v.id).collect())
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn ids(&self) -> Vec<Uuid> {
    self.0.iter().copied().collect()
  }

  /// Sorted, comma-joined variation ids. The empty set has the empty key.
  pub fn key(&self) -> String {
    self.0.iter().map(Uuid::to_string).collect::<Vec<_>>().join(",")
  }
}

/// A cart item together with what it points at.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
  #[serde(flatten)]
  pub item: CartItem,
  pub product: Product,
  pub variations: Vec<Variation>,
}

impl CartLine {
  /// Price times quantity; `None` on overflow.
  pub fn sub_total(&self) -> Option<i64> {
    self.product.price_cents.checked_mul(i64::from(self.item.quantity))
  }
}
