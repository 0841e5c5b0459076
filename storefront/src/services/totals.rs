// storefront/src/services/totals.rs

//! Cart totals. Amounts are integer cents.

use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{CartLine, Product, Variation};

/// `total * basis_points / 10000`, rounded half up to the cent. `None` when
/// the product does not fit in an `i64`.
pub fn tax_for(total: i64, basis_points: u32) -> Option<i64> {
  total
    .checked_mul(i64::from(basis_points))?
    .checked_add(5_000)
    .map(|scaled| scaled.div_euclid(10_000))
}

fn too_large() -> AppError {
  AppError::Validation("Cart total exceeds the largest supported amount.".to_string())
}

#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
  pub id: Uuid,
  pub product: Product,
  pub variations: Vec<Variation>,
  pub quantity: i32,
  pub sub_total: i64,
}

impl CartLineView {
  fn new(line: CartLine, sub_total: i64) -> Self {
    Self {
      id: line.item.id,
      quantity: line.item.quantity,
      product: line.product,
      variations: line.variations,
      sub_total,
    }
  }
}

/// What the cart page shows. An absent cart is all zeros.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CartSummary {
  pub total: i64,
  pub quantity: i64,
  pub cart_items: Vec<CartLineView>,
  pub tax: i64,
  pub grand_total: i64,
}

impl CartSummary {
  pub fn empty() -> Self {
    Self::default()
  }

  /// Fails with a validation error when any amount overflows.
  pub fn from_lines(lines: Vec<CartLine>, tax_basis_points: u32) -> Result<Self, AppError> {
    let mut summary = Self::empty();
    for line in lines {
      let sub_total = line.sub_total().ok_or_else(too_large)?;
      summary.total = summary.total.checked_add(sub_total).ok_or_else(too_large)?;
      summary.quantity += i64::from(line.item.quantity);
      summary.cart_items.push(CartLineView::new(line, sub_total));
    }
    summary.tax = tax_for(summary.total, tax_basis_points).ok_or_else(too_large)?;
    summary.grand_total = summary.total.checked_add(summary.tax).ok_or_else(too_large)?;
    Ok(summary)
  }
}
