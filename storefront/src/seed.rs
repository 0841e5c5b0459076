// storefront/src/seed.rs

//! Demo catalog and optional admin account for fresh databases.

use crate::errors::{AppError, Result};
use crate::models::{NewCategory, NewProduct, NewVariation, VariationCategory};
use crate::pipelines::{self, contexts::CreateAccountCtxData};
use crate::services::accounts::{normalize_email, AccountRequest};
use crate::state::AppState;
use crate::store::{AccountStore, CatalogStore, StoreError};
use flow::ContextData;
use tracing::{info, instrument};

struct DemoProduct {
  name: &'static str,
  description: &'static str,
  price_cents: i64,
  stock: i32,
  colors: &'static [&'static str],
  sizes: &'static [&'static str],
}

const DEMO_CATEGORY: &str = "Shirts";

const DEMO_PRODUCTS: &[DemoProduct] = &[
  DemoProduct {
    name: "Classic Oxford Shirt",
    description: "Button-down oxford in brushed cotton.",
    price_cents: 4_500,
    stock: 25,
    colors: &["White", "Blue"],
    sizes: &["Small", "Medium", "Large"],
  },
  DemoProduct {
    name: "Linen Camp Shirt",
    description: "Short-sleeve camp collar shirt.",
    price_cents: 3_900,
    stock: 12,
    colors: &["Sand", "Olive"],
    sizes: &["Medium", "Large"],
  },
];

/// Inserts the demo catalog unless its category already exists.
#[instrument(name = "seed::catalog", skip_all)]
pub async fn seed_catalog(state: &AppState) -> Result<()> {
  let store = &state.store;
  let demo = NewCategory::named(DEMO_CATEGORY);
  match store.category_by_slug(&demo.resolved_slug()).await {
    Ok(_) => {
      info!("Demo catalog already present; skipping.");
      return Ok(());
    }
    Err(StoreError::NotFound { .. }) => {}
    Err(e) => return Err(e.into()),
  }

  let category = store
    .insert_category(NewCategory {
      description: "Shirts for every day.".to_string(),
      ..demo
    })
    .await?;

  for demo in DEMO_PRODUCTS {
    let product = store
      .insert_product(NewProduct {
        category_id: category.id,
        product_name: demo.name.to_string(),
        slug: None,
        description: demo.description.to_string(),
        price_cents: demo.price_cents,
        images: String::new(),
        stock: demo.stock,
        is_available: true,
      })
      .await?;
    let choices = demo
      .colors
      .iter()
      .map(|c| (VariationCategory::Color, *c))
      .chain(demo.sizes.iter().map(|s| (VariationCategory::Size, *s)));
    for (category, value) in choices {
      store.insert_variation(NewVariation::new(product.id, category, value)).await?;
    }
  }

  info!(products = DEMO_PRODUCTS.len(), "Demo catalog seeded.");
  Ok(())
}

/// Creates the configured superuser once.
#[instrument(name = "seed::admin", skip_all)]
pub async fn seed_admin(state: &AppState) -> Result<()> {
  let (email, password) = match (&state.config.seed_admin_email, &state.config.seed_admin_password) {
    (Some(email), Some(password)) => (email.clone(), password.clone()),
    _ => return Ok(()),
  };

  if state.store.account_by_email(&normalize_email(&email)).await?.is_some() {
    info!("Seed admin account already exists; skipping.");
    return Ok(());
  }

  let username = email
    .split('@')
    .next()
    .filter(|u| !u.is_empty())
    .unwrap_or("admin")
    .to_string();
  let request = AccountRequest {
    first_name: "Store".to_string(),
    last_name: "Admin".to_string(),
    username,
    email,
    phone_number: String::new(),
    password: Some(password),
  };
  let ctx = ContextData::new(CreateAccountCtxData::new(state.clone(), request, true));
  pipelines::run_to_completion(&state.flows, ctx.clone()).await?;

  let created = ctx
    .read()
    .created
    .as_ref()
    .map(|a| a.id)
    .ok_or_else(|| AppError::Internal("Admin seeding completed without an account.".to_string()))?;
  info!(account_id = %created, "Seed admin account created.");
  Ok(())
}
