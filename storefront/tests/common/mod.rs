// tests/common/mod.rs
#![allow(dead_code)]

use once_cell::sync::Lazy;
use std::sync::Arc;
use storefront::models::{NewCategory, NewProduct, NewVariation, Product, Variation, VariationCategory};
use storefront::store::{CatalogStore, MemoryStore, Store};
use storefront::{AppConfig, AppState};
use tracing::Level;

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

/// An app over a fresh in-memory store, plus a "Widget" priced at 100 cents
/// in red/blue and small/large.
pub struct Fixture {
  pub state: AppState,
  pub memory: Arc<MemoryStore>,
  pub widget: Product,
  pub red: Variation,
  pub blue: Variation,
  pub small: Variation,
  pub large: Variation,
}

pub fn test_state(config: AppConfig) -> (AppState, Arc<MemoryStore>) {
  let memory = Arc::new(MemoryStore::new());
  let store: Arc<dyn Store> = memory.clone();
  (AppState::new(store, Arc::new(config)), memory)
}

pub async fn fixture() -> Fixture {
  fixture_with(AppConfig::default()).await
}

pub async fn fixture_with(config: AppConfig) -> Fixture {
  setup_tracing();
  let (state, memory) = test_state(config);

  let category = memory.insert_category(NewCategory::named("Gadgets")).await.unwrap();
  let widget = memory
    .insert_product(NewProduct {
      category_id: category.id,
      product_name: "Widget".to_string(),
      slug: None,
      description: "A widget.".to_string(),
      price_cents: 100,
      images: String::new(),
      stock: 10,
      is_available: true,
    })
    .await
    .unwrap();

  let variation = |category, value: &str| NewVariation::new(widget.id, category, value);
  let red = memory.insert_variation(variation(VariationCategory::Color, "red")).await.unwrap();
  let blue = memory.insert_variation(variation(VariationCategory::Color, "blue")).await.unwrap();
  let small = memory.insert_variation(variation(VariationCategory::Size, "small")).await.unwrap();
  let large = memory.insert_variation(variation(VariationCategory::Size, "large")).await.unwrap();

  Fixture {
    state,
    memory,
    widget,
    red,
    blue,
    small,
    large,
  }
}

pub fn selection(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
  pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}
