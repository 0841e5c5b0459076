// tests/postgres_store_tests.rs
//! Run against a live database with
//! `DATABASE_URL=postgres://... cargo test -p storefront -- --ignored`.
mod common;

use common::*;
use flow::ContextData;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use storefront::models::{CartItem, NewCategory, NewProduct, NewVariation, Product, VariationCategory};
use storefront::pipelines::contexts::{AddToCartCtxData, CartSummaryCtxData};
use storefront::pipelines::run_to_completion;
use storefront::services::identity::CartKey;
use storefront::store::{CartStore, CatalogStore, LineDecrement, PgStore, Store};
use storefront::{AppConfig, AppError, AppState};
use uuid::Uuid;

struct PgFixture {
  state: AppState,
  store: Arc<PgStore>,
  shirt: Product,
}

async fn pg_fixture() -> PgFixture {
  setup_tracing();
  let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must point at a test database");
  let pool = PgPoolOptions::new().max_connections(8).connect(&url).await.unwrap();
  let store = Arc::new(PgStore::new(pool));
  store.migrate().await.unwrap();

  // Fresh names per run; the catalog tables are shared across runs.
  let tag = &Uuid::new_v4().simple().to_string()[..12];
  let category = store
    .insert_category(NewCategory::named(format!("Shirts {}", tag)))
    .await
    .unwrap();
  let shirt = store
    .insert_product(NewProduct {
      category_id: category.id,
      product_name: format!("Shirt {}", tag),
      slug: None,
      description: String::new(),
      price_cents: 100,
      images: String::new(),
      stock: 10,
      is_available: true,
    })
    .await
    .unwrap();
  for (kind, value) in [
    (VariationCategory::Color, "Red"),
    (VariationCategory::Color, "Écru"),
    (VariationCategory::Size, "Small"),
  ] {
    store.insert_variation(NewVariation::new(shirt.id, kind, value)).await.unwrap();
  }

  let dyn_store: Arc<dyn Store> = store.clone();
  PgFixture {
    state: AppState::new(dyn_store, Arc::new(AppConfig::default())),
    store,
    shirt,
  }
}

async fn add(
  state: &AppState,
  key: &CartKey,
  product_id: Uuid,
  selections: Vec<(String, String)>,
) -> Result<(CartItem, bool), AppError> {
  let ctx = ContextData::new(AddToCartCtxData::new(state.clone(), key.clone(), product_id, selections));
  run_to_completion(&state.flows, ctx.clone()).await?;
  let guard = ctx.read();
  Ok((guard.updated_item.clone().unwrap(), guard.line_created))
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn upsert_merges_the_same_set_in_any_order() {
  let fx = pg_fixture().await;
  let key = CartKey::mint();

  let (first, created_first) = add(&fx.state, &key, fx.shirt.id, selection(&[("color", "red"), ("size", "small")]))
    .await
    .unwrap();
  let (second, created_second) = add(&fx.state, &key, fx.shirt.id, selection(&[("size", "SMALL"), ("color", "Red")]))
    .await
    .unwrap();
  let (other, created_other) = add(&fx.state, &key, fx.shirt.id, selection(&[("color", "écru")]))
    .await
    .unwrap();

  assert!(created_first);
  assert!(!created_second);
  assert!(created_other);
  assert_eq!(first.id, second.id);
  assert_eq!(second.quantity, 2);
  assert_ne!(other.id, first.id);

  let cart = fx.store.find_cart(key.as_str()).await.unwrap().unwrap();
  let lines = fx.store.active_lines(cart.id).await.unwrap();
  assert_eq!(lines.len(), 2);
  let merged = lines.iter().find(|l| l.item.id == first.id).unwrap();
  assert_eq!(merged.variations.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "needs DATABASE_URL"]
async fn concurrent_adds_land_on_one_row() {
  let fx = pg_fixture().await;
  let key = CartKey::mint();

  let mut tasks = Vec::new();
  for i in 0..16 {
    let state = fx.state.clone();
    let key = key.clone();
    let product_id = fx.shirt.id;
    let pairs = if i % 2 == 0 {
      selection(&[("color", "red"), ("size", "small")])
    } else {
      selection(&[("size", "small"), ("color", "red")])
    };
    tasks.push(tokio::spawn(async move { add(&state, &key, product_id, pairs).await }));
  }
  let mut created = 0;
  for task in tasks {
    if task.await.unwrap().unwrap().1 {
      created += 1;
    }
  }

  assert_eq!(created, 1);
  let cart = fx.store.find_cart(key.as_str()).await.unwrap().unwrap();
  assert_eq!(fx.store.active_quantity(cart.id).await.unwrap(), 16);
  assert_eq!(fx.store.active_lines(cart.id).await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn decrement_locks_and_removes_at_one() {
  let fx = pg_fixture().await;
  let key = CartKey::mint();
  add(&fx.state, &key, fx.shirt.id, vec![]).await.unwrap();
  let (item, _) = add(&fx.state, &key, fx.shirt.id, vec![]).await.unwrap();
  let cart = fx.store.find_cart(key.as_str()).await.unwrap().unwrap();

  match fx.store.decrement_line(cart.id, fx.shirt.id, item.id).await.unwrap() {
    LineDecrement::Decremented(left) => assert_eq!(left.quantity, 1),
    other => panic!("expected a decrement, got {:?}", other),
  }
  match fx.store.decrement_line(cart.id, fx.shirt.id, item.id).await.unwrap() {
    LineDecrement::Removed { item_id } => assert_eq!(item_id, item.id),
    other => panic!("expected removal, got {:?}", other),
  }
  assert!(fx
    .store
    .decrement_line(cart.id, fx.shirt.id, item.id)
    .await
    .unwrap_err()
    .is_not_found());
  assert!(fx
    .store
    .remove_line(cart.id, fx.shirt.id, item.id)
    .await
    .unwrap_err()
    .is_not_found());
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn summary_reads_back_lines_with_tax() {
  let fx = pg_fixture().await;
  let key = CartKey::mint();
  add(&fx.state, &key, fx.shirt.id, vec![]).await.unwrap();
  add(&fx.state, &key, fx.shirt.id, vec![]).await.unwrap();

  let ctx = ContextData::new(CartSummaryCtxData::new(fx.state.clone(), key.clone()));
  run_to_completion(&fx.state.flows, ctx.clone()).await.unwrap();
  let summary = ctx.read().summary.clone().unwrap();

  assert_eq!(summary.total, 200);
  assert_eq!(summary.quantity, 2);
  assert_eq!(summary.tax, 6);
  assert_eq!(summary.grand_total, 206);
}
