// tests/cart_removal_tests.rs
mod common;

use common::*;
use flow::ContextData;
use storefront::models::{CartItem, NewProduct};
use storefront::pipelines::contexts::{AddToCartCtxData, RemovalMode, RemoveFromCartCtxData};
use storefront::pipelines::run_to_completion;
use storefront::services::identity::CartKey;
use storefront::store::{CartStore, CatalogStore, LineDecrement};
use storefront::{AppError, AppState};
use uuid::Uuid;

async fn add(state: &AppState, key: &CartKey, product_id: Uuid, selections: Vec<(String, String)>) -> CartItem {
  let ctx = ContextData::new(AddToCartCtxData::new(state.clone(), key.clone(), product_id, selections));
  run_to_completion(&state.flows, ctx.clone()).await.unwrap();
  let item = ctx.read().updated_item.clone().unwrap();
  item
}

async fn remove(
  state: &AppState,
  key: &CartKey,
  product_id: Uuid,
  item_id: Uuid,
  mode: RemovalMode,
) -> Result<LineDecrement, AppError> {
  let ctx = ContextData::new(RemoveFromCartCtxData::new(
    state.clone(),
    key.clone(),
    product_id,
    item_id,
    mode,
  ));
  run_to_completion(&state.flows, ctx.clone()).await?;
  let outcome = ctx.read().outcome.clone().unwrap();
  Ok(outcome)
}

#[tokio::test]
async fn decrement_above_one_reduces_by_exactly_one() {
  let fx = fixture().await;
  let key = CartKey::mint();
  for _ in 0..3 {
    add(&fx.state, &key, fx.widget.id, vec![]).await;
  }
  let item = add(&fx.state, &key, fx.widget.id, vec![]).await;
  assert_eq!(item.quantity, 4);

  let outcome = remove(&fx.state, &key, fx.widget.id, item.id, RemovalMode::Decrement)
    .await
    .unwrap();

  match outcome {
    LineDecrement::Decremented(updated) => {
      assert_eq!(updated.id, item.id);
      assert_eq!(updated.quantity, 3);
    }
    other => panic!("expected a decrement, got {:?}", other),
  }
}

#[tokio::test]
async fn decrement_at_one_removes_the_line() {
  let fx = fixture().await;
  let key = CartKey::mint();
  let item = add(&fx.state, &key, fx.widget.id, selection(&[("color", "red")])).await;
  assert_eq!(item.quantity, 1);

  let outcome = remove(&fx.state, &key, fx.widget.id, item.id, RemovalMode::Decrement)
    .await
    .unwrap();

  assert!(matches!(outcome, LineDecrement::Removed { item_id } if item_id == item.id));
  assert_eq!(fx.memory.line_count(), 0);
  let cart = fx.memory.find_cart(key.as_str()).await.unwrap().unwrap();
  assert_eq!(fx.memory.active_quantity(cart.id).await.unwrap(), 0);
}

#[tokio::test]
async fn delete_drops_the_line_whatever_the_quantity() {
  let fx = fixture().await;
  let key = CartKey::mint();
  add(&fx.state, &key, fx.widget.id, vec![]).await;
  let item = add(&fx.state, &key, fx.widget.id, vec![]).await;
  let other = add(&fx.state, &key, fx.widget.id, selection(&[("size", "small")])).await;

  remove(&fx.state, &key, fx.widget.id, item.id, RemovalMode::Delete)
    .await
    .unwrap();

  let cart = fx.memory.find_cart(key.as_str()).await.unwrap().unwrap();
  let lines = fx.memory.active_lines(cart.id).await.unwrap();
  assert_eq!(lines.len(), 1);
  assert_eq!(lines[0].item.id, other.id);
}

#[tokio::test]
async fn missing_line_is_not_found_for_both_modes() {
  let fx = fixture().await;
  let key = CartKey::mint();
  add(&fx.state, &key, fx.widget.id, vec![]).await;

  for mode in [RemovalMode::Decrement, RemovalMode::Delete] {
    let err = remove(&fx.state, &key, fx.widget.id, Uuid::new_v4(), mode)
      .await
      .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "{:?}: {:?}", mode, err);
  }
}

#[tokio::test]
async fn missing_cart_is_not_found() {
  let fx = fixture().await;
  let key = CartKey::mint();

  let err = remove(&fx.state, &key, fx.widget.id, Uuid::new_v4(), RemovalMode::Decrement)
    .await
    .unwrap_err();

  assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn missing_product_is_not_found() {
  let fx = fixture().await;
  let key = CartKey::mint();
  let item = add(&fx.state, &key, fx.widget.id, vec![]).await;

  let err = remove(&fx.state, &key, Uuid::new_v4(), item.id, RemovalMode::Delete)
    .await
    .unwrap_err();

  assert!(matches!(err, AppError::NotFound(_)));
  assert_eq!(fx.memory.line_count(), 1);
}

#[tokio::test]
async fn line_must_match_product_and_cart() {
  let fx = fixture().await;
  let owner = CartKey::mint();
  let stranger = CartKey::mint();
  let item = add(&fx.state, &owner, fx.widget.id, vec![]).await;
  add(&fx.state, &stranger, fx.widget.id, vec![]).await;

  let gadget = fx
    .memory
    .insert_product(NewProduct {
      category_id: fx.widget.category_id,
      product_name: "Gizmo".to_string(),
      slug: None,
      description: String::new(),
      price_cents: 250,
      images: String::new(),
      stock: 3,
      is_available: true,
    })
    .await
    .unwrap();

  let wrong_product = remove(&fx.state, &owner, gadget.id, item.id, RemovalMode::Delete)
    .await
    .unwrap_err();
  let wrong_cart = remove(&fx.state, &stranger, fx.widget.id, item.id, RemovalMode::Delete)
    .await
    .unwrap_err();

  assert!(matches!(wrong_product, AppError::NotFound(_)));
  assert!(matches!(wrong_cart, AppError::NotFound(_)));
  assert_eq!(fx.memory.line_count(), 2);
}
