// storefront/src/pipelines/cart_pipeline.rs

//! Add one unit of a product, with the chosen variations, to a cart.

use crate::errors::AppError;
use crate::models::{VariationCategory, VariationSet};
use crate::pipelines::contexts::AddToCartCtxData;
use crate::state::AppState;
use crate::store::{CartStore, CatalogStore};
use flow::{ContextData, Pipeline, PipelineControl, Registry, StepDef};
use tracing::{debug, info, instrument, warn};

pub fn register_add_to_cart_pipeline(registry: &Registry<AppError>, _app_state: &AppState) {
  let mut p = Pipeline::<AddToCartCtxData, AppError>::from_steps(vec![
    StepDef::new("fetch_product_for_cart"),
    StepDef::new("resolve_variations").skip_if(|d: &AddToCartCtxData| d.selections.is_empty()),
    StepDef::new("load_or_create_cart"),
    StepDef::new("merge_or_create_cart_item"),
  ]);

  p.on("fetch_product_for_cart", fetch_product_for_cart);
  p.on("resolve_variations", resolve_variations);
  p.on("load_or_create_cart", load_or_create_cart);
  p.on("merge_or_create_cart_item", merge_or_create_cart_item);

  registry.register_pipeline(p);
  info!("Add to Cart pipeline registered.");
}

#[instrument(name = "add_to_cart::fetch_product", skip_all)]
async fn fetch_product_for_cart(ctx_data: ContextData<AddToCartCtxData>) -> Result<PipelineControl, AppError> {
  let (store, product_id) = {
    let guard = ctx_data.read();
    (guard.app_state.store.clone(), guard.product_id)
  };

  let product = store.product(product_id).await.map_err(|e| {
    warn!(%product_id, error = %e, "Add to Cart Pipeline: product lookup failed.");
    AppError::from(e)
  })?;
  debug!(%product_id, price_cents = product.price_cents, "Add to Cart Pipeline: product found.");

  ctx_data.write().product = Some(product);
  Ok(PipelineControl::Continue)
}

/// Maps each (category, value) pair to an active variation of the product.
/// Pairs that name no such variation are dropped.
#[instrument(name = "add_to_cart::resolve_variations", skip_all)]
async fn resolve_variations(ctx_data: ContextData<AddToCartCtxData>) -> Result<PipelineControl, AppError> {
  let (store, product_id, selections) = {
    let guard = ctx_data.read();
    (guard.app_state.store.clone(), guard.product_id, guard.selections.clone())
  };

  let mut resolved = Vec::with_capacity(selections.len());
  for (raw_category, value) in &selections {
    let category = match raw_category.parse::<VariationCategory>() {
      Ok(category) => category,
      Err(_) => {
        debug!(key = %raw_category, "Ignoring selection with unknown variation category.");
        continue;
      }
    };
    match store.find_active_variation(product_id, category, value).await? {
      Some(variation) => resolved.push(variation),
      None => debug!(%category, %value, "Ignoring selection without an active variation."),
    }
  }

  debug!(
    requested = selections.len(),
    resolved = resolved.len(),
    "Add to Cart Pipeline: variations resolved."
  );
  ctx_data.write().variations = resolved;
  Ok(PipelineControl::Continue)
}

#[instrument(name = "add_to_cart::load_or_create_cart", skip_all)]
async fn load_or_create_cart(ctx_data: ContextData<AddToCartCtxData>) -> Result<PipelineControl, AppError> {
  let (store, cart_key) = {
    let guard = ctx_data.read();
    (guard.app_state.store.clone(), guard.cart_key.clone())
  };

  let cart = store.get_or_create_cart(cart_key.as_str()).await?;
  ctx_data.write().cart = Some(cart);
  Ok(PipelineControl::Continue)
}

#[instrument(name = "add_to_cart::merge_or_create_item", skip_all)]
async fn merge_or_create_cart_item(ctx_data: ContextData<AddToCartCtxData>) -> Result<PipelineControl, AppError> {
  let (store, cart_id, product_id, variation_set) = {
    let guard = ctx_data.read();
    let cart_id = guard
      .cart
      .as_ref()
      .map(|c| c.id)
      .ok_or_else(|| AppError::Internal("Cart was not loaded before merging the item.".to_string()))?;
    (
      guard.app_state.store.clone(),
      cart_id,
      guard.product_id,
      VariationSet::from_variations(&guard.variations),
    )
  };

  let upsert = store.add_line(cart_id, product_id, &variation_set).await?;
  info!(
    cart_item_id = %upsert.item.id,
    quantity = upsert.item.quantity,
    created = upsert.created,
    "Add to Cart Pipeline: cart line updated."
  );

  let mut guard = ctx_data.write();
  guard.updated_item = Some(upsert.item);
  guard.line_created = upsert.created;
  Ok(PipelineControl::Continue)
}
