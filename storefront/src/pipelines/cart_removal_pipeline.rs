// storefront/src/pipelines/cart_removal_pipeline.rs

//! Decrement or delete a cart line. Every missing piece (cart, product,
//! line) fails the run with `AppError::NotFound`.

use crate::errors::AppError;
use crate::pipelines::contexts::{RemovalMode, RemoveFromCartCtxData};
use crate::state::AppState;
use crate::store::{CartStore, CatalogStore, LineDecrement};
use flow::{ContextData, Pipeline, PipelineControl, Registry};
use tracing::{info, instrument, warn};

pub fn register_cart_removal_pipeline(registry: &Registry<AppError>, _app_state: &AppState) {
  let mut p = Pipeline::<RemoveFromCartCtxData, AppError>::new(&["resolve_cart", "verify_product", "apply_removal"]);

  p.on("resolve_cart", resolve_cart);
  p.on("verify_product", verify_product);
  p.on("apply_removal", apply_removal);

  registry.register_pipeline(p);
  info!("Cart removal pipeline registered.");
}

#[instrument(name = "cart_removal::resolve_cart", skip_all)]
async fn resolve_cart(ctx_data: ContextData<RemoveFromCartCtxData>) -> Result<PipelineControl, AppError> {
  let (store, cart_key) = {
    let guard = ctx_data.read();
    (guard.app_state.store.clone(), guard.cart_key.clone())
  };

  let cart = store.find_cart(cart_key.as_str()).await?.ok_or_else(|| {
    warn!(%cart_key, "Cart Removal Pipeline: no cart for key.");
    AppError::NotFound("No cart exists for this session.".to_string())
  })?;

  ctx_data.write().cart = Some(cart);
  Ok(PipelineControl::Continue)
}

#[instrument(name = "cart_removal::verify_product", skip_all)]
async fn verify_product(ctx_data: ContextData<RemoveFromCartCtxData>) -> Result<PipelineControl, AppError> {
  let (store, product_id) = {
    let guard = ctx_data.read();
    (guard.app_state.store.clone(), guard.product_id)
  };

  store.product(product_id).await?;
  Ok(PipelineControl::Continue)
}

#[instrument(name = "cart_removal::apply", skip_all)]
async fn apply_removal(ctx_data: ContextData<RemoveFromCartCtxData>) -> Result<PipelineControl, AppError> {
  let (store, cart_id, product_id, item_id, mode) = {
    let guard = ctx_data.read();
    let cart_id = guard
      .cart
      .as_ref()
      .map(|c| c.id)
      .ok_or_else(|| AppError::Internal("Cart was not resolved before removal.".to_string()))?;
    (
      guard.app_state.store.clone(),
      cart_id,
      guard.product_id,
      guard.cart_item_id,
      guard.mode,
    )
  };

  let outcome = match mode {
    RemovalMode::Decrement => store.decrement_line(cart_id, product_id, item_id).await?,
    RemovalMode::Delete => {
      store.remove_line(cart_id, product_id, item_id).await?;
      LineDecrement::Removed { item_id }
    }
  };

  match &outcome {
    LineDecrement::Decremented(item) => {
      info!(cart_item_id = %item.id, quantity = item.quantity, "Cart Removal Pipeline: line decremented.")
    }
    LineDecrement::Removed { item_id } => info!(cart_item_id = %item_id, ?mode, "Cart Removal Pipeline: line removed."),
  }

  ctx_data.write().outcome = Some(outcome);
  Ok(PipelineControl::Continue)
}
