// storefront/src/pipelines/cart_summary_pipeline.rs

//! Totals for the cart page. A key without a cart yields an all-zero summary.

use crate::errors::AppError;
use crate::pipelines::contexts::CartSummaryCtxData;
use crate::services::totals::CartSummary;
use crate::state::AppState;
use crate::store::CartStore;
use flow::{ContextData, Pipeline, PipelineControl, Registry, StepDef};
use tracing::{debug, info, instrument};

pub fn register_cart_summary_pipeline(registry: &Registry<AppError>, _app_state: &AppState) {
  let mut p = Pipeline::<CartSummaryCtxData, AppError>::from_steps(vec![
    StepDef::new("find_cart"),
    StepDef::new("load_active_lines").skip_if(|d: &CartSummaryCtxData| d.cart.is_none()),
    StepDef::new("compute_totals"),
  ]);

  p.on("find_cart", find_cart);
  p.on("load_active_lines", load_active_lines);
  p.on("compute_totals", compute_totals);

  registry.register_pipeline(p);
  info!("Cart summary pipeline registered.");
}

#[instrument(name = "cart_summary::find_cart", skip_all)]
async fn find_cart(ctx_data: ContextData<CartSummaryCtxData>) -> Result<PipelineControl, AppError> {
  let (store, cart_key) = {
    let guard = ctx_data.read();
    (guard.app_state.store.clone(), guard.cart_key.clone())
  };

  let cart = store.find_cart(cart_key.as_str()).await?;
  if cart.is_none() {
    debug!(%cart_key, "Cart Summary Pipeline: no cart yet.");
  }
  ctx_data.write().cart = cart;
  Ok(PipelineControl::Continue)
}

#[instrument(name = "cart_summary::load_active_lines", skip_all)]
async fn load_active_lines(ctx_data: ContextData<CartSummaryCtxData>) -> Result<PipelineControl, AppError> {
  let (store, cart_id) = {
    let guard = ctx_data.read();
    let cart_id = guard
      .cart
      .as_ref()
      .map(|c| c.id)
      .ok_or_else(|| AppError::Internal("Cart lines requested without a cart.".to_string()))?;
    (guard.app_state.store.clone(), cart_id)
  };

  let lines = store.active_lines(cart_id).await?;
  ctx_data.write().lines = lines;
  Ok(PipelineControl::Continue)
}

async fn compute_totals(ctx_data: ContextData<CartSummaryCtxData>) -> Result<PipelineControl, AppError> {
  let mut guard = ctx_data.write();
  let lines = std::mem::take(&mut guard.lines);
  let summary = CartSummary::from_lines(lines, guard.app_state.config.tax_basis_points)?;
  debug!(
    total = summary.total,
    tax = summary.tax,
    grand_total = summary.grand_total,
    "Cart Summary Pipeline: totals computed."
  );
  guard.summary = Some(summary);
  Ok(PipelineControl::Continue)
}
