// storefront/src/web/handlers/cart_handlers.rs

use actix_web::http::{header, StatusCode};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::pipelines::contexts::{AddToCartCtxData, CartSummaryCtxData, RemovalMode, RemoveFromCartCtxData};
use crate::pipelines::run_to_completion;
use crate::services::badge;
use crate::state::AppState;
use crate::store::LineDecrement;
use crate::web::CartSession;
use flow::ContextData;

/// Reads the category → value selection from a JSON object or a urlencoded
/// form. An empty body selects nothing.
fn parse_selections(req: &HttpRequest, body: &[u8]) -> Result<Vec<(String, String)>, AppError> {
  if body.iter().all(u8::is_ascii_whitespace) {
    return Ok(Vec::new());
  }
  let is_json = req
    .headers()
    .get(header::CONTENT_TYPE)
    .and_then(|v| v.to_str().ok())
    .map_or(false, |ct| ct.starts_with("application/json"));

  let map: HashMap<String, String> = if is_json {
    serde_json::from_slice(body)
      .map_err(|e| AppError::Validation(format!("Variation selection must be an object of strings: {}", e)))?
  } else {
    let raw = std::str::from_utf8(body).map_err(|e| AppError::Validation(format!("Invalid form body: {}", e)))?;
    web::Query::<HashMap<String, String>>::from_query(raw)
      .map_err(|e| AppError::Validation(format!("Invalid form body: {}", e)))?
      .into_inner()
  };
  Ok(map.into_iter().collect())
}

#[instrument(
    name = "handler::add_to_cart",
    skip(app_state, req, body, session),
    fields(product_id = %path.as_ref(), cart_key = %session.key)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  path: web::Path<Uuid>,
  body: web::Bytes,
  session: CartSession,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let selections = parse_selections(&req, &body)?;

  let ctx = ContextData::new(AddToCartCtxData::new(
    app_state.get_ref().clone(),
    session.key.clone(),
    product_id,
    selections,
  ));
  run_to_completion(&app_state.flows, ctx.clone()).await.map_err(|e| {
    warn!("Add to Cart pipeline failed for product {}: {:?}", product_id, e);
    e
  })?;

  let (item, created) = {
    let guard = ctx.read();
    let item = guard.updated_item.clone().ok_or_else(|| {
      AppError::Internal("Cart update completed, but item details are unavailable.".to_string())
    })?;
    (item, guard.line_created)
  };
  info!(cart_item_id = %item.id, quantity = item.quantity, created, "Item added to cart.");

  Ok(session.respond(StatusCode::OK).json(json!({
      "message": "Item added to cart successfully.",
      "cartItem": item,
      "created": created,
  })))
}

async fn run_removal(
  app_state: web::Data<AppState>,
  session: &CartSession,
  product_id: Uuid,
  cart_item_id: Uuid,
  mode: RemovalMode,
) -> Result<LineDecrement, AppError> {
  let ctx = ContextData::new(RemoveFromCartCtxData::new(
    app_state.get_ref().clone(),
    session.key.clone(),
    product_id,
    cart_item_id,
    mode,
  ));
  run_to_completion(&app_state.flows, ctx.clone()).await?;
  let outcome = ctx.read().outcome.clone();
  outcome.ok_or_else(|| AppError::Internal("Cart removal completed without an outcome.".to_string()))
}

#[instrument(name = "handler::decrement_cart_item", skip(app_state, session), fields(cart_key = %session.key))]
pub async fn decrement_cart_item_handler(
  app_state: web::Data<AppState>,
  path: web::Path<(Uuid, Uuid)>,
  session: CartSession,
) -> Result<HttpResponse, AppError> {
  let (product_id, cart_item_id) = path.into_inner();
  let body = match run_removal(app_state, &session, product_id, cart_item_id, RemovalMode::Decrement).await? {
    LineDecrement::Decremented(item) => json!({
        "message": "Cart item quantity reduced.",
        "cartItem": item,
        "removed": false,
    }),
    LineDecrement::Removed { item_id } => json!({
        "message": "Cart item removed.",
        "cartItemId": item_id,
        "removed": true,
    }),
  };
  Ok(session.respond(StatusCode::OK).json(body))
}

#[instrument(name = "handler::delete_cart_item", skip(app_state, session), fields(cart_key = %session.key))]
pub async fn delete_cart_item_handler(
  app_state: web::Data<AppState>,
  path: web::Path<(Uuid, Uuid)>,
  session: CartSession,
) -> Result<HttpResponse, AppError> {
  let (product_id, cart_item_id) = path.into_inner();
  run_removal(app_state, &session, product_id, cart_item_id, RemovalMode::Delete).await?;
  Ok(session.respond(StatusCode::OK).json(json!({
      "message": "Cart item removed.",
      "cartItemId": cart_item_id,
      "removed": true,
  })))
}

#[instrument(name = "handler::view_cart", skip(app_state, session), fields(cart_key = %session.key))]
pub async fn view_cart_handler(app_state: web::Data<AppState>, session: CartSession) -> Result<HttpResponse, AppError> {
  let ctx = ContextData::new(CartSummaryCtxData::new(app_state.get_ref().clone(), session.key.clone()));
  run_to_completion(&app_state.flows, ctx.clone()).await?;
  let summary = ctx.read().summary.clone();
  let summary = summary.ok_or_else(|| AppError::Internal("Cart summary was not computed.".to_string()))?;
  Ok(session.respond(StatusCode::OK).json(summary))
}

#[derive(Deserialize, Debug)]
pub struct BadgeQuery {
  /// Path of the page the badge is rendered on.
  #[serde(default)]
  pub page: String,
}

#[instrument(name = "handler::cart_badge", skip(app_state, session), fields(cart_key = %session.key))]
pub async fn cart_badge_handler(
  app_state: web::Data<AppState>,
  query: web::Query<BadgeQuery>,
  session: CartSession,
) -> Result<HttpResponse, AppError> {
  let cart_count = badge::cart_count(
    &*app_state.store,
    &session.key,
    &query.page,
    &app_state.config.admin_path_prefix,
  )
  .await?;
  Ok(session.respond(StatusCode::OK).json(json!({ "cart_count": cart_count })))
}
