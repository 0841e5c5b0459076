// storefront/src/web/handlers/store_handlers.rs

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Category, Product, Variation, VariationCategory};
use crate::state::AppState;
use crate::store::{CartStore, CatalogStore};
use crate::web::CartSession;

#[derive(Deserialize, Debug)]
pub struct ListProductsQuery {
  /// Category slug to filter by.
  pub category: Option<String>,
}

/// A product page: the product, its category and the active variations split
/// by kind.
#[derive(Serialize, Debug)]
pub struct ProductDetail {
  pub product: Product,
  pub category: Category,
  pub url: String,
  pub colors: Vec<Variation>,
  pub sizes: Vec<Variation>,
}

async fn product_detail(app_state: &AppState, product: Product) -> Result<ProductDetail, AppError> {
  let store = &app_state.store;
  let category = store.category(product.category_id).await?;
  let colors = store
    .active_variations(product.id, Some(VariationCategory::Color))
    .await?;
  let sizes = store.active_variations(product.id, Some(VariationCategory::Size)).await?;
  Ok(ProductDetail {
    url: product.url(&category.slug),
    product,
    category,
    colors,
    sizes,
  })
}

#[instrument(name = "handler::list_categories", skip(app_state))]
pub async fn list_categories_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let categories = app_state.store.list_categories().await?;
  let links: Vec<_> = categories
    .iter()
    .map(|c| json!({ "category": c, "url": c.url() }))
    .collect();
  Ok(HttpResponse::Ok().json(json!({ "categories": links })))
}

#[instrument(name = "handler::list_products", skip(app_state))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  query: web::Query<ListProductsQuery>,
) -> Result<HttpResponse, AppError> {
  let category = match query.category.as_deref().filter(|s| !s.is_empty()) {
    Some(slug) => Some(app_state.store.category_by_slug(slug).await?),
    None => None,
  };
  let products = app_state
    .store
    .list_available_products(category.as_ref().map(|c| c.id))
    .await?;
  info!(count = products.len(), "Products listed.");

  Ok(HttpResponse::Ok().json(json!({
      "category": category,
      "product_count": products.len(),
      "products": products,
  })))
}

#[instrument(name = "handler::get_product", skip(app_state), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let product = app_state.store.product(path.into_inner()).await?;
  let detail = product_detail(&app_state, product).await?;
  Ok(HttpResponse::Ok().json(detail))
}

/// Product page by slugs. Also reports whether the caller's cart already
/// holds the product.
#[instrument(name = "handler::product_by_slugs", skip(app_state, session))]
pub async fn product_by_slugs_handler(
  app_state: web::Data<AppState>,
  path: web::Path<(String, String)>,
  session: CartSession,
) -> Result<HttpResponse, AppError> {
  let (category_slug, product_slug) = path.into_inner();
  let product = app_state
    .store
    .product_by_slugs(&category_slug, &product_slug)
    .await?;

  let in_cart = match app_state.store.find_cart(session.key.as_str()).await? {
    Some(cart) => app_state
      .store
      .active_lines(cart.id)
      .await?
      .iter()
      .any(|line| line.item.product_id == product.id),
    None => false,
  };

  let detail = product_detail(&app_state, product).await?;
  Ok(session.respond(StatusCode::OK).json(json!({
      "detail": detail,
      "in_cart": in_cart,
  })))
}
