// storefront/src/web/routes.rs

use actix_web::web;

use crate::web::handlers::{account_handlers, cart_handlers, store_handlers};

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/store")
          .route("/categories", web::get().to(store_handlers::list_categories_handler))
          .route("/products", web::get().to(store_handlers::list_products_handler))
          .route("/products/{product_id}", web::get().to(store_handlers::get_product_handler))
          .route(
            "/category/{category_slug}/{product_slug}",
            web::get().to(store_handlers::product_by_slugs_handler),
          ),
      )
      .service(web::scope("/accounts").route("/register", web::post().to(account_handlers::register_handler)))
      .service(
        web::scope("/cart")
          .route("", web::get().to(cart_handlers::view_cart_handler))
          .route("/badge", web::get().to(cart_handlers::cart_badge_handler))
          .route("/add/{product_id}", web::post().to(cart_handlers::add_to_cart_handler))
          .route(
            "/decrement/{product_id}/{cart_item_id}",
            web::post().to(cart_handlers::decrement_cart_item_handler),
          )
          .route(
            "/items/{product_id}/{cart_item_id}",
            web::delete().to(cart_handlers::delete_cart_item_handler),
          ),
      ),
  );
}
