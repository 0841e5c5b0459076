// storefront/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use std::io;
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use storefront::seed;
use storefront::store::{MemoryStore, PgStore, Store};
use storefront::web::configure_app_routes;
use storefront::{AppConfig, AppError, AppState};

fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_span_events(FmtSpan::CLOSE); // Log when spans close, showing duration
  if std::env::var("LOG_FORMAT").map_or(false, |f| f.eq_ignore_ascii_case("json")) {
    builder.json().init();
  } else {
    builder.init();
  }
}

fn startup_error(err: AppError) -> io::Error {
  tracing::error!(error = %err, "Startup failed.");
  io::Error::new(io::ErrorKind::Other, err.to_string())
}

async fn open_store(config: &AppConfig) -> Result<Arc<dyn Store>, AppError> {
  let Some(database_url) = config.database_url.as_deref() else {
    tracing::warn!("DATABASE_URL is not set; carts and catalog live in memory only.");
    return Ok(Arc::new(MemoryStore::new()));
  };

  let pool = PgPoolOptions::new().max_connections(10).connect(database_url).await?;
  tracing::info!("Successfully connected to the database.");
  let store = PgStore::new(pool);
  if config.run_migrations {
    store.migrate().await?;
    tracing::info!("Database migrations applied.");
  }
  Ok(Arc::new(store))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
  init_tracing();
  tracing::info!("Starting storefront server...");

  let app_config = Arc::new(AppConfig::from_env().map_err(startup_error)?);
  let store = open_store(&app_config).await.map_err(startup_error)?;
  let app_state = AppState::new(store, app_config.clone());

  if app_config.seed_db {
    seed::seed_catalog(&app_state).await.map_err(startup_error)?;
  }
  seed::seed_admin(&app_state).await.map_err(startup_error)?;

  let server_address = app_config.bind_address();
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
