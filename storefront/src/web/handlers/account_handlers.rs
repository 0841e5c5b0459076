// storefront/src/web/handlers/account_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::pipelines::contexts::CreateAccountCtxData;
use crate::pipelines::run_to_completion;
use crate::services::accounts::AccountRequest;
use crate::state::AppState;
use flow::ContextData;

#[instrument(
    name = "handler::register_account",
    skip(app_state, req_payload),
    fields(req_username = %req_payload.username)
)]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<AccountRequest>,
) -> Result<HttpResponse, AppError> {
  let ctx = ContextData::new(CreateAccountCtxData::new(
    app_state.get_ref().clone(),
    req_payload.into_inner(),
    false,
  ));

  run_to_completion(&app_state.flows, ctx.clone()).await.map_err(|e| {
    warn!("Account registration failed: {:?}", e);
    e
  })?;

  let account = ctx.read().created.clone();
  let account =
    account.ok_or_else(|| AppError::Internal("Registration completed without creating an account.".to_string()))?;
  info!(account_id = %account.id, "Account registered.");

  Ok(HttpResponse::Created().json(json!({
      "message": "Account created successfully.",
      "account": account,
  })))
}
