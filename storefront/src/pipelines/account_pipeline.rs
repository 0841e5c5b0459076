// storefront/src/pipelines/account_pipeline.rs

//! Account creation: validate, hash the password, store.

use crate::errors::AppError;
use crate::pipelines::contexts::CreateAccountCtxData;
use crate::services::accounts;
use crate::state::AppState;
use crate::store::AccountStore;
use flow::{ContextData, Pipeline, PipelineControl, Registry};
use tracing::{info, instrument, warn};

pub fn register_account_pipeline(registry: &Registry<AppError>, _app_state: &AppState) {
  let mut p = Pipeline::<CreateAccountCtxData, AppError>::new(&[
    "validate_account_input",
    "hash_account_password",
    "persist_account",
  ]);

  p.on("validate_account_input", validate_account_input);
  p.on("hash_account_password", hash_account_password);
  p.on("persist_account", persist_account);

  registry.register_pipeline(p);
  info!("Account pipeline registered.");
}

#[instrument(name = "create_account::validate", skip_all)]
async fn validate_account_input(ctx_data: ContextData<CreateAccountCtxData>) -> Result<PipelineControl, AppError> {
  let mut guard = ctx_data.write();
  let prepared = accounts::validate_request(&guard.request, guard.superuser).map_err(|e| {
    warn!(error = %e, "Account Pipeline: input rejected.");
    e
  })?;
  guard.prepared = Some(prepared);
  Ok(PipelineControl::Continue)
}

#[instrument(name = "create_account::hash_password", skip_all)]
async fn hash_account_password(ctx_data: ContextData<CreateAccountCtxData>) -> Result<PipelineControl, AppError> {
  let password = ctx_data.read().request.password.clone();
  let hashed = accounts::hash_password(password.as_deref())?;

  let mut guard = ctx_data.write();
  let prepared = guard
    .prepared
    .as_mut()
    .ok_or_else(|| AppError::Internal("Account input was not validated before hashing.".to_string()))?;
  prepared.password_hash = hashed;
  guard.request.password = None;
  Ok(PipelineControl::Continue)
}

#[instrument(name = "create_account::persist", skip_all)]
async fn persist_account(ctx_data: ContextData<CreateAccountCtxData>) -> Result<PipelineControl, AppError> {
  let (store, prepared) = {
    let guard = ctx_data.read();
    let prepared = guard
      .prepared
      .clone()
      .ok_or_else(|| AppError::Internal("No prepared account to persist.".to_string()))?;
    (guard.app_state.store.clone(), prepared)
  };

  let account = store.insert_account(prepared).await?;
  info!(account_id = %account.id, is_superadmin = account.is_superadmin, "Account Pipeline: account created.");
  ctx_data.write().created = Some(account);
  Ok(PipelineControl::Continue)
}
