// storefront/src/pipelines/mod.rs

//! Defines and registers the pipelines behind the cart and account endpoints.

use crate::errors::AppError;
use crate::state::AppState;
use flow::{ContextData, PipelineResult, Registry};

pub mod contexts;

pub mod account_pipeline;
pub mod cart_pipeline;
pub mod cart_removal_pipeline;
pub mod cart_summary_pipeline;

/// Registers every pipeline. Called once while building [`AppState`].
pub fn register_all_pipelines(registry: &Registry<AppError>, app_state: &AppState) {
  tracing::info!("Registering pipelines...");

  cart_pipeline::register_add_to_cart_pipeline(registry, app_state);
  cart_removal_pipeline::register_cart_removal_pipeline(registry, app_state);
  cart_summary_pipeline::register_cart_summary_pipeline(registry, app_state);
  account_pipeline::register_account_pipeline(registry, app_state);

  tracing::info!(count = registry.len(), "All application pipelines registered.");
}

/// Runs the pipeline registered for `TData` and insists that it completes.
pub async fn run_to_completion<TData>(registry: &Registry<AppError>, ctx_data: ContextData<TData>) -> Result<(), AppError>
where
  TData: Send + Sync + 'static,
{
  match registry.run(ctx_data).await? {
    PipelineResult::Completed => Ok(()),
    PipelineResult::Stopped => {
      tracing::warn!(context_type = %std::any::type_name::<TData>(), "Pipeline was stopped by a handler.");
      Err(AppError::PipelineHaltedByHandler)
    }
  }
}
