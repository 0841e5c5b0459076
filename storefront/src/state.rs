// storefront/src/state.rs

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::pipelines;
use crate::store::Store;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn Store>,
  pub flows: Arc<flow::Registry<AppError>>,
  pub config: Arc<AppConfig>,
}

impl AppState {
  /// Wires the store and configuration together and registers every pipeline.
  pub fn new(store: Arc<dyn Store>, config: Arc<AppConfig>) -> Self {
    let state = Self {
      store,
      flows: Arc::new(flow::Registry::new()),
      config,
    };
    pipelines::register_all_pipelines(&state.flows, &state);
    state
  }
}
