// storefront-flow/src/registry.rs

//! Type-keyed pipeline registry. One pipeline per context data type; callers
//! run a pipeline by handing over a `ContextData<TData>`.

use crate::context::ContextData;
use crate::control::PipelineResult;
use crate::error::FlowError;
use crate::pipeline::Pipeline;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{event, Level};

#[async_trait]
trait ErasedRunner<AppErr>: Send + Sync
where
  AppErr: std::error::Error + Send + Sync + 'static,
{
  async fn run_erased(&self, ctx_obj: Box<dyn Any + Send>) -> Result<PipelineResult, AppErr>;
}

struct TypedRunner<TData, HandlerErr, AppErr>
where
  TData: Send + Sync + 'static,
  HandlerErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pipeline: Arc<Pipeline<TData, HandlerErr>>,
  _app_err: PhantomData<fn() -> AppErr>,
}

#[async_trait]
impl<TData, HandlerErr, AppErr> ErasedRunner<AppErr> for TypedRunner<TData, HandlerErr, AppErr>
where
  TData: Send + Sync + 'static,
  HandlerErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
  AppErr: std::error::Error + From<HandlerErr> + From<FlowError> + Send + Sync + 'static,
{
  async fn run_erased(&self, ctx_obj: Box<dyn Any + Send>) -> Result<PipelineResult, AppErr> {
    let ctx_data = ctx_obj.downcast::<ContextData<TData>>().map_err(|_| {
      AppErr::from(FlowError::TypeMismatch {
        expected_type: std::any::type_name::<ContextData<TData>>().to_string(),
      })
    })?;
    self.pipeline.run(*ctx_data).await.map_err(AppErr::from)
  }
}

/// Holds one pipeline per context data type.
///
/// `AppErr` is what [`Registry::run`] returns. It must absorb both the engine's
/// [`FlowError`] (unregistered type) and each pipeline's handler error.
pub struct Registry<AppErr = FlowError>
where
  AppErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  runners: RwLock<HashMap<TypeId, Arc<dyn ErasedRunner<AppErr>>>>,
}

impl<AppErr> Default for Registry<AppErr>
where
  AppErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<AppErr> Registry<AppErr>
where
  AppErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub fn new() -> Self {
    Self {
      runners: RwLock::new(HashMap::new()),
    }
  }

  /// Registers `pipeline` for its context type, replacing any earlier one.
  pub fn register_pipeline<TData, HandlerErr>(&self, pipeline: Pipeline<TData, HandlerErr>)
  where
    TData: Send + Sync + 'static,
    HandlerErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
    AppErr: From<HandlerErr>,
  {
    event!(Level::DEBUG, context_type = %std::any::type_name::<TData>(), "Registering pipeline.");
    let runner = TypedRunner::<TData, HandlerErr, AppErr> {
      pipeline: Arc::new(pipeline),
      _app_err: PhantomData,
    };
    self.runners.write().insert(TypeId::of::<TData>(), Arc::new(runner));
  }

  pub fn is_registered<TData: Send + Sync + 'static>(&self) -> bool {
    self.runners.read().contains_key(&TypeId::of::<TData>())
  }

  pub fn len(&self) -> usize {
    self.runners.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Runs the pipeline registered for `TData`.
  pub async fn run<TData>(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, AppErr>
  where
    TData: Send + Sync + 'static,
  {
    let runner = self
      .runners
      .read()
      .get(&TypeId::of::<TData>())
      .cloned()
      .ok_or_else(|| {
        let context_type = std::any::type_name::<TData>();
        event!(Level::ERROR, %context_type, "No pipeline registered.");
        AppErr::from(FlowError::PipelineNotRegistered {
          context_type: context_type.to_string(),
        })
      })?;

    runner.run_erased(Box::new(ctx_data)).await
  }
}
