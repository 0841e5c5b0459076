// storefront-flow/src/pipeline/hooks.rs

//! Handler registration. A handler may return any error type that converts
//! into the pipeline's `Err`; the conversion happens inside the boxed future.

use crate::context::{ContextData, Handler};
use crate::control::PipelineControl;
use crate::error::FlowError;
use crate::pipeline::definition::{Pipeline, StepHandlers};
use std::future::Future;
use tracing::{event, Level};

#[derive(Debug, Clone, Copy)]
enum Phase {
  Before,
  On,
  After,
}

fn box_handler<TData, Err, F, HandlerErr>(
  handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
) -> Handler<TData, Err>
where
  TData: Send + Sync + 'static,
  F: Future<Output = Result<PipelineControl, HandlerErr>> + Send + 'static,
  HandlerErr: Into<Err> + Send + Sync + 'static,
{
  Box::new(move |ctx_data| {
    let fut = handler_fn(ctx_data);
    Box::pin(async move { fut.await.map_err(Into::into) })
  })
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: Send + Sync + 'static,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  fn push_handler(&mut self, step_name: &str, phase: Phase, handler: Handler<TData, Err>) {
    self.assert_step(step_name);
    let entry = self
      .handlers
      .entry(step_name.to_string())
      .or_insert_with(StepHandlers::default);
    match phase {
      Phase::Before => entry.before.push(handler),
      Phase::On => entry.on.push(handler),
      Phase::After => entry.after.push(handler),
    }
    event!(Level::TRACE, %step_name, ?phase, "Handler registered.");
  }

  /// Runs ahead of the step's main handlers.
  pub fn before<F, HandlerErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<PipelineControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<Err> + Send + Sync + 'static,
  {
    self.push_handler(step_name, Phase::Before, box_handler(handler_fn));
  }

  /// The step's main work.
  pub fn on<F, HandlerErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<PipelineControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<Err> + Send + Sync + 'static,
  {
    self.push_handler(step_name, Phase::On, box_handler(handler_fn));
  }

  pub fn after<F, HandlerErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<PipelineControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<Err> + Send + Sync + 'static,
  {
    self.push_handler(step_name, Phase::After, box_handler(handler_fn));
  }

  /// Registers an already boxed handler, e.g. one shared between pipelines.
  pub fn on_boxed(&mut self, step_name: &str, handler: Handler<TData, Err>) {
    self.push_handler(step_name, Phase::On, handler);
  }
}
