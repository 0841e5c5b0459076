// storefront-flow/src/pipeline/execution.rs

use crate::context::{ContextData, Handler};
use crate::control::{PipelineControl, PipelineResult};
use crate::error::FlowError;
use crate::pipeline::definition::Pipeline;
use tracing::{event, instrument, span, Instrument, Level};

enum PhaseOutcome<Err> {
  Continue,
  Stopped,
  Failed(Err),
}

async fn run_phase<TData, Err>(
  phase: &'static str,
  handlers: &[Handler<TData, Err>],
  ctx_data: &ContextData<TData>,
) -> PhaseOutcome<Err>
where
  TData: Send + Sync + 'static,
  Err: std::fmt::Display,
{
  for (handler_idx, handler_fn) in handlers.iter().enumerate() {
    let handler_span = span!(Level::DEBUG, "handler", phase, handler_index = handler_idx);
    match handler_fn(ctx_data.clone()).instrument(handler_span).await {
      Ok(PipelineControl::Continue) => {}
      Ok(PipelineControl::Stop) => {
        event!(Level::INFO, phase, "Pipeline stopped by handler.");
        return PhaseOutcome::Stopped;
      }
      Err(e) => {
        event!(Level::WARN, phase, error = %e, "Handler failed.");
        return PhaseOutcome::Failed(e);
      }
    }
  }
  PhaseOutcome::Continue
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: Send + Sync + 'static,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Runs every step in order against `ctx_data`.
  ///
  /// A non-optional step with no handlers fails the run with
  /// `FlowError::HandlerMissing` converted into `Err`.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(context_type = %std::any::type_name::<TData>(), num_steps = self.steps.len()),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();
      let step_span = span!(Level::INFO, "step", step_name, step_index = step_idx);

      if step_def.should_skip(&ctx_data) {
        event!(parent: &step_span, Level::DEBUG, "Step skipped by condition.");
        continue;
      }

      let handlers = match self.handlers.get(step_name).filter(|h| !h.is_empty()) {
        Some(handlers) => handlers,
        None if step_def.optional => {
          event!(parent: &step_span, Level::DEBUG, "Optional step has no handlers.");
          continue;
        }
        None => {
          event!(parent: &step_span, Level::ERROR, "Required step has no handlers.");
          return Err(Err::from(FlowError::HandlerMissing {
            step_name: step_def.name.clone(),
          }));
        }
      };

      for (phase, phase_handlers) in [
        ("before", &handlers.before),
        ("on", &handlers.on),
        ("after", &handlers.after),
      ] {
        match run_phase(phase, phase_handlers, &ctx_data)
          .instrument(step_span.clone())
          .await
        {
          PhaseOutcome::Continue => {}
          PhaseOutcome::Stopped => return Ok(PipelineResult::Stopped),
          PhaseOutcome::Failed(e) => return Err(e),
        }
      }
    }

    event!(Level::DEBUG, "Pipeline completed.");
    Ok(PipelineResult::Completed)
  }
}
