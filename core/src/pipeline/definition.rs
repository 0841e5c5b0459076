// storefront-flow/src/pipeline/definition.rs

use crate::context::Handler;
use crate::error::{FlowError, FlowResult};
use crate::step::StepDef;
use std::collections::HashMap;

/// Handlers attached to one step, grouped by phase.
pub(crate) struct StepHandlers<TData, Err>
where
  TData: Send + Sync + 'static,
{
  pub(crate) before: Vec<Handler<TData, Err>>,
  pub(crate) on: Vec<Handler<TData, Err>>,
  pub(crate) after: Vec<Handler<TData, Err>>,
}

impl<TData: Send + Sync + 'static, Err> Default for StepHandlers<TData, Err> {
  fn default() -> Self {
    Self {
      before: Vec::new(),
      on: Vec::new(),
      after: Vec::new(),
    }
  }
}

impl<TData: Send + Sync + 'static, Err> StepHandlers<TData, Err> {
  pub(crate) fn is_empty(&self) -> bool {
    self.before.is_empty() && self.on.is_empty() && self.after.is_empty()
  }
}

/// An ordered list of named steps over context data `TData`.
///
/// Handlers return `Result<PipelineControl, Err>`. `Err` must be buildable from
/// [`FlowError`] so that engine failures (a required step without handlers)
/// come back through the same channel as handler failures.
pub struct Pipeline<TData, Err>
where
  TData: Send + Sync + 'static,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub(crate) steps: Vec<StepDef<TData>>,
  pub(crate) handlers: HashMap<String, StepHandlers<TData, Err>>,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: Send + Sync + 'static,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Required steps, in order.
  pub fn new(step_names: &[&str]) -> Self {
    Self::from_steps(step_names.iter().map(|name| StepDef::new(*name)).collect())
  }

  pub fn from_steps(steps: Vec<StepDef<TData>>) -> Self {
    Self {
      steps,
      handlers: HashMap::new(),
    }
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  pub fn has_step(&self, step_name: &str) -> bool {
    self.position(step_name).is_some()
  }

  fn position(&self, step_name: &str) -> Option<usize> {
    self.steps.iter().position(|s| s.name == step_name)
  }

  fn require_position(&self, step_name: &str) -> FlowResult<usize> {
    self.position(step_name).ok_or_else(|| FlowError::StepNotFound {
      step_name: step_name.to_string(),
    })
  }

  fn require_absent(&self, step_name: &str) -> FlowResult<()> {
    match self.position(step_name) {
      Some(_) => Err(FlowError::DuplicateStep {
        step_name: step_name.to_string(),
      }),
      None => Ok(()),
    }
  }

  /// Panics on unknown step names. Handler registration happens once at
  /// startup, so a typo there is a programming error.
  pub(crate) fn assert_step(&self, step_name: &str) {
    if !self.has_step(step_name) {
      panic!("flow setup error: step '{}' is not defined in this pipeline", step_name);
    }
  }

  pub fn insert_before(&mut self, existing: &str, step: StepDef<TData>) -> FlowResult<()> {
    let idx = self.require_position(existing)?;
    self.require_absent(&step.name)?;
    self.steps.insert(idx, step);
    Ok(())
  }

  pub fn insert_after(&mut self, existing: &str, step: StepDef<TData>) -> FlowResult<()> {
    let idx = self.require_position(existing)?;
    self.require_absent(&step.name)?;
    self.steps.insert(idx + 1, step);
    Ok(())
  }

  /// Removes the step and every handler attached to it.
  pub fn remove_step(&mut self, step_name: &str) -> FlowResult<()> {
    let idx = self.require_position(step_name)?;
    self.steps.remove(idx);
    self.handlers.remove(step_name);
    Ok(())
  }

  pub fn set_optional(&mut self, step_name: &str, optional: bool) -> FlowResult<()> {
    let idx = self.require_position(step_name)?;
    self.steps[idx].optional = optional;
    Ok(())
  }
}
