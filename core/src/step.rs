// storefront-flow/src/step.rs

use crate::context::ContextData;
use std::sync::Arc;

/// Evaluated right before a step runs; `true` skips the step.
pub type SkipCondition<TData> = Arc<dyn Fn(&TData) -> bool + Send + Sync + 'static>;

/// One named step of a pipeline.
#[derive(Clone)]
pub struct StepDef<TData: Send + Sync + 'static> {
  pub name: String,
  /// An optional step without handlers is passed over instead of failing the run.
  pub optional: bool,
  pub skip_if: Option<SkipCondition<TData>>,
}

impl<TData: Send + Sync + 'static> StepDef<TData> {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      optional: false,
      skip_if: None,
    }
  }

  pub fn optional(mut self) -> Self {
    self.optional = true;
    self
  }

  pub fn skip_if(mut self, cond: impl Fn(&TData) -> bool + Send + Sync + 'static) -> Self {
    self.skip_if = Some(Arc::new(cond));
    self
  }

  pub(crate) fn should_skip(&self, ctx: &ContextData<TData>) -> bool {
    match &self.skip_if {
      Some(cond) => cond(&*ctx.read()),
      None => false,
    }
  }
}

impl<TData: Send + Sync + 'static> std::fmt::Debug for StepDef<TData> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StepDef")
      .field("name", &self.name)
      .field("optional", &self.optional)
      .field("skip_if_present", &self.skip_if.is_some())
      .finish()
  }
}

impl<TData: Send + Sync + 'static> From<&str> for StepDef<TData> {
  fn from(name: &str) -> Self {
    StepDef::new(name)
  }
}
