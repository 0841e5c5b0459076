// storefront-flow/src/control.rs

//! Flow signals returned by handlers, and the outcome of a whole run.

/// Returned by every handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineControl {
  /// Keep going: remaining handlers of this step, then the next step.
  Continue,
  /// Halt the run. Nothing after the current handler executes.
  Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineResult {
  /// Every step ran, or was skipped by its condition or optionality.
  Completed,
  /// A handler returned `PipelineControl::Stop`.
  Stopped,
}

impl PipelineResult {
  pub fn is_completed(self) -> bool {
    matches!(self, PipelineResult::Completed)
  }
}
