// tests/common/mod.rs
#![allow(dead_code)]

use flow::{ContextData, FlowError, Handler, PipelineControl};
use once_cell::sync::Lazy;
use tracing::Level;

/// A running basket tally, enough state to observe ordering and early exits.
#[derive(Clone, Debug, Default)]
pub struct TallyContext {
  pub total_cents: i64,
  pub lines: u32,
  pub steps_executed: Vec<String>,
  pub stop_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TallyError {
  #[error("flow error: {0}")]
  Flow(String),

  #[error("line rejected: {0}")]
  Rejected(String),
}

impl From<FlowError> for TallyError {
  fn from(err: FlowError) -> Self {
    TallyError::Flow(format!("{:?}", err))
  }
}

/// Adds one line worth `cents` and records the step name.
pub fn add_line_handler(step_name: &'static str, cents: i64) -> Handler<TallyContext, TallyError> {
  Box::new(move |ctx: ContextData<TallyContext>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.total_cents += cents;
      guard.lines += 1;
      guard.steps_executed.push(step_name.to_string());
      if guard.stop_at.as_deref() == Some(step_name) {
        return Ok(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  })
}

pub fn rejecting_handler(step_name: &'static str, reason: &'static str) -> Handler<TallyContext, TallyError> {
  Box::new(move |ctx: ContextData<TallyContext>| {
    Box::pin(async move {
      ctx.write().steps_executed.push(step_name.to_string());
      Err(TallyError::Rejected(reason.to_string()))
    })
  })
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
