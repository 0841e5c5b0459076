// tests/error_handling_tests.rs
mod common;

use common::*;
use flow::{ContextData, FlowError, Pipeline, PipelineControl, PipelineResult, StepDef};

#[tokio::test]
async fn required_step_without_handlers_fails_the_run() {
  setup_tracing();
  let pipeline = Pipeline::<TallyContext, TallyError>::new(&["unwired"]);
  let err = pipeline.run(ContextData::new(TallyContext::default())).await.unwrap_err();
  match err {
    TallyError::Flow(s) => {
      assert!(s.contains("HandlerMissing"));
      assert!(s.contains("unwired"));
    }
    other => panic!("expected HandlerMissing, got {:?}", other),
  }
}

#[tokio::test]
async fn skipped_required_step_without_handlers_is_not_an_error() {
  setup_tracing();
  let pipeline =
    Pipeline::<TallyContext, TallyError>::from_steps(vec![StepDef::new("unwired").skip_if(|_: &TallyContext| true)]);
  let result = pipeline.run(ContextData::new(TallyContext::default())).await.unwrap();
  assert_eq!(result, PipelineResult::Completed);
}

#[tokio::test]
async fn pipeline_can_use_flow_error_directly() {
  setup_tracing();
  let mut pipeline = Pipeline::<TallyContext, FlowError>::new(&["task"]);
  pipeline.on("task", |_ctx: ContextData<TallyContext>| async move {
    Err::<PipelineControl, FlowError>(anyhow::anyhow!("gateway timeout").into())
  });

  let err = pipeline.run(ContextData::new(TallyContext::default())).await.unwrap_err();
  match err {
    FlowError::HandlerError { source } => assert_eq!(source.to_string(), "gateway timeout"),
    other => panic!("expected HandlerError, got {:?}", other),
  }
}
