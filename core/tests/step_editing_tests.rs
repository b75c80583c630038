// tests/step_editing_tests.rs
mod common;

use common::*;
use serial_test::serial;
use std::sync::Arc;
use storefront_flow::{ContextData, FlowError, Pipeline, PipelineResult};

#[tokio::test]
#[serial]
async fn inserted_steps_land_at_the_requested_position() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("validate", false, None), ("persist", false, None)]);
  pipeline.insert_after_step("validate", "price", false, None).unwrap();
  pipeline.insert_before_step("validate", "audit", true, None).unwrap();
  assert_eq!(pipeline.step_names(), vec!["audit", "validate", "price", "persist"]);

  for name in ["validate", "price", "persist"] {
    pipeline.on_root(name, recording_handler(name, 0)).unwrap();
  }
  let ctx = ContextData::new(TestContext::default());
  assert_eq!(pipeline.run(ctx.clone()).await.unwrap(), PipelineResult::Completed);
  assert_eq!(ctx.read().trail, vec!["validate", "price", "persist"]);
}

#[test]
fn duplicate_and_unknown_step_names_are_errors() {
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("a", false, None)]);
  assert!(matches!(
    pipeline.insert_after_step("a", "a", false, None),
    Err(FlowError::DuplicateStep { .. })
  ));
  assert!(matches!(
    pipeline.insert_before_step("zzz", "b", false, None),
    Err(FlowError::StepNotFound { .. })
  ));
  assert!(matches!(pipeline.remove_step("zzz"), Err(FlowError::StepNotFound { .. })));
  assert!(matches!(pipeline.set_optional("zzz", true), Err(FlowError::StepNotFound { .. })));
}

#[tokio::test]
#[serial]
async fn removed_step_takes_its_handlers_with_it() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("a", false, None), ("b", false, None)]);
  pipeline.on_root("a", recording_handler("a", 0)).unwrap();
  pipeline.on_root("b", recording_handler("b", 0)).unwrap();
  pipeline.remove_step("b").unwrap();

  // Re-adding the name must not resurrect the old handler.
  pipeline.insert_after_step("a", "b", true, None).unwrap();
  let ctx = ContextData::new(TestContext::default());
  pipeline.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().trail, vec!["a"]);
}

#[tokio::test]
#[serial]
async fn optional_flag_and_skip_condition_can_change_after_construction() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("a", false, None), ("empty", false, None)]);
  pipeline.on_root("a", recording_handler("a", 5)).unwrap();
  pipeline.set_optional("empty", true).unwrap();

  let ctx = ContextData::new(TestContext::default());
  assert_eq!(pipeline.run(ctx.clone()).await.unwrap(), PipelineResult::Completed);

  pipeline
    .set_skip_condition("a", Some(Arc::new(|_ctx: ContextData<TestContext>| true)))
    .unwrap();
  let ctx = ContextData::new(TestContext::default());
  pipeline.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().running_total, 0);
}
