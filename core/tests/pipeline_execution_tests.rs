// tests/pipeline_execution_tests.rs
mod common;

use common::*;
use serial_test::serial;
use std::sync::Arc;
use std::time::Duration;
use storefront_flow::{ContextData, FlowError, Pipeline, PipelineControl, PipelineResult, SkipCondition};

#[tokio::test]
#[serial]
async fn steps_run_in_declared_order() {
  setup_tracing();
  let mut pipeline =
    Pipeline::<TestContext, TestError>::new(&[("validate", false, None), ("price", false, None), ("persist", false, None)]);
  pipeline.on_root("validate", recording_handler("validate", 0)).unwrap();
  pipeline.on_root("price", recording_handler("price", 10)).unwrap();
  pipeline.on_root("persist", recording_handler("persist", 0)).unwrap();

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap(), PipelineResult::Completed);
  let guard = ctx.read();
  assert_eq!(guard.trail, vec!["validate", "price", "persist"]);
  assert_eq!(guard.running_total, 10);
}

#[tokio::test]
#[serial]
async fn before_on_after_run_in_phase_order_within_a_step() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("price", false, None)]);
  pipeline.after_root("price", recording_handler("after", 0)).unwrap();
  pipeline.on_root("price", recording_handler("on_1", 0)).unwrap();
  pipeline.before_root("price", recording_handler("before", 0)).unwrap();
  pipeline.on_root("price", recording_handler("on_2", 0)).unwrap();

  let ctx = ContextData::new(TestContext::default());
  pipeline.run(ctx.clone()).await.unwrap();

  assert_eq!(ctx.read().trail, vec!["before", "on_1", "on_2", "after"]);
}

#[tokio::test]
#[serial]
async fn stop_halts_remaining_handlers_and_steps() {
  setup_tracing();
  let mut pipeline =
    Pipeline::<TestContext, TestError>::new(&[("a", false, None), ("b", false, None), ("c", false, None)]);
  pipeline.on_root("a", recording_handler("a", 1)).unwrap();
  pipeline.on_root("b", recording_handler("b", 1)).unwrap();
  pipeline.after_root("b", recording_handler("b_after", 1)).unwrap();
  pipeline.on_root("c", recording_handler("c", 1)).unwrap();

  let ctx = ContextData::new(TestContext {
    stop_at: Some("b".to_string()),
    ..Default::default()
  });
  let result = pipeline.run(ctx.clone()).await.unwrap();

  assert_eq!(result, PipelineResult::Stopped);
  assert_eq!(ctx.read().trail, vec!["a", "b"]);
  assert_eq!(ctx.read().running_total, 2);
}

#[tokio::test]
#[serial]
async fn skip_condition_bypasses_step() {
  setup_tracing();
  let skip: SkipCondition<TestContext> = Arc::new(|ctx: ContextData<TestContext>| ctx.read().skip_discount);
  let mut pipeline =
    Pipeline::<TestContext, TestError>::new(&[("price", false, None), ("discount", false, Some(skip)), ("persist", false, None)]);
  pipeline.on_root("price", recording_handler("price", 100)).unwrap();
  pipeline.on_root("discount", recording_handler("discount", -10)).unwrap();
  pipeline.on_root("persist", recording_handler("persist", 0)).unwrap();

  let skipped = ContextData::new(TestContext {
    skip_discount: true,
    ..Default::default()
  });
  pipeline.run(skipped.clone()).await.unwrap();
  assert_eq!(skipped.read().trail, vec!["price", "persist"]);
  assert_eq!(skipped.read().running_total, 100);

  let applied = ContextData::new(TestContext::default());
  pipeline.run(applied.clone()).await.unwrap();
  assert_eq!(applied.read().running_total, 90);
}

#[tokio::test]
#[serial]
async fn optional_step_without_handlers_is_passed_over() {
  setup_tracing();
  let mut pipeline =
    Pipeline::<TestContext, TestError>::new(&[("a", false, None), ("maybe", true, None), ("b", false, None)]);
  pipeline.on_root("a", recording_handler("a", 0)).unwrap();
  pipeline.on_root("b", recording_handler("b", 0)).unwrap();

  let ctx = ContextData::new(TestContext::default());
  assert_eq!(pipeline.run(ctx.clone()).await.unwrap(), PipelineResult::Completed);
  assert_eq!(ctx.read().trail, vec!["a", "b"]);
}

#[tokio::test]
#[serial]
async fn handlers_can_await_between_context_accesses() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("slow", false, None)]);
  pipeline
    .on_root("slow", |ctx: ContextData<TestContext>| {
      Box::pin(async move {
        let base = ctx.read().running_total;
        tokio::time::sleep(Duration::from_millis(5)).await;
        {
          let mut guard = ctx.write();
          guard.running_total = base + 7;
          guard.trail.push("slow".to_string());
        }
        Ok::<_, FlowError>(PipelineControl::Continue)
      })
    })
    .unwrap();

  let ctx = ContextData::new(TestContext {
    running_total: 3,
    ..Default::default()
  });
  pipeline.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().running_total, 10);
}

#[tokio::test]
#[serial]
async fn snapshot_clones_current_state() {
  let ctx = ContextData::new(TestContext::default());
  ctx.write().trail.push("x".to_string());
  let snap = ctx.snapshot();
  ctx.write().trail.push("y".to_string());
  assert_eq!(snap.trail, vec!["x"]);
  assert_eq!(ctx.map_read(|c| &c.trail).len(), 2);
}
