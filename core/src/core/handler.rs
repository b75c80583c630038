// storefront-flow/src/core/handler.rs
use super::{ContextData, PipelineControl};
use std::future::Future;
use std::pin::Pin;

/// Boxed async handler stored by a pipeline for one phase of one step.
pub type Handler<T, E> = Box<
  dyn Fn(ContextData<T>) -> Pin<Box<dyn Future<Output = Result<PipelineControl, E>> + Send>> + Send + Sync,
>;
