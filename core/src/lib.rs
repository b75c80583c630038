// storefront-flow/src/lib.rs

//! storefront-flow: asynchronous named-step pipelines.
//!
//! A pipeline is an ordered list of named steps. Each step carries `before`,
//! `on` and `after` handler lists that run against a shared, lock-protected
//! context. Any handler may stop the run early or fail it; steps can be
//! optional or skipped by a predicate over the context. Pipelines are kept in
//! a [`FlowRegistry`] keyed by the type of context they operate on.

pub mod core;
pub mod error;
pub mod pipeline;
pub mod registry;

pub use crate::core::context_data::ContextData;
pub use crate::core::control::{PipelineControl, PipelineResult};
pub use crate::core::handler::Handler;
pub use crate::core::step::{SkipCondition, StepDef};

pub use crate::pipeline::definition::Pipeline;

pub use crate::error::{FlowError, FlowResult};

pub use crate::registry::FlowRegistry;
