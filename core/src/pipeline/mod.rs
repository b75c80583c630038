// storefront-flow/src/pipeline/mod.rs

//! The `Pipeline` type: construction and step editing, hook registration, execution.

pub mod definition;
pub mod execution;
pub mod hooks;

pub use definition::Pipeline;
