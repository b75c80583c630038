// storefront/src/pipelines/mod.rs

//! Multi-step server operations, each a pipeline keyed by its context type.

use crate::errors::AppError;
use crate::state::AppState;
use std::sync::Arc;
use storefront_flow::FlowRegistry;

pub mod contexts;

pub mod checkout_pipeline;
pub mod signin_pipeline;
pub mod signup_pipeline;

/// Registers every pipeline. Called once at startup, before the server binds.
pub fn register_all_pipelines(registry: &Arc<FlowRegistry<AppError>>, app_state: &AppState) -> Result<(), AppError> {
  tracing::info!("Registering pipelines...");

  signup_pipeline::register_signup_pipeline(registry, app_state)?;
  signin_pipeline::register_signin_pipeline(registry, app_state)?;
  checkout_pipeline::register_checkout_pipeline(registry, app_state)?;

  tracing::info!("All application pipelines registered.");
  Ok(())
}
