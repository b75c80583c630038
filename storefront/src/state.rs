// storefront/src/state.rs
use crate::config::AppConfig;
use crate::errors::AppError;
use sqlx::PgPool;
use std::sync::Arc;
use storefront_flow::FlowRegistry;

#[derive(Clone)]
pub struct AppState {
  pub db_pool: PgPool,
  pub flows: Arc<FlowRegistry<AppError>>,
  pub config: Arc<AppConfig>,
}
