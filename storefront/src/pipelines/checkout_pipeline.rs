// storefront/src/pipelines/checkout_pipeline.rs

use crate::db;
use crate::errors::AppError;
use crate::pipelines::contexts::CheckoutCtxData;
use crate::pricing;
use crate::state::AppState;
use std::sync::Arc;
use storefront_flow::{ContextData, FlowRegistry, Pipeline, PipelineControl, SkipCondition};
use tracing::{error, info, warn};
use uuid::Uuid;

pub fn build_checkout_pipeline() -> Result<Pipeline<CheckoutCtxData, AppError>, AppError> {
  let skip_reprice: SkipCondition<CheckoutCtxData> =
    Arc::new(|ctx: ContextData<CheckoutCtxData>| !ctx.read().app_state.config.reprice_at_checkout);

  let mut p = Pipeline::<CheckoutCtxData, AppError>::new(&[
    ("validate_order_request", false, None),
    ("check_products_exist", false, None),
    ("reprice_from_catalog", true, Some(skip_reprice)),
    ("compute_order_totals", false, None),
    ("persist_order_atomically", false, None),
  ]);

  p.on_root("validate_order_request", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let requested_fee = guard.delivery_fee.unwrap_or(guard.app_state.config.default_delivery_fee);
      let fee = pricing::normalize_money(&mut guard.lines, requested_fee);
      guard.delivery_fee = Some(fee);
      guard.delivery_place = guard.delivery_place.trim().to_string();

      if let Err(err) = pricing::validate_submission(&guard.lines, &guard.delivery_place, fee) {
        warn!(user_id = %guard.authenticated_user_id, error = %err, "Rejected order submission.");
        return Err(err);
      }
      Ok(PipelineControl::Continue)
    })
  })?;

  p.on_root("check_products_exist", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (ids, db_pool) = {
        let guard = ctx_data.read();
        let mut ids: Vec<Uuid> = guard.lines.iter().map(|l| l.product_id).collect();
        ids.sort_unstable();
        ids.dedup();
        (ids, guard.app_state.db_pool.clone())
      };

      let catalog = db::products::catalog_prices(&db_pool, &ids).await?;
      let mut guard = ctx_data.write();
      pricing::ensure_products_exist(&guard.lines, &catalog)?;
      guard.catalog = catalog;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  })?;

  p.on_root("reprice_from_catalog", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let catalog = std::mem::take(&mut guard.catalog);
      let outcome = pricing::apply_live_prices(&mut guard.lines, &catalog);
      guard.catalog = catalog;
      outcome?;
      info!(user_id = %guard.authenticated_user_id, "Order lines repriced from catalog.");
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  })?;

  p.on_root("compute_order_totals", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let fee = guard
        .delivery_fee
        .ok_or_else(|| AppError::Internal("Delivery fee unresolved at totals.".to_string()))?;
      guard.total_price = Some(pricing::grand_total(&guard.lines, fee)?);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  })?;

  p.on_root("persist_order_atomically", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let snapshot = ctx_data.snapshot();
      let (fee, total) = match (snapshot.delivery_fee, snapshot.total_price) {
        (Some(fee), Some(total)) => (fee, total),
        _ => return Err(AppError::Internal("Order totals missing before persistence.".to_string())),
      };

      let mut tx = snapshot.app_state.db_pool.begin().await?;
      let header = match db::orders::insert_order(
        &mut tx,
        snapshot.authenticated_user_id,
        &snapshot.delivery_place,
        fee,
        total,
        &snapshot.lines,
      )
      .await
      {
        Ok(header) => header,
        Err(err) => {
          // Dropping the transaction rolls it back.
          error!(user_id = %snapshot.authenticated_user_id, error = %err, "Order insert failed.");
          return Err(err);
        }
      };
      tx.commit().await?;

      info!(order_id = %header.id, user_id = %header.user_id, total = %header.total_price, "Order created.");
      ctx_data.write().order = Some(header);
      Ok(PipelineControl::Continue)
    })
  })?;

  Ok(p)
}

pub fn register_checkout_pipeline(registry: &Arc<FlowRegistry<AppError>>, _app_state: &AppState) -> Result<(), AppError> {
  registry.register_pipeline(build_checkout_pipeline()?);
  info!("Checkout pipeline registered.");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn reprice_step_is_optional_and_sits_before_totals() {
    let p = build_checkout_pipeline().unwrap();
    assert_eq!(
      p.step_names(),
      vec![
        "validate_order_request",
        "check_products_exist",
        "reprice_from_catalog",
        "compute_order_totals",
        "persist_order_atomically"
      ]
    );
  }
}
