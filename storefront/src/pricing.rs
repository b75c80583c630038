// storefront/src/pricing.rs

//! Order arithmetic and per-line validation shared by checkout and order display.

use crate::errors::{AppError, Result};
use crate::models::product::CatalogPrice;
use crate::models::NewOrderLine;
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

/// Exclusive upper bound of a `NUMERIC(12, 2)` money column (10^10).
pub const MONEY_LIMIT: Decimal = Decimal::from_parts(1_410_065_408, 2, 0, false, 0);

fn total_out_of_range() -> AppError {
  AppError::Validation("order total out of range".to_string())
}

/// Sum of `price * quantity` over `entries`, `None` on overflow.
pub fn checked_sum<I, Q>(entries: I) -> Option<Decimal>
where
  I: IntoIterator<Item = (Decimal, Q)>,
  Q: Into<Decimal>,
{
  entries
    .into_iter()
    .try_fold(Decimal::ZERO, |acc, (price, quantity)| price.checked_mul(quantity.into()).and_then(|t| acc.checked_add(t)))
}

pub fn fits_money_column(amount: Decimal) -> bool {
  amount < MONEY_LIMIT
}

pub fn items_total(lines: &[NewOrderLine]) -> Result<Decimal> {
  checked_sum(lines.iter().map(|l| (l.unit_price, l.quantity))).ok_or_else(total_out_of_range)
}

/// Items plus delivery; fails unless the result fits a money column.
pub fn grand_total(lines: &[NewOrderLine], delivery_fee: Decimal) -> Result<Decimal> {
  let total = items_total(lines)?
    .checked_add(delivery_fee)
    .ok_or_else(total_out_of_range)?;
  if !fits_money_column(total) {
    return Err(total_out_of_range());
  }
  Ok(total)
}

/// Money columns hold two decimal places.
pub const MONEY_SCALE: u32 = 2;

/// Rounds prices and the fee to the stored scale so the persisted total matches the persisted lines.
pub fn normalize_money(lines: &mut [NewOrderLine], delivery_fee: Decimal) -> Decimal {
  for line in lines.iter_mut() {
    line.unit_price = line.unit_price.round_dp(MONEY_SCALE);
  }
  delivery_fee.round_dp(MONEY_SCALE)
}

/// Checks everything about a submission that needs no database access.
pub fn validate_submission(lines: &[NewOrderLine], delivery_place: &str, delivery_fee: Decimal) -> Result<()> {
  if lines.is_empty() {
    return Err(AppError::Validation("empty cart".to_string()));
  }
  if delivery_place.trim().is_empty() {
    return Err(AppError::Validation("delivery place required".to_string()));
  }
  if delivery_fee < Decimal::ZERO {
    return Err(AppError::Validation("delivery fee must not be negative".to_string()));
  }
  if !fits_money_column(delivery_fee) {
    return Err(AppError::Validation("delivery fee out of range".to_string()));
  }
  for (idx, line) in lines.iter().enumerate() {
    if line.quantity < 1 {
      return Err(AppError::Validation(format!("item {}: quantity must be at least 1", idx + 1)));
    }
    if line.unit_price < Decimal::ZERO {
      return Err(AppError::Validation(format!("item {}: unit price must not be negative", idx + 1)));
    }
    if !fits_money_column(line.unit_price) {
      return Err(AppError::Validation(format!("item {}: unit price out of range", idx + 1)));
    }
  }
  grand_total(lines, delivery_fee).map(|_| ())
}

/// Fails if any line names a product missing from `catalog`.
pub fn ensure_products_exist(lines: &[NewOrderLine], catalog: &HashMap<Uuid, CatalogPrice>) -> Result<()> {
  match lines.iter().find(|l| !catalog.contains_key(&l.product_id)) {
    Some(missing) => Err(AppError::Validation(format!("product {} does not exist", missing.product_id))),
    None => Ok(()),
  }
}

/// Replaces every snapshot price with the live catalog price; hidden products are rejected.
pub fn apply_live_prices(lines: &mut [NewOrderLine], catalog: &HashMap<Uuid, CatalogPrice>) -> Result<()> {
  for line in lines.iter_mut() {
    let live = catalog
      .get(&line.product_id)
      .ok_or_else(|| AppError::Validation(format!("product {} does not exist", line.product_id)))?;
    if !live.visible {
      return Err(AppError::Validation(format!("product {} is not available", line.product_id)));
    }
    line.unit_price = live.price;
  }
  Ok(())
}
