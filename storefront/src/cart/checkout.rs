// storefront/src/cart/checkout.rs

use super::backend::CartBackend;
use super::store::{CartItem, CartStore};
use super::CartError;
use crate::models::{CreateOrderRequest, NewOrderLine};
use crate::pricing;
use rust_decimal::Decimal;
use std::future::Future;
use thiserror::Error;
use tracing::warn;

/// Flat delivery fee used when the client does not pick one.
pub const DEFAULT_DELIVERY_FEE: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// A validated checkout, ready to be submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutDraft {
  pub lines: Vec<NewOrderLine>,
  pub delivery_place: String,
  pub delivery_fee: Decimal,
}

impl CheckoutDraft {
  /// Fails locally, before any network call, on an empty cart, a blank delivery place or an unstorable total.
  pub fn build(items: &[CartItem], delivery_place: &str, delivery_fee: Option<Decimal>) -> Result<Self, CartError> {
    if items.is_empty() {
      return Err(CartError::EmptyCart);
    }
    let delivery_place = delivery_place.trim();
    if delivery_place.is_empty() {
      return Err(CartError::DeliveryPlaceRequired);
    }
    let lines = items
      .iter()
      .map(|item| NewOrderLine {
        product_id: item.product_id,
        quantity: i32::try_from(item.quantity).unwrap_or(i32::MAX),
        unit_price: item.price,
      })
      .collect();
    let draft = Self {
      lines,
      delivery_place: delivery_place.to_string(),
      delivery_fee: delivery_fee.unwrap_or(DEFAULT_DELIVERY_FEE),
    };
    draft.grand_total()?;
    Ok(draft)
  }

  pub fn items_total(&self) -> Result<Decimal, CartError> {
    pricing::checked_sum(self.lines.iter().map(|l| (l.unit_price, l.quantity))).ok_or(CartError::TotalOutOfRange)
  }

  pub fn grand_total(&self) -> Result<Decimal, CartError> {
    self
      .items_total()?
      .checked_add(self.delivery_fee)
      .filter(|total| pricing::fits_money_column(*total))
      .ok_or(CartError::TotalOutOfRange)
  }

  pub fn to_request(&self) -> CreateOrderRequest {
    CreateOrderRequest {
      items: self.lines.clone(),
      delivery_place: self.delivery_place.clone(),
      delivery_fee: Some(self.delivery_fee),
    }
  }
}

#[derive(Debug, Error)]
pub enum CheckoutFailure<E: std::error::Error + 'static> {
  #[error(transparent)]
  Invalid(#[from] CartError),

  /// Submission failed; the cart is untouched.
  #[error("Order submission failed: {0}")]
  Submit(#[source] E),
}

impl<B: CartBackend> CartStore<B> {
  /// Builds a draft from the cart, hands it to `submit`, and clears the cart only if `submit` succeeds.
  ///
  /// Once `submit` succeeds its outcome is always returned; a cart that cannot be cleared is only logged.
  pub async fn settle_checkout<F, Fut, T, E>(
    &mut self,
    delivery_place: &str,
    delivery_fee: Option<Decimal>,
    submit: F,
  ) -> Result<T, CheckoutFailure<E>>
  where
    F: FnOnce(CreateOrderRequest) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::error::Error + 'static,
  {
    let draft = CheckoutDraft::build(self.items(), delivery_place, delivery_fee)?;
    let outcome = submit(draft.to_request()).await.map_err(CheckoutFailure::Submit)?;
    if let Err(err) = self.clear() {
      warn!(error = %err, "Order accepted but the cart could not be cleared.");
    }
    Ok(outcome)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cart::{CartBackend, MemoryBackend, ProductSnapshot};
  use std::cell::Cell;
  use std::sync::atomic::{AtomicBool, Ordering};
  use std::sync::Arc;
  use uuid::Uuid;

  #[derive(Debug, Error)]
  #[error("server said no")]
  struct ServerDown;

  fn filled_cart() -> CartStore<MemoryBackend> {
    let mut cart = CartStore::open(MemoryBackend::new()).unwrap();
    let a = ProductSnapshot {
      product_id: Uuid::new_v4(),
      name: "A".into(),
      price: Decimal::new(1000, 2),
      image: None,
    };
    cart.add(a.clone()).unwrap();
    cart.add(a).unwrap();
    cart
      .add(ProductSnapshot {
        product_id: Uuid::new_v4(),
        name: "B".into(),
        price: Decimal::new(550, 2),
        image: None,
      })
      .unwrap();
    cart
  }

  #[test]
  fn draft_totals_include_default_fee() {
    let cart = filled_cart();
    let draft = CheckoutDraft::build(cart.items(), "  12 Elm st ", None).unwrap();
    assert_eq!(draft.delivery_place, "12 Elm st");
    assert_eq!(draft.delivery_fee, Decimal::from(5));
    assert_eq!(draft.items_total().unwrap(), Decimal::new(2550, 2));
    assert_eq!(draft.grand_total().unwrap(), Decimal::new(3050, 2));
  }

  #[test]
  fn draft_rejects_empty_cart_and_blank_place() {
    assert!(matches!(CheckoutDraft::build(&[], "x", None), Err(CartError::EmptyCart)));
    let cart = filled_cart();
    assert!(matches!(
      CheckoutDraft::build(cart.items(), " \t", None),
      Err(CartError::DeliveryPlaceRequired)
    ));
  }

  #[tokio::test]
  async fn empty_cart_never_reaches_submit() {
    let mut cart = CartStore::open(MemoryBackend::new()).unwrap();
    let called = Cell::new(false);
    let result = cart
      .settle_checkout("x", None, |_req| {
        called.set(true);
        async { Ok::<_, ServerDown>(()) }
      })
      .await;
    assert!(matches!(result, Err(CheckoutFailure::Invalid(CartError::EmptyCart))));
    assert!(!called.get());
  }

  #[tokio::test]
  async fn cart_is_cleared_only_after_success() {
    let mut cart = filled_cart();
    let failed = cart
      .settle_checkout("Depot", None, |_req| async { Err::<(), _>(ServerDown) })
      .await;
    assert!(matches!(failed, Err(CheckoutFailure::Submit(_))));
    assert_eq!(cart.item_count(), 2);

    let request = cart
      .settle_checkout("Depot", Some(Decimal::ZERO), |req| async move { Ok::<_, ServerDown>(req) })
      .await
      .unwrap();
    assert_eq!(request.items.len(), 2);
    assert_eq!(request.delivery_fee, Some(Decimal::ZERO));
    assert!(cart.is_empty());
  }

  /// Memory storage whose writes can be switched off.
  #[derive(Clone, Default)]
  struct FlakyBackend {
    inner: MemoryBackend,
    broken: Arc<AtomicBool>,
  }

  impl CartBackend for FlakyBackend {
    fn read_raw(&self) -> Result<Option<String>, CartError> {
      self.inner.read_raw()
    }

    fn write_raw(&self, raw: &str) -> Result<(), CartError> {
      if self.broken.load(Ordering::SeqCst) {
        return Err(CartError::Storage(std::io::Error::other("disk full")));
      }
      self.inner.write_raw(raw)
    }
  }

  #[tokio::test]
  async fn accepted_order_is_returned_even_if_clearing_fails() {
    let backend = FlakyBackend::default();
    let mut cart = CartStore::open(backend.clone()).unwrap();
    cart
      .add(ProductSnapshot {
        product_id: Uuid::new_v4(),
        name: "A".into(),
        price: Decimal::new(1000, 2),
        image: None,
      })
      .unwrap();
    backend.broken.store(true, Ordering::SeqCst);

    let outcome = cart
      .settle_checkout("Depot", None, |_req| async { Ok::<_, ServerDown>("order-123") })
      .await;
    assert_eq!(outcome.unwrap(), "order-123");
    assert!(cart.is_empty());
  }

  #[test]
  fn draft_with_unstorable_total_is_rejected() {
    let mut cart = CartStore::open(MemoryBackend::new()).unwrap();
    let huge = ProductSnapshot {
      product_id: Uuid::new_v4(),
      name: "Yacht".into(),
      price: Decimal::MAX,
      image: None,
    };
    cart.add(huge.clone()).unwrap();
    cart.add(huge).unwrap();
    assert!(matches!(
      CheckoutDraft::build(cart.items(), "Harbour", None),
      Err(CartError::TotalOutOfRange)
    ));
  }
}
