// storefront/src/cart/store.rs

use super::backend::CartBackend;
use super::CartError;
use crate::pricing;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use uuid::Uuid;

/// One cart entry. `price` is the snapshot taken when the product was first added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
  pub product_id: Uuid,
  pub name: String,
  pub price: Decimal,
  pub image: Option<String>,
  pub quantity: u32,
}

/// What the catalog shows about a product at the moment it is added.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSnapshot {
  pub product_id: Uuid,
  pub name: String,
  pub price: Decimal,
  pub image: Option<String>,
}

pub struct CartStore<B: CartBackend> {
  items: Vec<CartItem>,
  backend: B,
  count_tx: watch::Sender<usize>,
}

impl<B: CartBackend> CartStore<B> {
  /// Loads whatever the backend holds.
  pub fn open(backend: B) -> Result<Self, CartError> {
    let items = backend.load()?;
    let (count_tx, _) = watch::channel(items.len());
    Ok(Self {
      items,
      backend,
      count_tx,
    })
  }

  pub fn items(&self) -> &[CartItem] {
    &self.items
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  /// Number of entries, not the sum of quantities.
  pub fn item_count(&self) -> usize {
    self.items.len()
  }

  /// Receives the entry count after every mutation.
  pub fn subscribe(&self) -> watch::Receiver<usize> {
    self.count_tx.subscribe()
  }

  pub fn total(&self) -> Result<Decimal, CartError> {
    pricing::checked_sum(self.items.iter().map(|item| (item.price, item.quantity))).ok_or(CartError::TotalOutOfRange)
  }

  /// Appends with quantity 1, or bumps an existing entry by 1 keeping its original snapshot.
  pub fn add(&mut self, product: ProductSnapshot) -> Result<(), CartError> {
    match self.items.iter_mut().find(|i| i.product_id == product.product_id) {
      Some(existing) => existing.quantity = existing.quantity.saturating_add(1),
      None => self.items.push(CartItem {
        product_id: product.product_id,
        name: product.name,
        price: product.price,
        image: product.image,
        quantity: 1,
      }),
    }
    self.persist()
  }

  /// Sets the quantity, clamped to at least 1. Unknown ids are ignored.
  pub fn set_quantity(&mut self, product_id: Uuid, quantity: i64) -> Result<(), CartError> {
    let clamped = quantity.clamp(1, i64::from(u32::MAX)) as u32;
    if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) {
      item.quantity = clamped;
    }
    self.persist()
  }

  pub fn remove(&mut self, product_id: Uuid) -> Result<(), CartError> {
    self.items.retain(|i| i.product_id != product_id);
    self.persist()
  }

  pub fn clear(&mut self) -> Result<(), CartError> {
    self.items.clear();
    self.persist()
  }

  fn persist(&mut self) -> Result<(), CartError> {
    self.backend.save(&self.items)?;
    self.count_tx.send_replace(self.items.len());
    Ok(())
  }
}
