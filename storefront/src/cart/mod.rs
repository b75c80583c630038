// storefront/src/cart/mod.rs

//! Client-held shopping cart.
//!
//! The cart lives on the client, never on the server. [`CartStore`] keeps the
//! items, writes the whole collection through a [`CartBackend`] after every
//! change and publishes the new entry count on a `watch` channel.

pub mod backend;
pub mod checkout;
pub mod store;

pub use backend::{CartBackend, FileBackend, MemoryBackend};
pub use checkout::{CheckoutDraft, CheckoutFailure, DEFAULT_DELIVERY_FEE};
pub use store::{CartItem, CartStore, ProductSnapshot};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CartError {
  #[error("empty cart")]
  EmptyCart,

  #[error("delivery place required")]
  DeliveryPlaceRequired,

  #[error("cart total out of range")]
  TotalOutOfRange,

  #[error("Cart storage failed: {0}")]
  Storage(#[from] std::io::Error),

  #[error("Cart serialization failed: {0}")]
  Serialization(#[from] serde_json::Error),
}
