// storefront/src/cart/backend.rs

use super::store::CartItem;
use super::CartError;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

/// Persistence for the full cart collection.
pub trait CartBackend: Send + Sync {
  /// Raw stored representation, `None` when nothing was stored yet.
  fn read_raw(&self) -> Result<Option<String>, CartError>;
  fn write_raw(&self, raw: &str) -> Result<(), CartError>;

  /// Stored items. A corrupted representation loads as an empty cart.
  fn load(&self) -> Result<Vec<CartItem>, CartError> {
    let Some(raw) = self.read_raw()? else {
      return Ok(Vec::new());
    };
    match serde_json::from_str::<Vec<CartItem>>(&raw) {
      Ok(items) => Ok(items),
      Err(e) => {
        warn!(error = %e, "Stored cart is corrupted; starting with an empty cart.");
        Ok(Vec::new())
      }
    }
  }

  fn save(&self, items: &[CartItem]) -> Result<(), CartError> {
    let raw = serde_json::to_string(items)?;
    self.write_raw(&raw)
  }
}

/// In-memory storage; clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
  slot: Arc<Mutex<Option<String>>>,
}

impl MemoryBackend {
  pub fn new() -> Self {
    Self::default()
  }

  /// Starts with an arbitrary stored string, valid or not.
  pub fn with_raw(raw: impl Into<String>) -> Self {
    Self {
      slot: Arc::new(Mutex::new(Some(raw.into()))),
    }
  }
}

impl CartBackend for MemoryBackend {
  fn read_raw(&self) -> Result<Option<String>, CartError> {
    Ok(self.slot.lock().clone())
  }

  fn write_raw(&self, raw: &str) -> Result<(), CartError> {
    *self.slot.lock() = Some(raw.to_string());
    Ok(())
  }
}

/// JSON file storage. A missing file is an empty cart.
#[derive(Debug, Clone)]
pub struct FileBackend {
  path: PathBuf,
}

impl FileBackend {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }
}

impl CartBackend for FileBackend {
  fn read_raw(&self) -> Result<Option<String>, CartError> {
    match std::fs::read_to_string(&self.path) {
      Ok(raw) => Ok(Some(raw)),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(CartError::Storage(e)),
    }
  }

  fn write_raw(&self, raw: &str) -> Result<(), CartError> {
    if let Some(parent) = self.path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    let tmp = self.path.with_extension("tmp");
    std::fs::write(&tmp, raw)?;
    std::fs::rename(&tmp, &self.path)?;
    Ok(())
  }
}
