// storefront/src/services/identity.rs

//! Cart identity: an opaque key carried in the caller's cookie.

use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Longest key accepted from a client; matches the `carts.cart_key` column.
pub const CART_KEY_MAX: usize = 250;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CartKey(String);

impl CartKey {
  /// A fresh random key of 32 lowercase hex characters.
  pub fn mint() -> Self {
    CartKey(Uuid::new_v4().simple().to_string())
  }

  /// Accepts a client-supplied key if it is non-empty printable ASCII without
  /// whitespace and fits the storage column.
  pub fn parse(raw: &str) -> Option<Self> {
    let raw = raw.trim();
    let valid = !raw.is_empty()
      && raw.len() <= CART_KEY_MAX
      && raw.chars().all(|c| c.is_ascii_graphic() && c != ';' && c != ',');
    valid.then(|| CartKey(raw.to_string()))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for CartKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Outcome of resolving the caller's cart key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedKey {
  pub key: CartKey,
  /// `true` when no usable key was presented and a new one was created; the
  /// caller must hand it back to the client.
  pub minted: bool,
}

/// Returns the presented key, or mints one when it is absent or unusable.
/// Never fails.
pub fn resolve(presented: Option<&str>) -> ResolvedKey {
  match presented.and_then(CartKey::parse) {
    Some(key) => ResolvedKey { key, minted: false },
    None => {
      let key = CartKey::mint();
      tracing::debug!(cart_key = %key, "Minted new cart key.");
      ResolvedKey { key, minted: true }
    }
  }
}
