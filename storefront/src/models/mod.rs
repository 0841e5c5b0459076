// storefront/src/models/mod.rs

//! Data structures representing stored entities.

pub mod account;
pub mod cart;
pub mod category;
pub mod product;

pub use account::{Account, NewAccount};
pub use cart::{Cart, CartItem, CartLine, VariationSet};
pub use category::{Category, NewCategory};
pub use product::{NewProduct, NewVariation, Product, Variation, VariationCategory};

/// Lower-case, hyphen-separated form of `text` for use in URLs.
///
/// ASCII letters and digits are kept, every other run of characters becomes a
/// single hyphen, and leading/trailing hyphens are dropped.
pub fn slugify(text: &str) -> String {
  let mut slug = String::with_capacity(text.len());
  let mut pending_hyphen = false;
  for ch in text.chars() {
    if ch.is_ascii_alphanumeric() {
      if pending_hyphen && !slug.is_empty() {
        slug.push('-');
      }
      pending_hyphen = false;
      slug.push(ch.to_ascii_lowercase());
    } else {
      pending_hyphen = true;
    }
  }
  slug
}
