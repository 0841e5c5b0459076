// storefront/src/services/badge.rs

use tracing::instrument;

use crate::services::identity::CartKey;
use crate::store::{CartStore, StoreResult};

/// Item count for the cart badge: the summed quantity of the cart's active
/// lines, zero when the cart does not exist, and always zero on admin pages.
#[instrument(name = "badge::cart_count", skip(store, key), fields(cart_key = %key))]
pub async fn cart_count<S: CartStore + ?Sized>(
  store: &S,
  key: &CartKey,
  page_path: &str,
  admin_prefix: &str,
) -> StoreResult<i64> {
  if !admin_prefix.is_empty() && page_path.contains(admin_prefix) {
    return Ok(0);
  }
  match store.find_cart(key.as_str()).await? {
    Some(cart) => store.active_quantity(cart.id).await,
    None => Ok(0),
  }
}
