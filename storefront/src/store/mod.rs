// storefront/src/store/mod.rs

//! Storage interfaces for the catalog, carts and accounts.
//!
//! Implementations:
//! - [`PgStore`]: PostgreSQL via sqlx
//! - [`MemoryStore`]: in-process maps, for tests and database-less runs

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
  Account, Cart, CartItem, CartLine, Category, NewAccount, NewCategory, NewProduct, NewVariation, Product, Variation,
  VariationCategory, VariationSet,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  #[error("{entity} not found: {id}")]
  NotFound { entity: &'static str, id: String },

  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Invalid data: {0}")]
  Invalid(String),

  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),
}

impl StoreError {
  pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
    StoreError::NotFound {
      entity,
      id: id.to_string(),
    }
  }

  pub fn is_not_found(&self) -> bool {
    matches!(self, StoreError::NotFound { .. })
  }
}

/// Result of adding one unit of a product/variation combination to a cart.
#[derive(Debug, Clone)]
pub struct LineUpsert {
  pub item: CartItem,
  /// `true` when a new line was created, `false` when an existing one grew.
  pub created: bool,
}

/// Result of decrementing a cart line.
#[derive(Debug, Clone)]
pub enum LineDecrement {
  Decremented(CartItem),
  Removed { item_id: Uuid },
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
  async fn insert_category(&self, new: NewCategory) -> StoreResult<Category>;

  /// Ordered by name.
  async fn list_categories(&self) -> StoreResult<Vec<Category>>;

  async fn category_by_slug(&self, slug: &str) -> StoreResult<Category>;

  async fn category(&self, id: Uuid) -> StoreResult<Category>;

  async fn insert_product(&self, new: NewProduct) -> StoreResult<Product>;

  async fn product(&self, id: Uuid) -> StoreResult<Product>;

  async fn product_by_slugs(&self, category_slug: &str, product_slug: &str) -> StoreResult<Product>;

  /// Available products ordered by name, optionally limited to one category.
  async fn list_available_products(&self, category_id: Option<Uuid>) -> StoreResult<Vec<Product>>;

  async fn insert_variation(&self, new: NewVariation) -> StoreResult<Variation>;

  /// The active variation of `product_id` whose category and value match,
  /// ignoring case.
  async fn find_active_variation(
    &self,
    product_id: Uuid,
    category: VariationCategory,
    value: &str,
  ) -> StoreResult<Option<Variation>>;

  /// Active variations of a product, optionally of a single category.
  async fn active_variations(
    &self,
    product_id: Uuid,
    category: Option<VariationCategory>,
  ) -> StoreResult<Vec<Variation>>;
}

/// Cart persistence. Mutations are atomic per (cart, product, variation set).
#[async_trait]
pub trait CartStore: Send + Sync {
  async fn find_cart(&self, cart_key: &str) -> StoreResult<Option<Cart>>;

  async fn get_or_create_cart(&self, cart_key: &str) -> StoreResult<Cart>;

  /// Increments the active line matching (cart, product, variations) or
  /// creates it with quantity one.
  async fn add_line(&self, cart_id: Uuid, product_id: Uuid, variations: &VariationSet) -> StoreResult<LineUpsert>;

  /// Quantity above one drops by one; otherwise the line is deleted.
  async fn decrement_line(&self, cart_id: Uuid, product_id: Uuid, item_id: Uuid) -> StoreResult<LineDecrement>;

  async fn remove_line(&self, cart_id: Uuid, product_id: Uuid, item_id: Uuid) -> StoreResult<()>;

  /// Active lines in creation order, with product and variations attached.
  async fn active_lines(&self, cart_id: Uuid) -> StoreResult<Vec<CartLine>>;

  /// Sum of quantities over active lines.
  async fn active_quantity(&self, cart_id: Uuid) -> StoreResult<i64>;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
  async fn insert_account(&self, new: NewAccount) -> StoreResult<Account>;

  async fn account_by_email(&self, email: &str) -> StoreResult<Option<Account>>;
}

/// Everything the application needs from storage.
pub trait Store: CatalogStore + CartStore + AccountStore {}

impl<T: CatalogStore + CartStore + AccountStore> Store for T {}
