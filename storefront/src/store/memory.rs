// storefront/src/store/memory.rs

//! In-memory store. Every mutation runs under one write lock, which gives the
//! same per-line atomicity the PostgreSQL store gets from upserts and row locks.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use super::{AccountStore, CartStore, CatalogStore, LineDecrement, LineUpsert, StoreError, StoreResult};
use crate::models::{
  Account, Cart, CartItem, CartLine, Category, NewAccount, NewCategory, NewProduct, NewVariation, Product, Variation,
  VariationCategory, VariationSet,
};

#[derive(Default)]
struct MemoryState {
  categories: Vec<Category>,
  products: Vec<Product>,
  variations: Vec<Variation>,
  carts: Vec<Cart>,
  items: Vec<CartItem>,
  item_variations: HashMap<Uuid, Vec<Uuid>>,
  accounts: Vec<Account>,
}

impl MemoryState {
  fn product(&self, id: Uuid) -> StoreResult<&Product> {
    self
      .products
      .iter()
      .find(|p| p.id == id)
      .ok_or_else(|| StoreError::not_found("Product", id))
  }

  fn line_for(&self, item: &CartItem) -> Option<CartLine> {
    let product = self.products.iter().find(|p| p.id == item.product_id)?.clone();
    let variations = self
      .item_variations
      .get(&item.id)
      .map(|ids| {
        self
          .variations
          .iter()
          .filter(|v| ids.contains(&v.id))
          .cloned()
          .collect()
      })
      .unwrap_or_default();
    Some(CartLine {
      item: item.clone(),
      product,
      variations,
    })
  }

  fn item_position(&self, cart_id: Uuid, product_id: Uuid, item_id: Uuid) -> StoreResult<usize> {
    self
      .items
      .iter()
      .position(|i| i.id == item_id && i.cart_id == cart_id && i.product_id == product_id)
      .ok_or_else(|| StoreError::not_found("Cart item", item_id))
  }
}

#[derive(Default)]
pub struct MemoryStore {
  state: RwLock<MemoryState>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Number of stored cart lines, active or not.
  pub fn line_count(&self) -> usize {
    self.state.read().items.len()
  }
}

#[async_trait]
impl CatalogStore for MemoryStore {
  async fn insert_category(&self, new: NewCategory) -> StoreResult<Category> {
    new.validate().map_err(StoreError::Invalid)?;
    let slug = new.resolved_slug();
    let mut state = self.state.write();
    if state
      .categories
      .iter()
      .any(|c| c.category_name == new.category_name || c.slug == slug)
    {
      return Err(StoreError::Conflict(format!(
        "Category '{}' or slug '{}' already exists.",
        new.category_name, slug
      )));
    }
    let category = Category {
      id: Uuid::new_v4(),
      category_name: new.category_name,
      slug,
      description: new.description,
      cat_image: new.cat_image,
    };
    state.categories.push(category.clone());
    Ok(category)
  }

  async fn list_categories(&self) -> StoreResult<Vec<Category>> {
    let mut categories = self.state.read().categories.clone();
    categories.sort_by(|a, b| a.category_name.cmp(&b.category_name));
    Ok(categories)
  }

  async fn category_by_slug(&self, slug: &str) -> StoreResult<Category> {
    self
      .state
      .read()
      .categories
      .iter()
      .find(|c| c.slug == slug)
      .cloned()
      .ok_or_else(|| StoreError::not_found("Category", slug))
  }

  async fn category(&self, id: Uuid) -> StoreResult<Category> {
    self
      .state
      .read()
      .categories
      .iter()
      .find(|c| c.id == id)
      .cloned()
      .ok_or_else(|| StoreError::not_found("Category", id))
  }

  async fn insert_product(&self, new: NewProduct) -> StoreResult<Product> {
    new.validate().map_err(StoreError::Invalid)?;
    let slug = new.resolved_slug();
    let mut state = self.state.write();
    if !state.categories.iter().any(|c| c.id == new.category_id) {
      return Err(StoreError::not_found("Category", new.category_id));
    }
    if state
      .products
      .iter()
      .any(|p| p.product_name == new.product_name || p.slug == slug)
    {
      return Err(StoreError::Conflict(format!(
        "Product '{}' or slug '{}' already exists.",
        new.product_name, slug
      )));
    }
    let now = Utc::now();
    let product = Product {
      id: Uuid::new_v4(),
      category_id: new.category_id,
      product_name: new.product_name,
      slug,
      description: new.description,
      price_cents: new.price_cents,
      images: new.images,
      stock: new.stock,
      is_available: new.is_available,
      created_date: now,
      modified_date: now,
    };
    state.products.push(product.clone());
    Ok(product)
  }

  async fn product(&self, id: Uuid) -> StoreResult<Product> {
    self.state.read().product(id).cloned()
  }

  async fn product_by_slugs(&self, category_slug: &str, product_slug: &str) -> StoreResult<Product> {
    let state = self.state.read();
    let category = state
      .categories
      .iter()
      .find(|c| c.slug == category_slug)
      .ok_or_else(|| StoreError::not_found("Category", category_slug))?;
    state
      .products
      .iter()
      .find(|p| p.category_id == category.id && p.slug == product_slug)
      .cloned()
      .ok_or_else(|| StoreError::not_found("Product", product_slug))
  }

  async fn list_available_products(&self, category_id: Option<Uuid>) -> StoreResult<Vec<Product>> {
    let mut products: Vec<Product> = self
      .state
      .read()
      .products
      .iter()
      .filter(|p| p.is_available && category_id.map_or(true, |id| p.category_id == id))
      .cloned()
      .collect();
    products.sort_by(|a, b| a.product_name.cmp(&b.product_name));
    Ok(products)
  }

  async fn insert_variation(&self, new: NewVariation) -> StoreResult<Variation> {
    if new.variation_value.trim().is_empty() {
      return Err(StoreError::Invalid("Variation value cannot be empty.".to_string()));
    }
    let mut state = self.state.write();
    state.product(new.product_id)?;
    let variation = Variation {
      id: Uuid::new_v4(),
      product_id: new.product_id,
      variation_category: new.variation_category,
      variation_value: new.variation_value,
      is_active: new.is_active,
      created_date: Utc::now(),
    };
    state.variations.push(variation.clone());
    Ok(variation)
  }

  async fn find_active_variation(
    &self,
    product_id: Uuid,
    category: VariationCategory,
    value: &str,
  ) -> StoreResult<Option<Variation>> {
    Ok(
      self
        .state
        .read()
        .variations
        .iter()
        .find(|v| v.product_id == product_id && v.is_active && v.matches(category, value))
        .cloned(),
    )
  }

  async fn active_variations(
    &self,
    product_id: Uuid,
    category: Option<VariationCategory>,
  ) -> StoreResult<Vec<Variation>> {
    Ok(
      self
        .state
        .read()
        .variations
        .iter()
        .filter(|v| v.product_id == product_id && v.is_active)
        .filter(|v| category.map_or(true, |c| v.variation_category == c))
        .cloned()
        .collect(),
    )
  }
}

#[async_trait]
impl CartStore for MemoryStore {
  async fn find_cart(&self, cart_key: &str) -> StoreResult<Option<Cart>> {
    Ok(self.state.read().carts.iter().find(|c| c.cart_key == cart_key).cloned())
  }

  async fn get_or_create_cart(&self, cart_key: &str) -> StoreResult<Cart> {
    let mut state = self.state.write();
    if let Some(cart) = state.carts.iter().find(|c| c.cart_key == cart_key) {
      return Ok(cart.clone());
    }
    let cart = Cart {
      id: Uuid::new_v4(),
      cart_key: cart_key.to_string(),
      date_added: Utc::now().date_naive(),
    };
    state.carts.push(cart.clone());
    Ok(cart)
  }

  async fn add_line(&self, cart_id: Uuid, product_id: Uuid, variations: &VariationSet) -> StoreResult<LineUpsert> {
    let key = variations.key();
    let mut state = self.state.write();
    if !state.carts.iter().any(|c| c.id == cart_id) {
      return Err(StoreError::not_found("Cart", cart_id));
    }
    state.product(product_id)?;

    if let Some(existing) = state
      .items
      .iter_mut()
      .find(|i| i.cart_id == cart_id && i.product_id == product_id && i.is_active && i.variation_key == key)
    {
      existing.quantity += 1;
      return Ok(LineUpsert {
        item: existing.clone(),
        created: false,
      });
    }

    let item = CartItem {
      id: Uuid::new_v4(),
      cart_id,
      product_id,
      variation_key: key,
      quantity: 1,
      is_active: true,
      created_at: Utc::now(),
    };
    if !variations.is_empty() {
      state.item_variations.insert(item.id, variations.ids());
    }
    state.items.push(item.clone());
    Ok(LineUpsert { item, created: true })
  }

  async fn decrement_line(&self, cart_id: Uuid, product_id: Uuid, item_id: Uuid) -> StoreResult<LineDecrement> {
    let mut state = self.state.write();
    let idx = state.item_position(cart_id, product_id, item_id)?;
    if state.items[idx].quantity > 1 {
      state.items[idx].quantity -= 1;
      return Ok(LineDecrement::Decremented(state.items[idx].clone()));
    }
    state.items.remove(idx);
    state.item_variations.remove(&item_id);
    Ok(LineDecrement::Removed { item_id })
  }

  async fn remove_line(&self, cart_id: Uuid, product_id: Uuid, item_id: Uuid) -> StoreResult<()> {
    let mut state = self.state.write();
    let idx = state.item_position(cart_id, product_id, item_id)?;
    state.items.remove(idx);
    state.item_variations.remove(&item_id);
    Ok(())
  }

  async fn active_lines(&self, cart_id: Uuid) -> StoreResult<Vec<CartLine>> {
    let state = self.state.read();
    Ok(
      state
        .items
        .iter()
        .filter(|i| i.cart_id == cart_id && i.is_active)
        .filter_map(|i| state.line_for(i))
        .collect(),
    )
  }

  async fn active_quantity(&self, cart_id: Uuid) -> StoreResult<i64> {
    Ok(
      self
        .state
        .read()
        .items
        .iter()
        .filter(|i| i.cart_id == cart_id && i.is_active)
        .map(|i| i64::from(i.quantity))
        .sum(),
    )
  }
}

#[async_trait]
impl AccountStore for MemoryStore {
  async fn insert_account(&self, new: NewAccount) -> StoreResult<Account> {
    let mut state = self.state.write();
    if state
      .accounts
      .iter()
      .any(|a| a.email == new.email || a.username == new.username)
    {
      return Err(StoreError::Conflict(format!(
        "An account with email '{}' or username '{}' already exists.",
        new.email, new.username
      )));
    }
    let now = Utc::now();
    let account = Account {
      id: Uuid::new_v4(),
      first_name: new.first_name,
      last_name: new.last_name,
      username: new.username,
      email: new.email,
      phone_number: new.phone_number,
      password_hash: new.password_hash,
      date_joined: now,
      last_login: now,
      is_admin: new.is_admin,
      is_staff: new.is_staff,
      is_active: new.is_active,
      is_superadmin: new.is_superadmin,
    };
    state.accounts.push(account.clone());
    Ok(account)
  }

  async fn account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
    Ok(self.state.read().accounts.iter().find(|a| a.email == email).cloned())
  }
}
