// storefront/src/store/postgres.rs

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{AccountStore, CartStore, CatalogStore, LineDecrement, LineUpsert, StoreError, StoreResult};
use crate::models::{
  Account, Cart, CartItem, CartLine, Category, NewAccount, NewCategory, NewProduct, NewVariation, Product, Variation,
  VariationCategory, VariationSet,
};

const CATEGORY_COLUMNS: &str = "id, category_name, slug, description, cat_image";
const PRODUCT_COLUMNS: &str = "id, category_id, product_name, slug, description, price_cents, images, stock, \
                               is_available, created_date, modified_date";
const VARIATION_COLUMNS: &str = "id, product_id, variation_category, variation_value, is_active, created_date";
const CART_ITEM_COLUMNS: &str = "id, cart_id, product_id, variation_key, quantity, is_active, created_at";
const ACCOUNT_COLUMNS: &str = "id, first_name, last_name, username, email, phone_number, password_hash, date_joined, \
                               last_login, is_admin, is_staff, is_active, is_superadmin";

#[derive(FromRow)]
struct UpsertedItem {
  #[sqlx(flatten)]
  item: CartItem,
  inserted: bool,
}

#[derive(FromRow)]
struct ItemVariation {
  cart_item_id: Uuid,
  #[sqlx(flatten)]
  variation: Variation,
}

/// Turns constraint violations into domain errors; `what` names the entity
/// whose write failed.
fn map_write_err(err: sqlx::Error, what: &'static str) -> StoreError {
  if let sqlx::Error::Database(db_err) = &err {
    if db_err.is_unique_violation() {
      return StoreError::Conflict(format!("{} already exists ({}).", what, db_err.message()));
    }
    if db_err.is_foreign_key_violation() {
      let referenced = db_err.constraint().unwrap_or("reference").to_string();
      return StoreError::NotFound {
        entity: what,
        id: format!("referenced row missing ({})", referenced),
      };
    }
    if db_err.is_check_violation() {
      return StoreError::Invalid(db_err.message().to_string());
    }
  }
  StoreError::Database(err)
}

#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  /// Applies the embedded migrations under `storefront/migrations`.
  pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(&self.pool).await
  }
}

#[async_trait]
impl CatalogStore for PgStore {
  #[instrument(name = "pg::insert_category", skip(self, new), fields(name = %new.category_name))]
  async fn insert_category(&self, new: NewCategory) -> StoreResult<Category> {
    new.validate().map_err(StoreError::Invalid)?;
    let sql = format!(
      "INSERT INTO categories (id, category_name, slug, description, cat_image) VALUES ($1, $2, $3, $4, $5) \
       RETURNING {}",
      CATEGORY_COLUMNS
    );
    sqlx::query_as::<_, Category>(&sql)
      .bind(Uuid::new_v4())
      .bind(&new.category_name)
      .bind(new.resolved_slug())
      .bind(&new.description)
      .bind(&new.cat_image)
      .fetch_one(&self.pool)
      .await
      .map_err(|e| map_write_err(e, "Category"))
  }

  async fn list_categories(&self) -> StoreResult<Vec<Category>> {
    let sql = format!("SELECT {} FROM categories ORDER BY category_name ASC", CATEGORY_COLUMNS);
    Ok(sqlx::query_as::<_, Category>(&sql).fetch_all(&self.pool).await?)
  }

  async fn category_by_slug(&self, slug: &str) -> StoreResult<Category> {
    let sql = format!("SELECT {} FROM categories WHERE slug = $1", CATEGORY_COLUMNS);
    sqlx::query_as::<_, Category>(&sql)
      .bind(slug)
      .fetch_optional(&self.pool)
      .await?
      .ok_or_else(|| StoreError::not_found("Category", slug))
  }

  async fn category(&self, id: Uuid) -> StoreResult<Category> {
    let sql = format!("SELECT {} FROM categories WHERE id = $1", CATEGORY_COLUMNS);
    sqlx::query_as::<_, Category>(&sql)
      .bind(id)
      .fetch_optional(&self.pool)
      .await?
      .ok_or_else(|| StoreError::not_found("Category", id))
  }

  #[instrument(name = "pg::insert_product", skip(self, new), fields(name = %new.product_name))]
  async fn insert_product(&self, new: NewProduct) -> StoreResult<Product> {
    new.validate().map_err(StoreError::Invalid)?;
    let sql = format!(
      "INSERT INTO products (id, category_id, product_name, slug, description, price_cents, images, stock, \
       is_available) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}",
      PRODUCT_COLUMNS
    );
    sqlx::query_as::<_, Product>(&sql)
      .bind(Uuid::new_v4())
      .bind(new.category_id)
      .bind(&new.product_name)
      .bind(new.resolved_slug())
      .bind(&new.description)
      .bind(new.price_cents)
      .bind(&new.images)
      .bind(new.stock)
      .bind(new.is_available)
      .fetch_one(&self.pool)
      .await
      .map_err(|e| map_write_err(e, "Product"))
  }

  async fn product(&self, id: Uuid) -> StoreResult<Product> {
    let sql = format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS);
    sqlx::query_as::<_, Product>(&sql)
      .bind(id)
      .fetch_optional(&self.pool)
      .await?
      .ok_or_else(|| StoreError::not_found("Product", id))
  }

  async fn product_by_slugs(&self, category_slug: &str, product_slug: &str) -> StoreResult<Product> {
    let sql = format!(
      "SELECT {} FROM products WHERE slug = $2 AND category_id = \
       (SELECT c.id FROM categories c WHERE c.slug = $1)",
      PRODUCT_COLUMNS
    );
    sqlx::query_as::<_, Product>(&sql)
      .bind(category_slug)
      .bind(product_slug)
      .fetch_optional(&self.pool)
      .await?
      .ok_or_else(|| StoreError::not_found("Product", format!("{}/{}", category_slug, product_slug)))
  }

  async fn list_available_products(&self, category_id: Option<Uuid>) -> StoreResult<Vec<Product>> {
    let sql = format!(
      "SELECT {} FROM products WHERE is_available AND ($1::uuid IS NULL OR category_id = $1) \
       ORDER BY product_name ASC",
      PRODUCT_COLUMNS
    );
    Ok(
      sqlx::query_as::<_, Product>(&sql)
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?,
    )
  }

  async fn insert_variation(&self, new: NewVariation) -> StoreResult<Variation> {
    if new.variation_value.trim().is_empty() {
      return Err(StoreError::Invalid("Variation value cannot be empty.".to_string()));
    }
    let sql = format!(
      "INSERT INTO variations (id, product_id, variation_category, variation_value, is_active) \
       VALUES ($1, $2, $3, $4, $5) RETURNING {}",
      VARIATION_COLUMNS
    );
    sqlx::query_as::<_, Variation>(&sql)
      .bind(Uuid::new_v4())
      .bind(new.product_id)
      .bind(new.variation_category)
      .bind(&new.variation_value)
      .bind(new.is_active)
      .fetch_one(&self.pool)
      .await
      .map_err(|e| map_write_err(e, "Variation"))
  }

  async fn find_active_variation(
    &self,
    product_id: Uuid,
    category: VariationCategory,
    value: &str,
  ) -> StoreResult<Option<Variation>> {
    // Case folding happens in Rust so both stores agree whatever the
    // database collation.
    let sql = format!(
      "SELECT {} FROM variations WHERE product_id = $1 AND variation_category = $2 \
       AND is_active ORDER BY created_date",
      VARIATION_COLUMNS
    );
    let candidates = sqlx::query_as::<_, Variation>(&sql)
      .bind(product_id)
      .bind(category)
      .fetch_all(&self.pool)
      .await?;
    Ok(candidates.into_iter().find(|v| v.matches(category, value)))
  }

  async fn active_variations(
    &self,
    product_id: Uuid,
    category: Option<VariationCategory>,
  ) -> StoreResult<Vec<Variation>> {
    let sql = format!(
      "SELECT {} FROM variations WHERE product_id = $1 AND is_active \
       AND ($2::variation_category_enum IS NULL OR variation_category = $2) ORDER BY created_date",
      VARIATION_COLUMNS
    );
    Ok(
      sqlx::query_as::<_, Variation>(&sql)
        .bind(product_id)
        .bind(category)
        .fetch_all(&self.pool)
        .await?,
    )
  }
}

#[async_trait]
impl CartStore for PgStore {
  async fn find_cart(&self, cart_key: &str) -> StoreResult<Option<Cart>> {
    Ok(
      sqlx::query_as::<_, Cart>("SELECT id, cart_key, date_added FROM carts WHERE cart_key = $1")
        .bind(cart_key)
        .fetch_optional(&self.pool)
        .await?,
    )
  }

  async fn get_or_create_cart(&self, cart_key: &str) -> StoreResult<Cart> {
    // The no-op update makes RETURNING yield the existing row on conflict.
    Ok(
      sqlx::query_as::<_, Cart>(
        "INSERT INTO carts (id, cart_key) VALUES ($1, $2) \
         ON CONFLICT (cart_key) DO UPDATE SET cart_key = EXCLUDED.cart_key \
         RETURNING id, cart_key, date_added",
      )
      .bind(Uuid::new_v4())
      .bind(cart_key)
      .fetch_one(&self.pool)
      .await?,
    )
  }

  #[instrument(name = "pg::add_line", skip(self, variations), fields(variation_count = variations.len()))]
  async fn add_line(&self, cart_id: Uuid, product_id: Uuid, variations: &VariationSet) -> StoreResult<LineUpsert> {
    let mut tx = self.pool.begin().await?;

    let sql = format!(
      "INSERT INTO cart_items (id, cart_id, product_id, variation_key, quantity) VALUES ($1, $2, $3, $4, 1) \
       ON CONFLICT (cart_id, product_id, variation_key) WHERE is_active \
       DO UPDATE SET quantity = cart_items.quantity + 1 \
       RETURNING {}, (xmax = 0) AS inserted",
      CART_ITEM_COLUMNS
    );
    let upserted = sqlx::query_as::<_, UpsertedItem>(&sql)
      .bind(Uuid::new_v4())
      .bind(cart_id)
      .bind(product_id)
      .bind(variations.key())
      .fetch_one(&mut *tx)
      .await
      .map_err(|e| map_write_err(e, "Cart item"))?;

    if upserted.inserted && !variations.is_empty() {
      sqlx::query(
        "INSERT INTO cart_item_variations (cart_item_id, variation_id) \
         SELECT $1, UNNEST($2::uuid[]) ON CONFLICT DO NOTHING",
      )
      .bind(upserted.item.id)
      .bind(variations.ids())
      .execute(&mut *tx)
      .await
      .map_err(|e| map_write_err(e, "Cart item variation"))?;
    }

    tx.commit().await?;
    debug!(item_id = %upserted.item.id, quantity = upserted.item.quantity, created = upserted.inserted, "Cart line upserted.");
    Ok(LineUpsert {
      item: upserted.item,
      created: upserted.inserted,
    })
  }

  #[instrument(name = "pg::decrement_line", skip(self))]
  async fn decrement_line(&self, cart_id: Uuid, product_id: Uuid, item_id: Uuid) -> StoreResult<LineDecrement> {
    let mut tx = self.pool.begin().await?;

    let select = format!(
      "SELECT {} FROM cart_items WHERE id = $1 AND cart_id = $2 AND product_id = $3 FOR UPDATE",
      CART_ITEM_COLUMNS
    );
    let item = sqlx::query_as::<_, CartItem>(&select)
      .bind(item_id)
      .bind(cart_id)
      .bind(product_id)
      .fetch_optional(&mut *tx)
      .await?
      .ok_or_else(|| StoreError::not_found("Cart item", item_id))?;

    let outcome = if item.quantity > 1 {
      let update = format!(
        "UPDATE cart_items SET quantity = quantity - 1 WHERE id = $1 RETURNING {}",
        CART_ITEM_COLUMNS
      );
      let updated = sqlx::query_as::<_, CartItem>(&update)
        .bind(item_id)
        .fetch_one(&mut *tx)
        .await?;
      LineDecrement::Decremented(updated)
    } else {
      sqlx::query("DELETE FROM cart_items WHERE id = $1")
        .bind(item_id)
        .execute(&mut *tx)
        .await?;
      LineDecrement::Removed { item_id }
    };

    tx.commit().await?;
    Ok(outcome)
  }

  #[instrument(name = "pg::remove_line", skip(self))]
  async fn remove_line(&self, cart_id: Uuid, product_id: Uuid, item_id: Uuid) -> StoreResult<()> {
    let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND cart_id = $2 AND product_id = $3")
      .bind(item_id)
      .bind(cart_id)
      .bind(product_id)
      .execute(&self.pool)
      .await?;
    if result.rows_affected() == 0 {
      return Err(StoreError::not_found("Cart item", item_id));
    }
    Ok(())
  }

  async fn active_lines(&self, cart_id: Uuid) -> StoreResult<Vec<CartLine>> {
    let items_sql = format!(
      "SELECT {} FROM cart_items WHERE cart_id = $1 AND is_active ORDER BY created_at, id",
      CART_ITEM_COLUMNS
    );
    let items = sqlx::query_as::<_, CartItem>(&items_sql)
      .bind(cart_id)
      .fetch_all(&self.pool)
      .await?;
    if items.is_empty() {
      return Ok(Vec::new());
    }

    let product_ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
    let products_sql = format!("SELECT {} FROM products WHERE id = ANY($1)", PRODUCT_COLUMNS);
    let products: HashMap<Uuid, Product> = sqlx::query_as::<_, Product>(&products_sql)
      .bind(&product_ids)
      .fetch_all(&self.pool)
      .await?
      .into_iter()
      .map(|p| (p.id, p))
      .collect();

    let item_ids: Vec<Uuid> = items.iter().map(|i| i.id).collect();
    let variations_sql = format!(
      "SELECT civ.cart_item_id, {} FROM cart_item_variations civ \
       JOIN variations ON variations.id = civ.variation_id WHERE civ.cart_item_id = ANY($1) \
       ORDER BY created_date",
      VARIATION_COLUMNS
    );
    let mut variations_by_item: HashMap<Uuid, Vec<Variation>> = HashMap::new();
    for row in sqlx::query_as::<_, ItemVariation>(&variations_sql)
      .bind(&item_ids)
      .fetch_all(&self.pool)
      .await?
    {
      variations_by_item.entry(row.cart_item_id).or_default().push(row.variation);
    }

    Ok(
      items
        .into_iter()
        .filter_map(|item| {
          let product = products.get(&item.product_id)?.clone();
          let variations = variations_by_item.remove(&item.id).unwrap_or_default();
          Some(CartLine {
            item,
            product,
            variations,
          })
        })
        .collect(),
    )
  }

  async fn active_quantity(&self, cart_id: Uuid) -> StoreResult<i64> {
    Ok(
      sqlx::query_scalar::<_, i64>(
        "SELECT COALESCE(SUM(quantity), 0)::BIGINT FROM cart_items WHERE cart_id = $1 AND is_active",
      )
      .bind(cart_id)
      .fetch_one(&self.pool)
      .await?,
    )
  }
}

#[async_trait]
impl AccountStore for PgStore {
  #[instrument(name = "pg::insert_account", skip(self, new), fields(username = %new.username))]
  async fn insert_account(&self, new: NewAccount) -> StoreResult<Account> {
    let sql = format!(
      "INSERT INTO accounts (id, first_name, last_name, username, email, phone_number, password_hash, is_admin, \
       is_staff, is_active, is_superadmin) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING {}",
      ACCOUNT_COLUMNS
    );
    sqlx::query_as::<_, Account>(&sql)
      .bind(Uuid::new_v4())
      .bind(&new.first_name)
      .bind(&new.last_name)
      .bind(&new.username)
      .bind(&new.email)
      .bind(&new.phone_number)
      .bind(&new.password_hash)
      .bind(new.is_admin)
      .bind(new.is_staff)
      .bind(new.is_active)
      .bind(new.is_superadmin)
      .fetch_one(&self.pool)
      .await
      .map_err(|e| map_write_err(e, "Account"))
  }

  async fn account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
    let sql = format!("SELECT {} FROM accounts WHERE email = $1", ACCOUNT_COLUMNS);
    Ok(
      sqlx::query_as::<_, Account>(&sql)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?,
    )
  }
}
