// storefront/src/pipelines/contexts.rs

//! Data structs the pipelines run over. Handlers receive them wrapped in
//! `flow::ContextData`.

use crate::models::{Account, Cart, CartItem, CartLine, NewAccount, Product, Variation};
use crate::services::accounts::AccountRequest;
use crate::services::identity::CartKey;
use crate::services::totals::CartSummary;
use crate::state::AppState;
use crate::store::LineDecrement;
use uuid::Uuid;

// --- Cart ---

#[derive(Clone)]
pub struct AddToCartCtxData {
  pub app_state: AppState,
  pub cart_key: CartKey,
  pub product_id: Uuid,
  /// Raw (category, value) pairs from the request body.
  pub selections: Vec<(String, String)>,

  // Filled in by the pipeline:
  pub product: Option<Product>,
  pub variations: Vec<Variation>,
  pub cart: Option<Cart>,
  pub updated_item: Option<CartItem>,
  pub line_created: bool,
}

impl AddToCartCtxData {
  pub fn new(app_state: AppState, cart_key: CartKey, product_id: Uuid, selections: Vec<(String, String)>) -> Self {
    Self {
      app_state,
      cart_key,
      product_id,
      selections,
      product: None,
      variations: Vec::new(),
      cart: None,
      updated_item: None,
      line_created: false,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalMode {
  /// Take one unit off; the line goes away at quantity one.
  Decrement,
  /// Drop the whole line.
  Delete,
}

#[derive(Clone)]
pub struct RemoveFromCartCtxData {
  pub app_state: AppState,
  pub cart_key: CartKey,
  pub product_id: Uuid,
  pub cart_item_id: Uuid,
  pub mode: RemovalMode,

  pub cart: Option<Cart>,
  pub outcome: Option<LineDecrement>,
}

impl RemoveFromCartCtxData {
  pub fn new(app_state: AppState, cart_key: CartKey, product_id: Uuid, cart_item_id: Uuid, mode: RemovalMode) -> Self {
    Self {
      app_state,
      cart_key,
      product_id,
      cart_item_id,
      mode,
      cart: None,
      outcome: None,
    }
  }
}

#[derive(Clone)]
pub struct CartSummaryCtxData {
  pub app_state: AppState,
  pub cart_key: CartKey,

  pub cart: Option<Cart>,
  pub lines: Vec<CartLine>,
  pub summary: Option<CartSummary>,
}

impl CartSummaryCtxData {
  pub fn new(app_state: AppState, cart_key: CartKey) -> Self {
    Self {
      app_state,
      cart_key,
      cart: None,
      lines: Vec::new(),
      summary: None,
    }
  }
}

// --- Accounts ---

#[derive(Clone)]
pub struct CreateAccountCtxData {
  pub app_state: AppState,
  pub request: AccountRequest,
  pub superuser: bool,

  pub prepared: Option<NewAccount>,
  pub created: Option<Account>,
}

impl CreateAccountCtxData {
  pub fn new(app_state: AppState, request: AccountRequest, superuser: bool) -> Self {
    Self {
      app_state,
      request,
      superuser,
      prepared: None,
      created: None,
    }
  }
}
