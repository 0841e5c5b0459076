// storefront/src/models/account.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

pub const ACCOUNT_FIELD_MAX: usize = 50;

/// A customer or staff account. Email is the login identifier.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
  pub id: Uuid,
  pub first_name: String,
  pub last_name: String,
  pub username: String,
  pub email: String,
  pub phone_number: String,
  #[serde(skip_serializing)] // Never send password hash to client
  pub password_hash: String,
  pub date_joined: DateTime<Utc>,
  pub last_login: DateTime<Utc>,
  pub is_admin: bool,
  pub is_staff: bool,
  pub is_active: bool,
  pub is_superadmin: bool,
}

impl Account {
  /// Admins hold every permission; nobody else holds any.
  pub fn has_perm(&self, _perm: &str) -> bool {
    self.is_admin
  }

  pub fn has_module_perms(&self, _app_label: &str) -> bool {
    true
  }
}

impl fmt::Display for Account {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.email)
  }
}

/// Validated, hashed input ready to be stored.
#[derive(Debug, Clone)]
pub struct NewAccount {
  pub first_name: String,
  pub last_name: String,
  pub username: String,
  pub email: String,
  pub phone_number: String,
  pub password_hash: String,
  pub is_admin: bool,
  pub is_staff: bool,
  pub is_active: bool,
  pub is_superadmin: bool,
}
