// storefront/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

pub const DEFAULT_TAX_BASIS_POINTS: u32 = 300;
pub const DEFAULT_ADMIN_PATH_PREFIX: &str = "/admin";
pub const DEFAULT_CART_COOKIE_NAME: &str = "storefront_cart";

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  /// Absent means the in-memory store is used.
  pub database_url: Option<String>,

  /// Tax rate applied to cart totals, in hundredths of a percent.
  pub tax_basis_points: u32,
  /// Pages whose path contains this prefix get a zero cart badge.
  pub admin_path_prefix: String,
  pub cart_cookie_name: String,

  pub run_migrations: bool,
  pub seed_db: bool,
  pub seed_admin_email: Option<String>,
  pub seed_admin_password: Option<String>,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 8080,
      database_url: None,
      tax_basis_points: DEFAULT_TAX_BASIS_POINTS,
      admin_path_prefix: DEFAULT_ADMIN_PATH_PREFIX.to_string(),
      cart_cookie_name: DEFAULT_CART_COOKIE_NAME.to_string(),
      run_migrations: true,
      seed_db: false,
      seed_admin_email: None,
      seed_admin_password: None,
    }
  }
}

fn parse_var<T>(name: &str, raw: Option<String>, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match raw {
    None => Ok(default),
    Some(value) => value
      .trim()
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", name, value, e))),
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the configuration from any variable source. Empty values count as
  /// unset.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get_env = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
    let defaults = Self::default();

    let server_host = get_env("SERVER_HOST").unwrap_or(defaults.server_host);
    let server_port = parse_var("SERVER_PORT", get_env("SERVER_PORT"), defaults.server_port)?;
    let database_url = get_env("DATABASE_URL");

    let tax_basis_points = parse_var(
      "CART_TAX_BASIS_POINTS",
      get_env("CART_TAX_BASIS_POINTS"),
      defaults.tax_basis_points,
    )?;
    if tax_basis_points > 10_000 {
      return Err(AppError::Config(format!(
        "CART_TAX_BASIS_POINTS must be at most 10000, got {}",
        tax_basis_points
      )));
    }

    let admin_path_prefix = get_env("ADMIN_PATH_PREFIX").unwrap_or(defaults.admin_path_prefix);
    let cart_cookie_name = get_env("CART_COOKIE_NAME").unwrap_or(defaults.cart_cookie_name);
    if cart_cookie_name.contains(|c: char| c.is_whitespace() || c == ';' || c == '=' || c == ',') {
      return Err(AppError::Config(format!(
        "CART_COOKIE_NAME '{}' is not a valid cookie name",
        cart_cookie_name
      )));
    }

    let run_migrations = parse_var("RUN_MIGRATIONS", get_env("RUN_MIGRATIONS"), defaults.run_migrations)?;
    let seed_db = parse_var("SEED_DB", get_env("SEED_DB"), defaults.seed_db)?;
    let seed_admin_email = get_env("SEED_ADMIN_EMAIL");
    let seed_admin_password = get_env("SEED_ADMIN_PASSWORD");
    if seed_admin_email.is_some() != seed_admin_password.is_some() {
      return Err(AppError::Config(
        "SEED_ADMIN_EMAIL and SEED_ADMIN_PASSWORD must be set together".to_string(),
      ));
    }

    tracing::info!(
      server_host = %server_host,
      server_port,
      persistent = database_url.is_some(),
      tax_basis_points,
      "Application configuration loaded."
    );

    Ok(Self {
      server_host,
      server_port,
      database_url,
      tax_basis_points,
      admin_path_prefix,
      cart_cookie_name,
      run_migrations,
      seed_db,
      seed_admin_email,
      seed_admin_password,
    })
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}
