// tests/config_tests.rs

use serial_test::serial;
use std::collections::HashMap;
use storefront::{AppConfig, AppError};

fn from_pairs(pairs: &[(&str, &str)]) -> Result<AppConfig, AppError> {
  let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
  AppConfig::from_lookup(|name| vars.get(name).cloned())
}

#[test]
fn defaults_apply_when_nothing_is_set() {
  let config = from_pairs(&[]).unwrap();

  assert_eq!(config.bind_address(), "127.0.0.1:8080");
  assert!(config.database_url.is_none());
  assert_eq!(config.tax_basis_points, 300);
  assert_eq!(config.admin_path_prefix, "/admin");
  assert_eq!(config.cart_cookie_name, "storefront_cart");
  assert!(config.run_migrations);
  assert!(!config.seed_db);
}

#[test]
fn values_override_defaults_and_blanks_count_as_unset() {
  let config = from_pairs(&[
    ("SERVER_PORT", "9090"),
    ("DATABASE_URL", "postgres://localhost/shop"),
    ("CART_TAX_BASIS_POINTS", "825"),
    ("ADMIN_PATH_PREFIX", "/staff"),
    ("CART_COOKIE_NAME", "basket"),
    ("RUN_MIGRATIONS", "false"),
    ("SERVER_HOST", "   "),
  ])
  .unwrap();

  assert_eq!(config.server_port, 9090);
  assert_eq!(config.server_host, "127.0.0.1");
  assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/shop"));
  assert_eq!(config.tax_basis_points, 825);
  assert_eq!(config.admin_path_prefix, "/staff");
  assert_eq!(config.cart_cookie_name, "basket");
  assert!(!config.run_migrations);
}

#[test]
fn invalid_values_are_config_errors() {
  for pairs in [
    vec![("SERVER_PORT", "eighty")],
    vec![("CART_TAX_BASIS_POINTS", "10001")],
    vec![("CART_TAX_BASIS_POINTS", "-3")],
    vec![("SEED_DB", "sometimes")],
    vec![("CART_COOKIE_NAME", "my cart")],
    vec![("SEED_ADMIN_EMAIL", "owner@shop.test")],
  ] {
    let err = from_pairs(&pairs).unwrap_err();
    assert!(matches!(err, AppError::Config(_)), "{:?} gave {:?}", pairs, err);
  }
}

#[test]
#[serial]
fn from_env_reads_process_environment() {
  std::env::set_var("CART_TAX_BASIS_POINTS", "450");
  std::env::set_var("SERVER_PORT", "8181");

  let config = AppConfig::from_env();

  std::env::remove_var("CART_TAX_BASIS_POINTS");
  std::env::remove_var("SERVER_PORT");
  let config = config.unwrap();
  assert_eq!(config.tax_basis_points, 450);
  assert_eq!(config.server_port, 8181);
}

#[test]
#[serial]
fn from_env_falls_back_to_defaults() {
  std::env::remove_var("CART_TAX_BASIS_POINTS");
  std::env::remove_var("SERVER_PORT");

  let config = AppConfig::from_env().unwrap();

  assert_eq!(config.tax_basis_points, 300);
  assert_eq!(config.server_port, 8080);
}
