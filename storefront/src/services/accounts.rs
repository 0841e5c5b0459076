// storefront/src/services/accounts.rs

//! Account creation rules and password hashing.

use crate::errors::AppError;
use crate::models::account::ACCOUNT_FIELD_MAX;
use crate::models::NewAccount;
use argon2::{
  password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use serde::Deserialize;
use tracing::{debug, error, instrument};
use uuid::Uuid;

/// Stored hashes starting with this marker never verify.
pub const UNUSABLE_PASSWORD_PREFIX: char = '!';

/// Registration input, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountRequest {
  #[serde(default)]
  pub first_name: String,
  #[serde(default)]
  pub last_name: String,
  #[serde(default)]
  pub username: String,
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub phone_number: String,
  #[serde(default)]
  pub password: Option<String>,
}

/// Lower-cases the domain part of an address; the local part is kept as given.
pub fn normalize_email(email: &str) -> String {
  let email = email.trim();
  match email.rsplit_once('@') {
    Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
    None => email.to_string(),
  }
}

fn check_len(field: &str, value: &str) -> Result<(), AppError> {
  if value.chars().count() > ACCOUNT_FIELD_MAX {
    return Err(AppError::Validation(format!(
      "Field '{}' must be at most {} characters.",
      field, ACCOUNT_FIELD_MAX
    )));
  }
  Ok(())
}

/// Applies the creation rules and returns the record to store, still without
/// a password hash. Superusers need a password and get every flag set.
pub fn validate_request(req: &AccountRequest, superuser: bool) -> Result<NewAccount, AppError> {
  if req.email.trim().is_empty() {
    return Err(AppError::Validation("User must have an email address".to_string()));
  }
  if req.username.trim().is_empty() {
    return Err(AppError::Validation("User must have an username".to_string()));
  }
  let email = normalize_email(&req.email);
  check_len("first_name", &req.first_name)?;
  check_len("last_name", &req.last_name)?;
  check_len("username", &req.username)?;
  check_len("email", &email)?;
  check_len("phone_number", &req.phone_number)?;
  if superuser && req.password.as_deref().map_or(true, str::is_empty) {
    return Err(AppError::Validation("Superuser must have a password".to_string()));
  }

  Ok(NewAccount {
    first_name: req.first_name.clone(),
    last_name: req.last_name.clone(),
    username: req.username.clone(),
    email,
    phone_number: req.phone_number.clone(),
    password_hash: String::new(),
    is_admin: superuser,
    is_staff: superuser,
    is_active: superuser,
    is_superadmin: superuser,
  })
}

/// A hash that matches no password, for accounts created without one.
pub fn unusable_password() -> String {
  format!("{}{}", UNUSABLE_PASSWORD_PREFIX, Uuid::new_v4().simple())
}

pub fn has_usable_password(stored_hash: &str) -> bool {
  !stored_hash.is_empty() && !stored_hash.starts_with(UNUSABLE_PASSWORD_PREFIX)
}

/// Argon2 hash of `password`, or an unusable marker when there is none.
#[instrument(name = "accounts::hash_password", skip(password), err(Display))]
pub fn hash_password(password: Option<&str>) -> Result<String, AppError> {
  let password = match password {
    Some(p) if !p.is_empty() => p,
    _ => {
      debug!("No password given; storing unusable hash.");
      return Ok(unusable_password());
    }
  };

  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|argon_err| {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      AppError::Internal(format!("Password hashing process failed: {}", argon_err))
    })
}

/// Checks `provided` against a stored hash. Unusable hashes and empty input
/// never match.
#[instrument(name = "accounts::verify_password", skip_all, err(Display))]
pub fn verify_password(stored_hash: &str, provided: &str) -> Result<bool, AppError> {
  if !has_usable_password(stored_hash) || provided.is_empty() {
    return Ok(false);
  }

  let parsed_hash = PasswordHash::new(stored_hash).map_err(|parse_err| {
    error!(error = %parse_err, "Failed to parse stored password hash string.");
    AppError::Internal(format!("Invalid stored password hash format: {}", parse_err))
  })?;

  match Argon2::default().verify_password(provided.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => Ok(false),
    Err(other) => {
      error!(error = %other, "Argon2 password verification process encountered an error.");
      Err(AppError::Internal(format!("Password verification process failed: {}", other)))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalize_email_lowercases_domain_only() {
    assert_eq!(normalize_email("John.Doe@Example.COM"), "John.Doe@example.com");
    assert_eq!(normalize_email("  a@B.org "), "a@b.org");
    assert_eq!(normalize_email("no-at-sign"), "no-at-sign");
  }

  #[test]
  fn unusable_hash_never_verifies() {
    let hash = hash_password(None).unwrap();
    assert!(!has_usable_password(&hash));
    assert!(!verify_password(&hash, "anything").unwrap());
  }
}
