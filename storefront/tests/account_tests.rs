// tests/account_tests.rs
mod common;

use common::*;
use flow::ContextData;
use storefront::models::Account;
use storefront::pipelines::contexts::CreateAccountCtxData;
use storefront::pipelines::run_to_completion;
use storefront::services::accounts::{has_usable_password, verify_password, AccountRequest};
use storefront::store::AccountStore;
use storefront::{AppConfig, AppError, AppState};

fn request(username: &str, email: &str, password: Option<&str>) -> AccountRequest {
  AccountRequest {
    first_name: "Ada".to_string(),
    last_name: "Lovelace".to_string(),
    username: username.to_string(),
    email: email.to_string(),
    phone_number: String::new(),
    password: password.map(str::to_string),
  }
}

async fn create(state: &AppState, req: AccountRequest, superuser: bool) -> Result<Account, AppError> {
  let ctx = ContextData::new(CreateAccountCtxData::new(state.clone(), req, superuser));
  run_to_completion(&state.flows, ctx.clone()).await?;
  let account = ctx.read().created.clone().unwrap();
  Ok(account)
}

#[tokio::test]
async fn new_user_is_inactive_with_normalized_email_and_hashed_password() {
  setup_tracing();
  let (state, memory) = test_state(AppConfig::default());

  let account = create(&state, request("ada", "Ada.L@Example.COM", Some("s3cret!")), false)
    .await
    .unwrap();

  assert_eq!(account.email, "Ada.L@example.com");
  assert_eq!(account.to_string(), "Ada.L@example.com");
  assert!(!account.is_active);
  assert!(!account.is_admin && !account.is_staff && !account.is_superadmin);
  assert!(!account.has_perm("carts.view_cart"));
  assert!(account.has_module_perms("carts"));
  assert_ne!(account.password_hash, "s3cret!");
  assert!(verify_password(&account.password_hash, "s3cret!").unwrap());
  assert!(!verify_password(&account.password_hash, "wrong").unwrap());

  let stored = memory.account_by_email("Ada.L@example.com").await.unwrap().unwrap();
  assert_eq!(stored.id, account.id);
}

#[tokio::test]
async fn email_and_username_are_required() {
  let (state, _) = test_state(AppConfig::default());

  let no_email = create(&state, request("ada", "  ", Some("pw")), false).await.unwrap_err();
  let no_username = create(&state, request("", "ada@example.com", Some("pw")), false)
    .await
    .unwrap_err();

  match no_email {
    AppError::Validation(msg) => assert_eq!(msg, "User must have an email address"),
    other => panic!("unexpected error: {:?}", other),
  }
  match no_username {
    AppError::Validation(msg) => assert_eq!(msg, "User must have an username"),
    other => panic!("unexpected error: {:?}", other),
  }
}

#[tokio::test]
async fn fields_longer_than_fifty_characters_are_rejected() {
  let (state, _) = test_state(AppConfig::default());
  let long_name = "x".repeat(51);

  let err = create(&state, request(&long_name, "ada@example.com", None), false)
    .await
    .unwrap_err();

  assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn missing_password_stores_an_unusable_hash() {
  let (state, _) = test_state(AppConfig::default());

  let account = create(&state, request("nopw", "nopw@example.com", None), false)
    .await
    .unwrap();

  assert!(!has_usable_password(&account.password_hash));
  assert!(!verify_password(&account.password_hash, "").unwrap());
}

#[tokio::test]
async fn superuser_gets_every_flag() {
  let (state, _) = test_state(AppConfig::default());

  let admin = create(&state, request("root", "root@Example.org", Some("hunter2")), true)
    .await
    .unwrap();

  assert!(admin.is_admin && admin.is_staff && admin.is_active && admin.is_superadmin);
  assert!(admin.has_perm("anything"));
  assert_eq!(admin.email, "root@example.org");
}

#[tokio::test]
async fn superuser_requires_a_password() {
  let (state, _) = test_state(AppConfig::default());

  let err = create(&state, request("root", "root@example.org", None), true)
    .await
    .unwrap_err();

  assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn duplicate_email_or_username_conflicts() {
  let (state, _) = test_state(AppConfig::default());
  create(&state, request("ada", "ada@example.com", Some("pw")), false)
    .await
    .unwrap();

  let same_email = create(&state, request("other", "ada@EXAMPLE.com", Some("pw")), false)
    .await
    .unwrap_err();
  let same_username = create(&state, request("ada", "else@example.com", Some("pw")), false)
    .await
    .unwrap_err();

  assert!(matches!(same_email, AppError::Conflict(_)));
  assert!(matches!(same_username, AppError::Conflict(_)));
}

#[test]
fn password_hash_is_never_serialized() {
  let now = chrono::Utc::now();
  let account = Account {
    id: uuid::Uuid::new_v4(),
    first_name: "A".to_string(),
    last_name: "B".to_string(),
    username: "ab".to_string(),
    email: "ab@example.com".to_string(),
    phone_number: String::new(),
    password_hash: "$argon2id$secret".to_string(),
    date_joined: now,
    last_login: now,
    is_admin: false,
    is_staff: false,
    is_active: true,
    is_superadmin: false,
  };

  let value = serde_json::to_value(&account).unwrap();
  assert!(value.get("password_hash").is_none());
  assert_eq!(value["email"], "ab@example.com");
}
