// storefront/src/errors.rs

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;
use flow::FlowError;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Migration Error: {0}")]
  Migrate(#[from] sqlx::migrate::MigrateError),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),

  // A pipeline stopped early where the handler needed it to complete.
  #[error("Pipeline execution was halted by a handler.")]
  PipelineHaltedByHandler,
}

impl From<StoreError> for AppError {
  fn from(err: StoreError) -> Self {
    match err {
      StoreError::NotFound { entity, id } => AppError::NotFound(format!("{} '{}' not found.", entity, id)),
      StoreError::Conflict(m) => AppError::Conflict(m),
      StoreError::Invalid(m) => AppError::Validation(m),
      StoreError::Database(e) => AppError::Sqlx(e),
    }
  }
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<sqlx::Error>() {
      Ok(db_err) => AppError::Sqlx(db_err),
      Err(other) => AppError::Internal(other.to_string()),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Conflict(_) => StatusCode::CONFLICT,
      AppError::PipelineHaltedByHandler => StatusCode::CONFLICT,
      AppError::Config(_)
      | AppError::Sqlx(_)
      | AppError::Migrate(_)
      | AppError::Workflow { .. }
      | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with server error");
    } else {
      tracing::info!(application_error = %self, status = status.as_u16(), "Responding with client error");
    }
    let body = match self {
      AppError::Validation(m) | AppError::NotFound(m) | AppError::Conflict(m) => json!({ "error": m }),
      AppError::Sqlx(_) | AppError::Migrate(_) => json!({ "error": "Database operation failed" }),
      AppError::Config(m) => json!({ "error": "Configuration issue", "detail": m }),
      AppError::Workflow { source } => json!({ "error": "Workflow processing error", "detail": source.to_string() }),
      AppError::Internal(m) => json!({ "error": "An internal error occurred", "detail": m }),
      AppError::PipelineHaltedByHandler => json!({ "error": "Process halted by business logic." }),
    };
    HttpResponse::build(status).json(body)
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
