// storefront/src/web/session.rs

//! Cart key extraction from the request cookie.

use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::StatusCode;
use actix_web::{web, FromRequest, HttpRequest, HttpResponse, HttpResponseBuilder};
use futures_util::future::{ready, Ready};
use tracing::warn;

use crate::errors::AppError;
use crate::services::identity::{self, CartKey};
use crate::state::AppState;

/// The caller's cart key. Extracting it never fails for a configured app: a
/// missing or malformed cookie yields a fresh key that
/// [`respond`](Self::respond) hands back to the client.
#[derive(Debug, Clone)]
pub struct CartSession {
  pub key: CartKey,
  pub minted: bool,
  cookie_name: String,
}

impl CartSession {
  pub fn cookie(&self) -> Cookie<'static> {
    Cookie::build(self.cookie_name.clone(), self.key.as_str().to_string())
      .path("/")
      .http_only(true)
      .same_site(SameSite::Lax)
      .finish()
  }

  /// Response builder that also sets the cookie when the key is new.
  pub fn respond(&self, status: StatusCode) -> HttpResponseBuilder {
    let mut builder = HttpResponse::build(status);
    if self.minted {
      builder.cookie(self.cookie());
    }
    builder
  }
}

impl FromRequest for CartSession {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
      warn!("CartSession extractor: application state is not configured.");
      return ready(Err(AppError::Internal("Application state missing.".to_string())));
    };
    let cookie_name = state.config.cart_cookie_name.clone();
    let presented = req.cookie(&cookie_name).map(|c| c.value().to_string());
    let resolved = identity::resolve(presented.as_deref());
    ready(Ok(CartSession {
      key: resolved.key,
      minted: resolved.minted,
      cookie_name,
    }))
  }
}
