// storefront/src/lib.rs

//! Storefront backend: catalog, session-keyed carts and accounts over an
//! actix-web JSON API. Cart and account operations run as `flow` pipelines.

pub mod config;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod seed;
pub mod services;
pub mod state;
pub mod store;
pub mod web;

pub use crate::config::AppConfig;
pub use crate::errors::{AppError, Result};
pub use crate::state::AppState;
