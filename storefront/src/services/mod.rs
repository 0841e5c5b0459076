// storefront/src/services/mod.rs

//! Domain logic shared by pipelines and handlers.

pub mod accounts;
pub mod badge;
pub mod identity;
pub mod totals;
