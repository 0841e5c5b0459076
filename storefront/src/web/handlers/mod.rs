// storefront/src/web/handlers/mod.rs

pub mod account_handlers;
pub mod cart_handlers;
pub mod store_handlers;
