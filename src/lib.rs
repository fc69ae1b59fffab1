// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod candles;
pub mod config;
pub mod cryptopanic;
pub mod error;
pub mod scrape;

// Convenient access to the router builder: `crate_root::api::router` or `crate_root::router`
pub use crate::api::{router, AppState};
pub use crate::config::AppConfig;
pub use crate::error::AppError;
