//! Libros book catalog server
//!
//! A REST JSON API for managing book records, stored in PostgreSQL and
//! protected by bearer tokens issued by an external OpenID provider.

use std::sync::Arc;

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;

#[cfg(test)]
mod test_support;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub books: Arc<dyn repository::BookStore>,
    pub verifier: Arc<auth::JwksVerifier>,
}
