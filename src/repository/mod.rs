//! Repository layer for database operations

pub mod books;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::book::{Book, CreateBook, UpdateBook};

pub use books::PgBookStore;

/// Errors raised by a book store
#[derive(Error, Debug)]
pub enum StoreError {
    /// The identifier is not in the store's id format
    #[error("Invalid book identifier: {0}")]
    InvalidId(String),

    #[error("Invalid book: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence contract for the book collection.
///
/// Lookups that find nothing return `Ok(None)`; an `Err` always means the
/// request could not be answered.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    /// All books in storage order
    async fn find_all(&self) -> StoreResult<Vec<Book>>;

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Book>>;

    /// Persist a new book and return it with its generated id
    async fn create(&self, data: &CreateBook) -> StoreResult<Book>;

    /// Apply the supplied fields to an existing book. Never inserts.
    async fn update_by_id(&self, id: &str, data: &UpdateBook) -> StoreResult<Option<Book>>;

    /// Remove a book, returning the snapshot it had before removal
    async fn delete_by_id(&self, id: &str) -> StoreResult<Option<Book>>;

    /// Connectivity check for readiness probes
    async fn ping(&self) -> StoreResult<()>;
}
