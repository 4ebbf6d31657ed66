//! Postgres-backed book store

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;
use validator::Validate;

use super::{BookStore, StoreError, StoreResult};
use crate::{
    error::validation_message,
    models::book::{Book, CreateBook, UpdateBook},
};

const BOOK_COLUMNS: &str = "id, title, author, created_at, updated_at";

// SQLSTATE codes for constraint failures that mean the input was bad
const NOT_NULL_VIOLATION: &str = "23502";
const CHECK_VIOLATION: &str = "23514";

#[derive(Clone)]
pub struct PgBookStore {
    pool: Pool<Postgres>,
}

impl PgBookStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn parse_id(id: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| StoreError::InvalidId(id.to_string()))
}

/// Constraint violations become validation errors, everything else stays a
/// database fault.
fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if matches!(db.code().as_deref(), Some(NOT_NULL_VIOLATION | CHECK_VIOLATION)) {
            return StoreError::Validation(db.message().to_string());
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl BookStore for PgBookStore {
    async fn find_all(&self) -> StoreResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, Book>(&format!(
            "SELECT {} FROM books ORDER BY seq",
            BOOK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Book>> {
        let id = parse_id(id)?;
        let row = sqlx::query_as::<_, Book>(&format!(
            "SELECT {} FROM books WHERE id = $1",
            BOOK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create(&self, data: &CreateBook) -> StoreResult<Book> {
        data.validate()
            .map_err(|e| StoreError::Validation(validation_message(&e)))?;

        sqlx::query_as::<_, Book>(&format!(
            "INSERT INTO books (id, title, author) VALUES ($1, $2, $3) RETURNING {}",
            BOOK_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&data.title)
        .bind(&data.author)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    async fn update_by_id(&self, id: &str, data: &UpdateBook) -> StoreResult<Option<Book>> {
        let id = parse_id(id)?;
        data.validate()
            .map_err(|e| StoreError::Validation(validation_message(&e)))?;

        sqlx::query_as::<_, Book>(&format!(
            r#"
            UPDATE books
            SET title = COALESCE($2, title),
                author = COALESCE($3, author),
                updated_at = now()
            WHERE id = $1
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(id)
        .bind(&data.title)
        .bind(&data.author)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<Option<Book>> {
        let id = parse_id(id)?;
        let row = sqlx::query_as::<_, Book>(&format!(
            "DELETE FROM books WHERE id = $1 RETURNING {}",
            BOOK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
