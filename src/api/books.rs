//! Book API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
    AppState,
};

use super::extract::ValidatedJson;

/// List all books
#[utoipa::path(
    get,
    path = "/api/libros",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Books in storage order", body = Vec<Book>),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse),
        (status = 500, description = "Storage failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_books(State(state): State<AppState>) -> AppResult<Json<Vec<Book>>> {
    let books = state.books.find_all().await?;
    Ok(Json(books))
}

/// Get book by ID
#[utoipa::path(
    get,
    path = "/api/libros/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Book>> {
    let book = state
        .books
        .find_by_id(&id)
        .await?
        .ok_or_else(AppError::book_not_found)?;
    Ok(Json(book))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/api/libros",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Missing or empty title/author", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    ValidatedJson(data): ValidatedJson<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let book = state.books.create(&data).await?;
    tracing::info!(id = %book.id, "Book created");
    Ok((StatusCode::CREATED, Json(book)))
}

/// Update a book; fields absent from the body keep their value
#[utoipa::path(
    put,
    path = "/api/libros/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Book ID")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Empty title/author", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(data): ValidatedJson<UpdateBook>,
) -> AppResult<Json<Book>> {
    let book = state
        .books
        .update_by_id(&id, &data)
        .await?
        .ok_or_else(AppError::book_not_found)?;
    tracing::info!(id = %book.id, "Book updated");
    Ok(Json(book))
}

/// Delete a book, returning the removed record
#[utoipa::path(
    delete,
    path = "/api/libros/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book deleted", body = Book),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Book>> {
    let book = state
        .books
        .delete_by_id(&id)
        .await?
        .ok_or_else(AppError::book_not_found)?;
    tracing::info!(id = %book.id, "Book deleted");
    Ok(Json(book))
}
