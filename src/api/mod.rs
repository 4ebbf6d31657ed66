//! API handlers for Libros REST endpoints

pub mod books;
pub mod extract;
pub mod health;
pub mod openapi;
pub mod router;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    typed_header::TypedHeaderRejectionReason,
    TypedHeader,
};

use crate::{
    auth::{AuthError, Claims},
    error::AppError,
    AppState,
};

/// Extractor for the caller's verified bearer token
pub struct AuthenticatedUser(pub Claims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|rejection| match rejection.reason() {
                    TypedHeaderRejectionReason::Missing => AuthError::MissingToken,
                    _ => AuthError::MalformedHeader,
                })?;

        let claims = state.verifier.verify(bearer.token()).await?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Gate for the resource routes: rejects the request before any handler runs
/// unless it carries a valid bearer token. Verified claims are made available
/// to handlers as a request extension.
pub async fn require_bearer(
    AuthenticatedUser(claims): AuthenticatedUser,
    mut request: Request,
    next: Next,
) -> Response {
    tracing::debug!(sub = %claims.sub, "Bearer token accepted");
    request.extensions_mut().insert(claims);
    next.run(request).await
}
