//! Book model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Book record as stored and returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    /// Identifier assigned on creation, never changes
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Create book request
///
/// Missing fields deserialize as empty strings so that they are reported by
/// validation instead of as a JSON shape error.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[serde(default)]
    #[validate(length(min = 1, message = "El campo title es obligatorio"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "El campo author es obligatorio"))]
    pub author: String,
}

/// Update book request; only the supplied fields change
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "El campo title no puede estar vacío"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "El campo author no puede estar vacío"))]
    pub author: Option<String>,
}
