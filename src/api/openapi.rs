//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::{
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
        OpenApi as OpenApiDoc,
    },
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Libros API",
        version = "0.1.0",
        description = "Book catalog REST API"
    ),
    paths(
        health::health_check,
        health::readiness_check,
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
    ),
    components(
        schemas(
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            health::HealthResponse,
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Book management")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by the book endpoints
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Mount point the book handlers are annotated with
const DOCUMENTED_BASE_PATH: &str = "/api/libros";

/// OpenAPI document with the book routes moved under `base_path`
pub fn openapi_for(base_path: &str) -> OpenApiDoc {
    let mut doc = ApiDoc::openapi();
    if base_path == DOCUMENTED_BASE_PATH {
        return doc;
    }

    let paths = std::mem::take(&mut doc.paths.paths);
    doc.paths.paths = paths
        .into_iter()
        .map(|(path, item)| match path.strip_prefix(DOCUMENTED_BASE_PATH) {
            Some("") => (base_path.to_string(), item),
            Some(rest) if base_path == "/" => (rest.to_string(), item),
            Some(rest) => (format!("{}{}", base_path, rest), item),
            None => (path, item),
        })
        .collect();
    doc
}

/// Create the OpenAPI documentation router for books mounted at `base_path`
pub fn create_openapi_router(base_path: &str) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi_for(base_path)))
}
