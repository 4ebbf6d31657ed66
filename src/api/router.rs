//! HTTP routing and middleware pipeline

use std::any::Any;

use axum::{
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{api, error::AppError, AppState};

/// Create the application router with all routes.
///
/// Request pipeline, outermost first: panic guard, tracing, CORS, then for the
/// book resource the bearer gate ahead of the handlers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin);

    let base_path = state.config.api.normalized_base_path();

    let books = Router::new()
        .route(
            "/",
            get(api::books::list_books).post(api::books::create_book),
        )
        .route(
            "/:id",
            get(api::books::get_book)
                .put(api::books::update_book)
                .delete(api::books::delete_book),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            api::require_bearer,
        ));

    let router = Router::new()
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check));

    // axum refuses to nest at the root
    let router = if base_path == "/" {
        router.merge(books)
    } else {
        router.nest(&base_path, books)
    };

    router
        .with_state(state)
        .merge(api::openapi::create_openapi_router(&base_path))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(CatchPanicLayer::custom(handle_panic))
}

/// Last-resort handler: a panic in any request becomes a generic 500
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    AppError::Internal(format!("request handler panicked: {}", detail)).into_response()
}
