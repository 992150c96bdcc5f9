pub mod dto;
pub mod errors;
pub mod handlers;

use axum::{routing::get, Router};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use handlers::ApiDoc;

use crate::{state::AppState, web};

/// JSON API, OpenAPI document and the HTML pages on one router.
pub fn router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/alerts", get(handlers::get_alerts))
        .with_state(state.clone())
        .split_for_parts();

    router
        .route("/health", get(handlers::health))
        .route(
            "/api-docs/openapi.json",
            get(move || async move { axum::Json(api) }),
        )
        .merge(web::routes(state))
}
