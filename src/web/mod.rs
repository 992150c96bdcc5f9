//! Server-rendered HTML pages.

pub mod errors;
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard))
        .route("/dashboard", get(handlers::dashboard))
        .route("/history", get(handlers::history))
        .route("/history/export", get(handlers::export_history))
        .route("/alerts", get(handlers::alerts))
        .route("/alerts/{id}", get(handlers::alert_detail))
        .route("/alerts/{id}/resolve", post(handlers::resolve_alert))
        .route("/alerts/{id}/dismiss", post(handlers::dismiss_alert))
        .route(
            "/settings",
            get(handlers::settings_page).post(handlers::save_settings),
        )
        .route("/settings/reset", post(handlers::reset_settings))
        .route("/theme", post(handlers::toggle_theme))
        .route("/{page}", get(handlers::page))
        .with_state(state)
}
