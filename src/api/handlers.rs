use axum::{
    extract::{Query, State},
    Json,
};
use tracing::error;
use utoipa::OpenApi;

use super::{
    dto::{DashboardDto, DashboardStatus},
    errors::AppError,
};
use crate::{
    alerts::{AlertFilter, AlertFilterParams},
    dashboard::DashboardSnapshot,
    state::AppState,
    telemetry::models::{Alert, AlertType, SensorReading, Severity},
};

/// Latest result of the dashboard polling loop.
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Latest dashboard state", body = DashboardDto),
    ),
    tag = "dashboard"
)]
pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardDto> {
    Json(state.dashboard.current().await.into())
}

/// Alerts from the telemetry API, filtered like the Alerts page.
#[utoipa::path(
    get,
    path = "/api/alerts",
    params(AlertFilterParams),
    responses(
        (status = 200, description = "Matching alerts in API order", body = Vec<Alert>),
        (status = 400, description = "Unknown filter value"),
        (status = 502, description = "Telemetry API call failed"),
    ),
    tag = "alerts"
)]
pub async fn get_alerts(
    State(state): State<AppState>,
    Query(params): Query<AlertFilterParams>,
) -> Result<Json<Vec<Alert>>, AppError> {
    let filter = AlertFilter::from_params(&params)?;
    let all = state.source.alerts().await.inspect_err(|e| {
        error!(source = state.source.name(), error = %e, "Failed to fetch alerts");
    })?;
    Ok(Json(filter.apply(&all)))
}

/// Liveness check.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
    ),
    tag = "system"
)]
pub async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// OpenAPI document (served by api/mod.rs)
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    paths(get_dashboard, get_alerts, health),
    components(schemas(
        DashboardDto,
        DashboardStatus,
        DashboardSnapshot,
        SensorReading,
        Alert,
        Severity,
        AlertType,
    )),
    tags(
        (name = "dashboard", description = "Dashboard polling state"),
        (name = "alerts", description = "Filtered alert list"),
        (name = "system", description = "Service health"),
    ),
    info(
        title = "AgroChain Dashboard API",
        version = "0.1.0",
        description = "JSON view of the AgroChain monitoring dashboard"
    )
)]
pub struct ApiDoc;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use chrono::Utc;
    use serde_json::Value;

    use crate::{
        api::router,
        dashboard::DashboardState,
        state::{test_state, AppState},
        telemetry::fake::{reading, FakeSource},
    };

    fn test_server(source: FakeSource) -> (TestServer, AppState) {
        let state = test_state(Arc::new(source));
        (TestServer::new(router(state.clone())).unwrap(), state)
    }

    // -----------------------------------------------------------------------
    // GET /api/dashboard
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn dashboard_starts_loading() {
        let (server, _state) = test_server(FakeSource::new());
        let resp = server.get("/api/dashboard").await;
        resp.assert_status_ok();
        let body: Value = resp.json();
        assert_eq!(body["status"], "loading");
        assert!(body["snapshot"].is_null());
    }

    #[tokio::test]
    async fn dashboard_reports_failure_message() {
        let (server, state) = test_server(FakeSource::new());
        state
            .dashboard
            .publish(DashboardState::Failed {
                message: "Erro ao carregar dados dos sensores".to_owned(),
                at: Utc::now(),
            })
            .await;

        let body: Value = server.get("/api/dashboard").await.json();
        assert_eq!(body["status"], "failed");
        assert_eq!(body["message"], "Erro ao carregar dados dos sensores");
        assert!(body["failed_at"].is_string());
    }

    #[tokio::test]
    async fn dashboard_serialises_snapshot() {
        let (server, state) = test_server(FakeSource::new());
        state
            .dashboard
            .publish(DashboardState::Ready(crate::dashboard::DashboardSnapshot {
                reading: reading(24.5),
                alerts: vec![],
                history: vec![reading(20.0)],
                fetched_at: Utc::now(),
            }))
            .await;

        let body: Value = server.get("/api/dashboard").await.json();
        assert_eq!(body["status"], "ready");
        assert_eq!(body["snapshot"]["reading"]["temperature"], 24.5);
        assert_eq!(body["snapshot"]["history"].as_array().unwrap().len(), 1);
    }

    // -----------------------------------------------------------------------
    // GET /api/alerts
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn alerts_are_filtered() {
        let (server, _state) = test_server(FakeSource::new());

        let all: Vec<Value> = server.get("/api/alerts").await.json();
        assert_eq!(all.len(), 2);

        let resp = server.get("/api/alerts?severity=high&status=active").await;
        resp.assert_status_ok();
        let body: Vec<Value> = resp.json();
        assert_eq!(body.len(), 1);
        assert_eq!(body[0]["id"], "1");
    }

    #[tokio::test]
    async fn alerts_reject_unknown_filter() {
        let (server, _state) = test_server(FakeSource::new());
        let resp = server.get("/api/alerts?status=pending").await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = resp.json();
        assert!(body["error"].as_str().unwrap().contains("pending"));
    }

    #[tokio::test]
    async fn alerts_upstream_failure_is_bad_gateway() {
        let source = FakeSource::new();
        FakeSource::set(&source.alerts, Err(Some("indisponível".to_owned())));
        let (server, _state) = test_server(source);

        let resp = server.get("/api/alerts").await;
        resp.assert_status(StatusCode::BAD_GATEWAY);
        let body: Value = resp.json();
        assert!(body["error"].as_str().unwrap().contains("indisponível"));
    }

    // -----------------------------------------------------------------------
    // System
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn health_returns_ok() {
        let (server, _state) = test_server(FakeSource::new());
        let resp = server.get("/health").await;
        resp.assert_status_ok();
        let body: Value = resp.json();
        assert_eq!(body, serde_json::json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn openapi_document_lists_routes() {
        let (server, _state) = test_server(FakeSource::new());
        let resp = server.get("/api-docs/openapi.json").await;
        resp.assert_status_ok();
        let body: Value = resp.json();
        assert_eq!(body["info"]["title"], "AgroChain Dashboard API");
        assert!(body["paths"]["/api/dashboard"].is_object());
        assert!(body["paths"]["/api/alerts"].is_object());
        assert!(body["paths"]["/health"].is_object());
    }
}
