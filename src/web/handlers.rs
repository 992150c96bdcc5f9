use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use super::errors::PageError;
use crate::{
    alerts::{self, AlertFilter, AlertFilterParams},
    history::{self, export, HistoryFilter, HistoryFilterParams, EXPORT_ERROR},
    pages::Page,
    settings::{self, Settings, SettingsForm},
    state::AppState,
    views::{
        alerts::{AlertDetailView, AlertsView},
        dashboard::DashboardView,
        history::HistoryView,
        render_page,
        settings::{SettingsNotice, SettingsView},
        LayoutContext,
    },
};

/// Shown after "Marcar como Resolvido"; the telemetry API has no resolve call.
pub const RESOLVE_NOTICE: &str =
    "Pedido registado. O estado do alerta é gerido pela API de telemetria.";

// ---------------------------------------------------------------------------
// Query / form parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct DetailParams {
    pub resolved: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SettingsParams {
    pub notice: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ThemeForm {
    /// Page to return to.
    pub page: String,
}

async fn layout(state: &AppState, headers: &HeaderMap, page: Page) -> (LayoutContext, Settings) {
    let settings = state.settings.get().await;
    let theme = settings::effective_theme(headers, &settings);
    (LayoutContext::new(page, theme), settings)
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// `GET /` and `GET /dashboard`: latest published poll outcome.
pub async fn dashboard(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    render_dashboard(&state, &headers).await
}

async fn render_dashboard(state: &AppState, headers: &HeaderMap) -> Html<String> {
    let (ctx, settings) = layout(state, headers, Page::Dashboard).await;
    let ctx = ctx.with_refresh(settings.refresh_interval_secs);
    let current = state.dashboard.current().await;
    let dismissed = alerts::dismissed_ids(headers);
    Html(render_page(
        &ctx,
        DashboardView {
            state: &current,
            dismissed: &dismissed,
        },
    ))
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// `GET /history[?location&dateFrom&dateTo]`
pub async fn history(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HistoryFilterParams>,
) -> Result<Html<String>, PageError> {
    render_history(&state, &headers, params).await
}

async fn render_history(
    state: &AppState,
    headers: &HeaderMap,
    params: HistoryFilterParams,
) -> Result<Html<String>, PageError> {
    let (ctx, _) = layout(state, headers, Page::History).await;
    let filter = HistoryFilter::from_params(&params)
        .map_err(|e| PageError::bad_request(ctx, format!("Filtro inválido: {e}")))?;
    let filtered = params.is_submitted();

    let outcome = state.source.history(&filter.to_query()).await.map_err(|e| {
        error!(source = state.source.name(), error = %e, filtered, "Failed to fetch history");
        history::error_message(&e, filtered)
    });

    Ok(Html(render_page(
        &ctx,
        HistoryView {
            params: &params,
            outcome: &outcome,
        },
    )))
}

/// `GET /history/export`: the export endpoint's records as a CSV download.
pub async fn export_history(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match state.source.export_history().await {
        Ok(records) => {
            info!(records = records.len(), "Exporting history as CSV");
            let filename = export::filename(Utc::now().date_naive());
            (
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{filename}\""),
                    ),
                ],
                export::to_csv(&records),
            )
                .into_response()
        }
        Err(e) => {
            error!(source = state.source.name(), error = %e, "Failed to export history");
            let (ctx, _) = layout(&state, &headers, Page::History).await;
            let outcome = Err(EXPORT_ERROR.to_owned());
            let body = render_page(
                &ctx,
                HistoryView {
                    params: &HistoryFilterParams::default(),
                    outcome: &outcome,
                },
            );
            (StatusCode::BAD_GATEWAY, Html(body)).into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

/// `GET /alerts[?severity&type&status]`
pub async fn alerts(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<AlertFilterParams>,
) -> Result<Html<String>, PageError> {
    render_alerts(&state, &headers, params).await
}

async fn render_alerts(
    state: &AppState,
    headers: &HeaderMap,
    params: AlertFilterParams,
) -> Result<Html<String>, PageError> {
    let (ctx, _) = layout(state, headers, Page::Alerts).await;
    let filter = AlertFilter::from_params(&params)
        .map_err(|e| PageError::bad_request(ctx, format!("Filtro inválido: {e}")))?;

    let outcome = match state.source.alerts().await {
        Ok(all) => Ok(filter.apply(&all)),
        Err(e) => {
            error!(source = state.source.name(), error = %e, "Failed to fetch alerts");
            Err(e.user_message(alerts::LOAD_ERROR))
        }
    };

    Ok(Html(render_page(
        &ctx,
        AlertsView {
            filter: &filter,
            outcome: &outcome,
        },
    )))
}

/// `GET /alerts/{id}`
pub async fn alert_detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(params): Query<DetailParams>,
) -> Result<Html<String>, PageError> {
    let (ctx, _) = layout(&state, &headers, Page::Alerts).await;
    let all = state.source.alerts().await.map_err(|e| {
        error!(source = state.source.name(), error = %e, alert_id = %id, "Failed to fetch alerts");
        PageError::upstream(ctx, e.user_message(alerts::LOAD_ERROR))
    })?;
    let alert = all
        .into_iter()
        .find(|a| a.id == id)
        .ok_or_else(|| PageError::not_found(ctx, format!("Alerta não encontrado: {id}")))?;

    let notice = params.resolved.is_some().then_some(RESOLVE_NOTICE);
    Ok(Html(render_page(
        &ctx,
        AlertDetailView {
            alert: &alert,
            notice,
        },
    )))
}

/// `POST /alerts/{id}/resolve`: logged only, then back to the detail page.
pub async fn resolve_alert(Path(id): Path<String>) -> Redirect {
    info!(alert_id = %id, "Resolve requested; telemetry API offers no resolve endpoint");
    Redirect::to(&format!("{}?resolved=1", alerts::detail_path(&id)))
}

/// `POST /alerts/{id}/dismiss`: hides the alert from the dashboard banner.
pub async fn dismiss_alert(headers: HeaderMap, Path(id): Path<String>) -> Response {
    debug!(alert_id = %id, "Dismissing alert from banner");
    let ids = alerts::with_dismissed(alerts::dismissed_ids(&headers), id);
    (
        [(header::SET_COOKIE, alerts::dismissed_cookie(&ids))],
        Redirect::to(&Page::Dashboard.href()),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// `GET /settings[?notice=saved|restored]`
pub async fn settings_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<SettingsParams>,
) -> Html<String> {
    let notice = match params.notice.as_deref() {
        Some("saved") => Some(SettingsNotice::Saved),
        Some("restored") => Some(SettingsNotice::Restored),
        _ => None,
    };
    render_settings(&state, &headers, notice).await
}

async fn render_settings(
    state: &AppState,
    headers: &HeaderMap,
    notice: Option<SettingsNotice>,
) -> Html<String> {
    let (ctx, settings) = layout(state, headers, Page::Settings).await;
    Html(render_page(
        &ctx,
        SettingsView {
            settings: &settings,
            notice: notice.as_ref(),
        },
    ))
}

/// `POST /settings` ("Guardar Configurações").
pub async fn save_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<SettingsForm>,
) -> Response {
    match form.validate() {
        Ok(saved) => {
            let theme = saved.theme;
            let interval = saved.refresh_interval();
            state.settings.replace(saved).await;
            state.set_refresh_interval(interval);
            info!(theme = %theme, refresh_interval_secs = interval.as_secs(), "Settings saved");
            (
                [(header::SET_COOKIE, settings::theme_cookie(theme))],
                Redirect::to("/settings?notice=saved"),
            )
                .into_response()
        }
        Err(e) => {
            warn!(error = %e, "Rejected settings form");
            let page = render_settings(&state, &headers, Some(SettingsNotice::Invalid(e.to_string()))).await;
            (StatusCode::BAD_REQUEST, page).into_response()
        }
    }
}

/// `POST /settings/reset` ("Restaurar Padrões").
pub async fn reset_settings(State(state): State<AppState>) -> Response {
    let defaults = state.settings.reset().await;
    state.set_refresh_interval(defaults.refresh_interval());
    info!("Settings restored to defaults");
    (
        [(header::SET_COOKIE, settings::theme_cookie(defaults.theme))],
        Redirect::to("/settings?notice=restored"),
    )
        .into_response()
}

/// `POST /theme`: header light/dark switch.
pub async fn toggle_theme(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ThemeForm>,
) -> Response {
    let current = settings::effective_theme(&headers, &state.settings.get().await);
    let next = current.toggled();
    state.settings.set_theme(next).await;
    (
        [(header::SET_COOKIE, settings::theme_cookie(next))],
        Redirect::to(&Page::from_id(&form.page).href()),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// Page dispatch
// ---------------------------------------------------------------------------

/// `GET /{page}`: unknown identifiers render the dashboard.
pub async fn page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    match Page::from_id(&id) {
        Page::Dashboard => render_dashboard(&state, &headers).await.into_response(),
        Page::History => render_history(&state, &headers, HistoryFilterParams::default())
            .await
            .into_response(),
        Page::Alerts => render_alerts(&state, &headers, AlertFilterParams::default())
            .await
            .into_response(),
        Page::Settings => render_settings(&state, &headers, None).await.into_response(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use axum::http::{header, HeaderValue, StatusCode};
    use axum_test::TestServer;
    use chrono::Utc;

    use super::*;
    use crate::{
        api::router,
        dashboard::{DashboardSnapshot, DashboardState},
        state::test_state,
        telemetry::{
            fake::{alert, reading, FakeSource},
            models::{AlertType, Severity},
            HistoryQuery,
        },
    };

    fn server(source: &Arc<FakeSource>) -> (TestServer, AppState) {
        let state = test_state(source.clone());
        (TestServer::new(router(state.clone())).unwrap(), state)
    }

    async fn publish_ready(state: &AppState) {
        let mut critical = alert("9", Severity::High, AlertType::Temperature, false);
        critical.message = "Temperatura crítica detectada".to_owned();
        state
            .dashboard
            .publish(DashboardState::Ready(DashboardSnapshot {
                reading: reading(35.0),
                alerts: vec![critical, alert("2", Severity::Medium, AlertType::Soil, false)],
                history: vec![reading(20.0), reading(35.0)],
                fetched_at: Utc::now(),
            }))
            .await;
    }

    // -----------------------------------------------------------------------
    // Dashboard / page dispatch
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn dashboard_shows_critical_banner() {
        let source = Arc::new(FakeSource::new());
        let (server, state) = server(&source);
        publish_ready(&state).await;

        let resp = server.get("/").await;
        resp.assert_status_ok();
        let html = resp.text();
        assert!(html.contains("alert-banner"));
        assert!(html.contains("Temperatura crítica detectada"));
        assert!(html.contains(r#"<meta http-equiv="refresh" content="30">"#));
    }

    #[tokio::test]
    async fn dashboard_before_first_tick_is_loading() {
        let source = Arc::new(FakeSource::new());
        let (server, _state) = server(&source);

        let html = server.get("/dashboard").await.text();
        assert!(html.contains("A carregar dados dos sensores"));
    }

    #[tokio::test]
    async fn unknown_page_renders_dashboard() {
        let source = Arc::new(FakeSource::new());
        let (server, state) = server(&source);
        publish_ready(&state).await;

        let unknown = server.get("/relatorios").await;
        unknown.assert_status_ok();
        let dashboard = server.get("/dashboard").await;
        // Timestamps inside the page are the same snapshot.
        assert_eq!(unknown.text(), dashboard.text());
    }

    #[tokio::test]
    async fn page_dispatch_reaches_every_view() {
        let source = Arc::new(FakeSource::new());
        let (server, _state) = server(&source);

        assert!(server.get("/history").await.text().contains("Histórico de Dados"));
        assert!(server.get("/alerts").await.text().contains("Filtros de Alertas"));
        assert!(server.get("/settings").await.text().contains("Guardar Configurações"));
    }

    // -----------------------------------------------------------------------
    // History
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn history_unsuccessful_envelope_renders_message() {
        let source = Arc::new(FakeSource::new());
        FakeSource::set(&source.history, Err(Some("x".to_owned())));
        let (server, _state) = server(&source);

        let resp = server.get("/history").await;
        resp.assert_status_ok();
        let html = resp.text();
        assert!(html.contains(r#"<span class="error-message">x</span>"#));
        assert!(!html.contains("<table"));
    }

    #[tokio::test]
    async fn history_without_message_uses_fallbacks() {
        let source = Arc::new(FakeSource::new());
        FakeSource::set(&source.history, Err(None));
        let (server, _state) = server(&source);

        let html = server.get("/history").await.text();
        assert!(html.contains(history::LOAD_ERROR));

        let html = server.get("/history?location=all&dateFrom=&dateTo=").await.text();
        assert!(html.contains(history::FILTER_ERROR));
    }

    #[tokio::test]
    async fn history_filter_is_forwarded() {
        let source = Arc::new(FakeSource::new());
        let (server, _state) = server(&source);

        server.get("/history").await.assert_status_ok();
        server
            .get("/history?location=Campo%20B&dateFrom=2024-05-01&dateTo=2024-05-02")
            .await
            .assert_status_ok();

        let queries = source.history_queries.lock().unwrap().clone();
        assert_eq!(queries[0], HistoryQuery::default());
        assert_eq!(queries[1].location.as_deref(), Some("Campo B"));
        assert!(queries[1].date_from.is_some() && queries[1].date_to.is_some());
    }

    #[tokio::test]
    async fn inverted_date_range_is_rejected() {
        let source = Arc::new(FakeSource::new());
        let (server, _state) = server(&source);

        let resp = server.get("/history?dateFrom=2024-05-03&dateTo=2024-05-01").await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        assert!(source.history_queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn export_returns_csv_attachment() {
        let source = Arc::new(FakeSource::new());
        let (server, _state) = server(&source);

        let resp = server.get("/history/export").await;
        resp.assert_status_ok();
        assert_eq!(resp.header(header::CONTENT_TYPE), "text/csv; charset=utf-8");
        let disposition = resp.header(header::CONTENT_DISPOSITION);
        let disposition = disposition.to_str().unwrap();
        assert!(disposition.starts_with("attachment; filename=\"historico-sensores-"));
        assert!(disposition.ends_with(".csv\""));

        let csv = resp.text();
        assert_eq!(csv.lines().count(), 3);
        assert!(csv.starts_with("Data/Hora,Localização,"));
    }

    #[tokio::test]
    async fn failed_export_renders_error_panel() {
        let source = Arc::new(FakeSource::new());
        FakeSource::set(&source.export, Err(None));
        let (server, _state) = server(&source);

        let resp = server.get("/history/export").await;
        resp.assert_status(StatusCode::BAD_GATEWAY);
        assert!(resp.text().contains(EXPORT_ERROR));
    }

    // -----------------------------------------------------------------------
    // Alerts
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn alerts_filter_by_severity() {
        let source = Arc::new(FakeSource::new());
        let (server, _state) = server(&source);

        let html = server.get("/alerts?severity=medium&type=all&status=all").await.text();
        assert!(html.contains(r#"href="/alerts/2""#));
        assert!(!html.contains(r#"href="/alerts/1""#));
    }

    #[tokio::test]
    async fn alerts_contradictory_filter_is_empty() {
        let source = Arc::new(FakeSource::new());
        let (server, _state) = server(&source);

        let html = server.get("/alerts?severity=low&type=temperature").await.text();
        assert!(html.contains("Nenhum alerta encontrado"));
    }

    #[tokio::test]
    async fn unknown_filter_value_is_bad_request() {
        let source = Arc::new(FakeSource::new());
        let (server, _state) = server(&source);

        server
            .get("/alerts?severity=urgent")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn alert_detail_and_resolve_round_trip() {
        let source = Arc::new(FakeSource::new());
        let (server, _state) = server(&source);

        let html = server.get("/alerts/1").await.text();
        assert!(html.contains("Descrição do alerta 1"));
        assert!(html.contains("Marcar como Resolvido"));

        let resp = server.post("/alerts/1/resolve").await;
        resp.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(resp.header(header::LOCATION), "/alerts/1?resolved=1");

        let html = server.get("/alerts/1?resolved=1").await.text();
        assert!(html.contains(RESOLVE_NOTICE));
    }

    #[tokio::test]
    async fn dismissed_alert_leaves_dashboard_banner() {
        let source = Arc::new(FakeSource::new());
        let (server, state) = server(&source);
        publish_ready(&state).await;

        let resp = server.post("/alerts/9/dismiss").await;
        resp.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(resp.header(header::LOCATION), "/dashboard");
        let set_cookie = resp.header(header::SET_COOKIE);
        let set_cookie = set_cookie.to_str().unwrap();
        assert!(set_cookie.starts_with("agrochain-dismissed=id=9;"));

        let pair = set_cookie.split(';').next().unwrap().to_owned();
        let html = server
            .get("/")
            .add_header(header::COOKIE, HeaderValue::from_str(&pair).unwrap())
            .await
            .text();
        assert!(!html.contains("Temperatura crítica detectada"));
        assert!(html.contains("sensor-card"));

        // The alert itself is still listed.
        let alerts = server.get("/alerts").await.text();
        assert!(alerts.contains(r#"href="/alerts/1""#));
    }

    #[tokio::test]
    async fn unknown_alert_is_not_found() {
        let source = Arc::new(FakeSource::new());
        let (server, _state) = server(&source);

        server.get("/alerts/404").await.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn odd_alert_ids_round_trip_through_links() {
        let source = Arc::new(FakeSource::new());
        let mut odd = alert("a b/c", Severity::Medium, AlertType::Gas, false);
        odd.description = "Sensor de gás no armazém".to_owned();
        FakeSource::set(&source.alerts, Ok(vec![odd]));
        let (server, _state) = server(&source);

        let list = server.get("/alerts").await.text();
        assert!(list.contains(r#"href="/alerts/a%20b%2Fc""#));

        let detail = server.get("/alerts/a%20b%2Fc").await;
        detail.assert_status_ok();
        assert!(detail.text().contains("Sensor de gás no armazém"));

        let resp = server.post("/alerts/a%20b%2Fc/resolve").await;
        assert_eq!(resp.header(header::LOCATION), "/alerts/a%20b%2Fc?resolved=1");
    }

    // -----------------------------------------------------------------------
    // Settings / theme
    // -----------------------------------------------------------------------

    fn settings_form(refresh: &'static str) -> Vec<(&'static str, &'static str)> {
        vec![
            ("theme", "dark"),
            ("language", "pt"),
            ("temperature_alerts", "on"),
            ("alert_email", ""),
            ("api_url", ""),
            ("refresh_interval", refresh),
            ("session_timeout", "30"),
        ]
    }

    #[tokio::test]
    async fn saving_settings_updates_store_interval_and_cookie() {
        let source = Arc::new(FakeSource::new());
        let (server, state) = server(&source);

        let resp = server.post("/settings").form(&settings_form("10")).await;
        resp.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(resp.header(header::LOCATION), "/settings?notice=saved");
        let cookie = resp.header(header::SET_COOKIE);
        assert!(cookie.to_str().unwrap().starts_with("agrochain-theme=dark;"));

        let saved = state.settings.get().await;
        assert!(saved.temperature_alerts);
        assert!(!saved.humidity_alerts);
        assert_eq!(saved.session_timeout_mins, 30);
        assert_eq!(*state.refresh_tx.borrow(), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn invalid_refresh_interval_is_rejected() {
        let source = Arc::new(FakeSource::new());
        let (server, state) = server(&source);

        let resp = server.post("/settings").form(&settings_form("15")).await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        assert!(resp.text().contains("Taxa de atualização inválida"));
        assert_eq!(state.settings.get().await, Settings::default());
    }

    #[tokio::test]
    async fn reset_restores_defaults() {
        let source = Arc::new(FakeSource::new());
        let (server, state) = server(&source);

        server.post("/settings").form(&settings_form("300")).await;
        let resp = server.post("/settings/reset").await;
        resp.assert_status(StatusCode::SEE_OTHER);

        assert_eq!(state.settings.get().await, Settings::default());
        assert_eq!(*state.refresh_tx.borrow(), Duration::from_secs(30));
        let html = server.get("/settings?notice=restored").await.text();
        assert!(html.contains("Configurações padrão restauradas."));
    }

    #[tokio::test]
    async fn theme_toggle_uses_cookie_and_returns_to_page() {
        let source = Arc::new(FakeSource::new());
        let (server, state) = server(&source);

        let resp = server
            .post("/theme")
            .add_header(header::COOKIE, HeaderValue::from_static("agrochain-theme=dark"))
            .form(&[("page", "alerts")])
            .await;
        resp.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(resp.header(header::LOCATION), "/alerts");
        assert!(resp
            .header(header::SET_COOKIE)
            .to_str()
            .unwrap()
            .starts_with("agrochain-theme=light;"));
        assert_eq!(state.settings.get().await.theme, settings::Theme::Light);

        let html = server
            .get("/")
            .add_header(header::COOKIE, HeaderValue::from_static("agrochain-theme=dark"))
            .await
            .text();
        assert!(html.contains(r#"class="theme-dark""#));
    }
}
