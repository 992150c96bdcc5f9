use std::sync::Arc;

use anyhow::Result;
use tokio::{net::TcpListener, signal, sync::watch};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use agrochain_dashboard::{
    api,
    config::{Config, DataSourceKind},
    dashboard::{DashboardPoller, DashboardStore},
    settings::{Settings, SettingsStore},
    state::AppState,
    telemetry::{mock::MockSource, ApiClient, TelemetrySource},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env (ignore error if file absent, env vars may be set externally)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;

    let source: Arc<dyn TelemetrySource> = match config.data_source {
        DataSourceKind::Api => {
            let client = ApiClient::new(&config.api_base_url, config.request_timeout())?;
            info!(base_url = client.base_url(), "Using telemetry API");
            Arc::new(client)
        }
        DataSourceKind::Mock => {
            info!("Using built-in mock telemetry");
            Arc::new(MockSource::new())
        }
    };

    let dashboard = DashboardStore::new();
    let settings = SettingsStore::new(Settings::with_refresh_interval(config.refresh_interval_secs));
    let (refresh_tx, refresh_rx) = watch::channel(config.refresh_interval());
    let cancel = CancellationToken::new();

    // Spawn dashboard polling task
    let poller = DashboardPoller::new(
        source.clone(),
        dashboard.clone(),
        config.recent_history_limit,
        refresh_rx,
        cancel.clone(),
    );
    let polling = tokio::spawn(poller.run());

    let state = AppState::new(source, dashboard, settings, refresh_tx);

    // Start HTTP server
    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal(cancel.clone()))
        .await?;

    cancel.cancel();
    polling.await?;
    Ok(())
}

async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
    cancel.cancel();
}
