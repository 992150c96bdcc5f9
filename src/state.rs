use std::{sync::Arc, time::Duration};

use tokio::sync::watch;

use crate::{dashboard::DashboardStore, settings::SettingsStore, telemetry::TelemetrySource};

/// Shared handles passed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn TelemetrySource>,
    pub dashboard: DashboardStore,
    pub settings: SettingsStore,
    /// Feeds the dashboard poller's refresh interval.
    pub refresh_tx: Arc<watch::Sender<Duration>>,
}

impl AppState {
    pub fn new(
        source: Arc<dyn TelemetrySource>,
        dashboard: DashboardStore,
        settings: SettingsStore,
        refresh_tx: watch::Sender<Duration>,
    ) -> Self {
        Self {
            source,
            dashboard,
            settings,
            refresh_tx: Arc::new(refresh_tx),
        }
    }

    /// Succeeds even when the poller is not running.
    pub fn set_refresh_interval(&self, interval: Duration) {
        self.refresh_tx.send_replace(interval);
    }
}

/// State over a scripted source with default settings and no poller.
#[cfg(test)]
pub(crate) fn test_state(source: Arc<crate::telemetry::fake::FakeSource>) -> AppState {
    use crate::settings::Settings;

    let defaults = Settings::default();
    let (refresh_tx, _) = watch::channel(defaults.refresh_interval());
    AppState::new(
        source,
        DashboardStore::new(),
        SettingsStore::new(defaults),
        refresh_tx,
    )
}
