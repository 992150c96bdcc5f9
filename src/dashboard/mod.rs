pub mod poller;
pub mod store;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    alerts,
    error::ApiError,
    telemetry::{
        models::{Alert, Metric, SensorReading},
        TelemetrySource,
    },
};

pub use poller::DashboardPoller;
pub use store::DashboardStore;

pub const LOAD_ERROR: &str = "Erro ao carregar dados dos sensores";

/// Everything the Dashboard view shows, fetched in one poll tick.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DashboardSnapshot {
    pub reading: SensorReading,
    pub alerts: Vec<Alert>,
    /// Oldest first.
    pub history: Vec<SensorReading>,
    pub fetched_at: DateTime<Utc>,
}

impl DashboardSnapshot {
    pub fn critical_alerts(&self) -> Vec<Alert> {
        alerts::critical_alerts(&self.alerts)
    }

    pub fn trend(&self, metric: Metric) -> Trend {
        Trend::of(metric, &self.history)
    }

    pub fn series(&self, metric: Metric) -> Vec<f64> {
        self.history.iter().map(|r| metric.of(r)).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardState {
    /// No poll tick has completed yet.
    Loading,
    Ready(DashboardSnapshot),
    /// The latest tick failed; no stale data is kept alongside the failure.
    Failed { message: String, at: DateTime<Utc> },
}

/// Fetches reading, alerts and recent history, strictly in that order.
///
/// The snapshot is only returned once all three calls succeeded; the first
/// failure aborts the remaining calls.
pub async fn fetch_snapshot(
    source: &dyn TelemetrySource,
    history_limit: usize,
) -> Result<DashboardSnapshot, ApiError> {
    let reading = source.current_reading().await?;
    let alerts = source.alerts().await?;
    let history = source.recent_history(history_limit).await?;
    Ok(DashboardSnapshot {
        reading,
        alerts,
        history,
        fetched_at: Utc::now(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl Trend {
    /// Compares the newest against the oldest value of `history`; changes
    /// within 1% of the oldest value count as stable.
    pub fn of(metric: Metric, history: &[SensorReading]) -> Trend {
        let (Some(first), Some(last)) = (history.first(), history.last()) else {
            return Trend::Stable;
        };
        let (first, last) = (metric.of(first), metric.of(last));
        let tolerance = (first.abs() * 0.01).max(0.01);
        if (last - first).abs() <= tolerance {
            Trend::Stable
        } else if last > first {
            Trend::Up
        } else {
            Trend::Down
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Trend::Up => "Subindo",
            Trend::Down => "Descendo",
            Trend::Stable => "Estável",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Trend::Up => "trend trend-up",
            Trend::Down => "trend trend-down",
            Trend::Stable => "trend trend-stable",
        }
    }
}
