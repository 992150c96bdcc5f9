use crate::{
    dashboard::{DashboardSnapshot, DashboardState},
    history::export::format_timestamp,
    telemetry::models::{Alert, Metric},
};

use super::components::{AlertBanner, CardModel, ChartModel, ErrorPanel, LoadingPanel, SensorCard, SensorChart};

/// Metrics drawn as charts, in display order.
pub const CHART_METRICS: [Metric; 6] = [
    Metric::Temperature,
    Metric::Humidity,
    Metric::SoilMoisture,
    Metric::Gas,
    Metric::Luminosity,
    Metric::Co2,
];

pub struct ReadyModel {
    pub critical: Vec<Alert>,
    pub cards: Vec<CardModel>,
    pub charts: Vec<ChartModel>,
    pub updated_at: String,
}

impl ReadyModel {
    /// `dismissed` ids are left out of the banner.
    pub fn new(snapshot: &DashboardSnapshot, dismissed: &[String]) -> Self {
        Self {
            critical: snapshot
                .critical_alerts()
                .into_iter()
                .filter(|a| !dismissed.contains(&a.id))
                .collect(),
            cards: Metric::ALL
                .into_iter()
                .map(|m| CardModel::new(m, &snapshot.reading, snapshot.trend(m)))
                .collect(),
            charts: CHART_METRICS
                .into_iter()
                .map(|m| ChartModel::new(m, &snapshot.history))
                .collect(),
            updated_at: format_timestamp(&snapshot.fetched_at),
        }
    }
}

markup::define! {
    DashboardView<'a>(state: &'a DashboardState, dismissed: &'a [String]) {
        h2 { "Dashboard" }
        @match state {
            DashboardState::Loading => {
                @LoadingPanel {}
            }
            DashboardState::Failed { message, at } => {
                @ErrorPanel { message }
                p.muted { "Última tentativa: " @format_timestamp(at) " (UTC)" }
            }
            DashboardState::Ready(snapshot) => {
                @DashboardReady { model: &ReadyModel::new(snapshot, dismissed) }
            }
        }
    }

    DashboardReady<'a>(model: &'a ReadyModel) {
        @AlertBanner { alerts: &model.critical }
        div."cards-grid" {
            @for card in model.cards.iter() {
                @SensorCard { card }
            }
        }
        div."charts-grid" {
            @for chart in model.charts.iter() {
                @SensorChart { chart }
            }
        }
        p.muted { "Atualizado em " @model.updated_at " (UTC)" }
    }
}
