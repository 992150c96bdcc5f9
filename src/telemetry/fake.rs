//! Scripted `TelemetrySource` shared by unit tests.

use std::{sync::Mutex, time::Duration};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use super::{
    models::{Alert, AlertType, HistoryRecord, SensorReading, Severity},
    HistoryQuery, TelemetrySource,
};
use crate::error::ApiError;

/// `Err(message)` is answered as `ApiError::Unsuccessful { message }`.
pub(crate) type Scripted<T> = Result<T, Option<String>>;

pub(crate) struct FakeSource {
    pub reading: Mutex<Scripted<SensorReading>>,
    pub alerts: Mutex<Scripted<Vec<Alert>>>,
    pub recent: Mutex<Scripted<Vec<SensorReading>>>,
    pub history: Mutex<Scripted<Vec<HistoryRecord>>>,
    pub export: Mutex<Scripted<Vec<HistoryRecord>>>,
    /// Endpoint names in call order.
    pub calls: Mutex<Vec<&'static str>>,
    pub history_queries: Mutex<Vec<HistoryQuery>>,
    /// Delay applied before answering `current_reading`.
    pub reading_delay: Mutex<Option<Duration>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self {
            reading: Mutex::new(Ok(reading(24.5))),
            alerts: Mutex::new(Ok(vec![
                alert("1", Severity::High, AlertType::Temperature, false),
                alert("2", Severity::Medium, AlertType::Soil, false),
            ])),
            recent: Mutex::new(Ok(vec![reading(20.0), reading(24.5)])),
            history: Mutex::new(Ok(vec![record("h1", "Campo A")])),
            export: Mutex::new(Ok(vec![record("h1", "Campo A"), record("h2", "Campo B")])),
            calls: Mutex::new(Vec::new()),
            history_queries: Mutex::new(Vec::new()),
            reading_delay: Mutex::new(None),
        }
    }

    pub fn set<T>(slot: &Mutex<Scripted<T>>, value: Scripted<T>) {
        *slot.lock().unwrap() = value;
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn answer<T: Clone>(&self, name: &'static str, slot: &Mutex<Scripted<T>>) -> Result<T, ApiError> {
        self.calls.lock().unwrap().push(name);
        slot.lock()
            .unwrap()
            .clone()
            .map_err(|message| ApiError::Unsuccessful { message })
    }
}

#[async_trait]
impl TelemetrySource for FakeSource {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn current_reading(&self) -> Result<SensorReading, ApiError> {
        let delay = *self.reading_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.answer("current_reading", &self.reading)
    }

    async fn alerts(&self) -> Result<Vec<Alert>, ApiError> {
        self.answer("alerts", &self.alerts)
    }

    async fn recent_history(&self, _limit: usize) -> Result<Vec<SensorReading>, ApiError> {
        self.answer("recent_history", &self.recent)
    }

    async fn history(&self, query: &HistoryQuery) -> Result<Vec<HistoryRecord>, ApiError> {
        self.history_queries.lock().unwrap().push(query.clone());
        self.answer("history", &self.history)
    }

    async fn export_history(&self) -> Result<Vec<HistoryRecord>, ApiError> {
        self.answer("export_history", &self.export)
    }
}

pub(crate) fn reading(temperature: f64) -> SensorReading {
    SensorReading {
        temperature,
        humidity: 65.0,
        soil_moisture: 78.0,
        gas: 342.0,
        smoke: 12.0,
        luminosity: 850.0,
        atmospheric_pressure: 1013.2,
        co2: 410.0,
        timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    }
}

pub(crate) fn alert(id: &str, severity: Severity, alert_type: AlertType, resolved: bool) -> Alert {
    Alert {
        id: id.to_owned(),
        message: format!("Alerta {id}"),
        description: format!("Descrição do alerta {id}"),
        severity,
        alert_type,
        timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 11, 30, 0).unwrap(),
        location: "Campo A".to_owned(),
        resolved,
    }
}

pub(crate) fn record(id: &str, location: &str) -> HistoryRecord {
    HistoryRecord {
        id: id.to_owned(),
        timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 9, 5, 0).unwrap(),
        location: location.to_owned(),
        temperature: 22.46,
        humidity: 60.04,
        soil_moisture: 41.25,
        gas: 300.4,
        smoke: 5.6,
        luminosity: 812.5,
        atmospheric_pressure: 1012.64,
        co2: 415.49,
    }
}
