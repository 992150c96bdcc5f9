//! Deterministic telemetry for development mode (`DATA_SOURCE=mock`).

use async_trait::async_trait;
use chrono::{DateTime, Duration, DurationRound, Utc};

use super::{
    models::{Alert, AlertType, HistoryRecord, SensorReading, Severity},
    HistoryQuery, TelemetrySource,
};
use crate::{error::ApiError, history::LOCATIONS};

/// Spacing between generated history records of one location.
const HISTORY_STEP_MINUTES: i64 = 10;
/// Records generated per location (24 hours).
const HISTORY_LEN: i64 = 144;

#[derive(Debug, Clone)]
pub struct MockSource {
    /// Every generated timestamp is relative to this instant.
    anchor: DateTime<Utc>,
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSource {
    pub fn new() -> Self {
        let now = Utc::now();
        Self::at(now.duration_trunc(Duration::minutes(1)).unwrap_or(now))
    }

    pub fn at(anchor: DateTime<Utc>) -> Self {
        Self { anchor }
    }

    fn reading_at(&self, minutes_ago: i64) -> SensorReading {
        let phase = minutes_ago as f64 / 7.0;
        SensorReading {
            temperature: round1(24.5 + 2.5 * phase.sin()),
            humidity: round1(65.0 + 5.0 * phase.cos()),
            soil_moisture: round1(78.0 - (minutes_ago % 30) as f64 * 0.1),
            gas: (342.0 + 20.0 * (phase * 0.5).sin()).round(),
            smoke: (12.0 + 3.0 * phase.cos()).round(),
            luminosity: (850.0 + 120.0 * (phase * 0.3).sin()).round(),
            atmospheric_pressure: round1(1013.2 + 1.5 * (phase * 0.2).cos()),
            co2: (410.0 + 15.0 * (phase * 0.7).sin()).round(),
            timestamp: self.anchor - Duration::minutes(minutes_ago),
        }
    }

    fn records(&self) -> Vec<HistoryRecord> {
        let mut records = Vec::with_capacity(LOCATIONS.len() * HISTORY_LEN as usize);
        for step in 0..HISTORY_LEN {
            for (offset, location) in LOCATIONS.iter().enumerate() {
                let minutes_ago = step * HISTORY_STEP_MINUTES;
                let r = self.reading_at(minutes_ago + offset as i64 * 3);
                records.push(HistoryRecord {
                    id: format!("{}-{step}", offset + 1),
                    timestamp: self.anchor - Duration::minutes(minutes_ago),
                    location: (*location).to_owned(),
                    temperature: r.temperature,
                    humidity: r.humidity,
                    soil_moisture: r.soil_moisture,
                    gas: r.gas,
                    smoke: r.smoke,
                    luminosity: r.luminosity,
                    atmospheric_pressure: r.atmospheric_pressure,
                    co2: r.co2,
                });
            }
        }
        records
    }

    #[allow(clippy::too_many_arguments)]
    fn alert(
        &self,
        id: &str,
        message: &str,
        description: &str,
        severity: Severity,
        alert_type: AlertType,
        minutes_ago: i64,
        location: &str,
        resolved: bool,
    ) -> Alert {
        Alert {
            id: id.to_owned(),
            message: message.to_owned(),
            description: description.to_owned(),
            severity,
            alert_type,
            timestamp: self.anchor - Duration::minutes(minutes_ago),
            location: location.to_owned(),
            resolved,
        }
    }
}

#[async_trait]
impl TelemetrySource for MockSource {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn current_reading(&self) -> Result<SensorReading, ApiError> {
        Ok(self.reading_at(0))
    }

    async fn alerts(&self) -> Result<Vec<Alert>, ApiError> {
        Ok(vec![
            self.alert(
                "1",
                "Temperatura crítica detectada",
                "A temperatura no Campo A atingiu 35°C, ultrapassando o limite máximo \
                 recomendado de 30°C. Recomenda-se verificar o sistema de irrigação e ventilação.",
                Severity::High,
                AlertType::Temperature,
                30,
                "Campo A",
                false,
            ),
            self.alert(
                "2",
                "Humidade do solo baixa",
                "A humidade do solo no Campo B está em 25%, abaixo do recomendado (40-60%). \
                 Sistema de irrigação deve ser ativado.",
                Severity::Medium,
                AlertType::Soil,
                60,
                "Campo B",
                false,
            ),
            self.alert(
                "3",
                "Nível de gás elevado",
                "Detectados 450ppm de gases no Campo C. Verificar possível vazamento ou \
                 fermentação excessiva.",
                Severity::High,
                AlertType::Gas,
                120,
                "Campo C",
                true,
            ),
            self.alert(
                "4",
                "Humidade relativa alta",
                "Humidade do ar em 85% no Campo A. Risco de desenvolvimento de fungos.",
                Severity::Medium,
                AlertType::Humidity,
                180,
                "Campo A",
                false,
            ),
            self.alert(
                "5",
                "CO₂ acima do normal",
                "Concentração de CO₂ de 1200ppm na estufa do Campo B. Verificar ventilação.",
                Severity::Low,
                AlertType::Co2,
                240,
                "Campo B",
                false,
            ),
        ])
    }

    async fn recent_history(&self, limit: usize) -> Result<Vec<SensorReading>, ApiError> {
        // Oldest first, one reading per minute, ending at the current reading.
        Ok((0..limit as i64).rev().map(|m| self.reading_at(m)).collect())
    }

    async fn history(&self, query: &HistoryQuery) -> Result<Vec<HistoryRecord>, ApiError> {
        Ok(self
            .records()
            .into_iter()
            .filter(|r| query.location.as_ref().is_none_or(|l| &r.location == l))
            .filter(|r| query.date_from.is_none_or(|from| r.timestamp >= from))
            .filter(|r| query.date_to.is_none_or(|to| r.timestamp <= to))
            .collect())
    }

    async fn export_history(&self) -> Result<Vec<HistoryRecord>, ApiError> {
        Ok(self.records())
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
