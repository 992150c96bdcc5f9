use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ApiError;

// ---------------------------------------------------------------------------
// Generic response envelope
//
// Every telemetry endpoint wraps its payload in the same outer object:
//
// Success:
//   { "success": true, "data": <T> }
//
// Failure:
//   { "success": false, "message": "..." }
//
// `message` is optional on failure; `data` may be absent on failure.
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Serialize)]
pub struct ApiResponse<T> {
    /// `true` on success, `false` on API-level failure.
    pub success: bool,

    /// Present on success.
    pub data: Option<T>,

    /// Human-readable error message, usually present on failure.
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    /// Convert into `Result<T, ApiError>`, mapping API-level failures to errors.
    pub fn into_result(self) -> Result<T, ApiError> {
        if self.success {
            self.data.ok_or_else(|| {
                ApiError::Decode("success=true but data field is missing".to_owned())
            })
        } else {
            Err(ApiError::Unsuccessful {
                message: self.message.filter(|m| !m.trim().is_empty()),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor reading: GET /sensors/current, GET /sensors/history?limit=N
// ---------------------------------------------------------------------------

/// One point-in-time snapshot of every sensor.
///
/// Numeric fields missing from a response deserialize as `0.0`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    /// Degrees Celsius
    #[serde(default)]
    pub temperature: f64,
    /// Relative air humidity, percent
    #[serde(default)]
    pub humidity: f64,
    /// Soil moisture, percent
    #[serde(default)]
    pub soil_moisture: f64,
    /// ppm
    #[serde(default)]
    pub gas: f64,
    /// ppm
    #[serde(default)]
    pub smoke: f64,
    /// lx
    #[serde(default)]
    pub luminosity: f64,
    /// hPa
    #[serde(default)]
    pub atmospheric_pressure: f64,
    /// ppm
    #[serde(default)]
    pub co2: f64,
    pub timestamp: DateTime<Utc>,
}

/// Selects one numeric field of a reading, used for cards and charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Temperature,
    Humidity,
    SoilMoisture,
    Gas,
    Smoke,
    Luminosity,
    AtmosphericPressure,
    Co2,
}

impl Metric {
    pub const ALL: [Metric; 8] = [
        Metric::Temperature,
        Metric::Humidity,
        Metric::SoilMoisture,
        Metric::Gas,
        Metric::Smoke,
        Metric::Luminosity,
        Metric::AtmosphericPressure,
        Metric::Co2,
    ];

    pub fn of(self, reading: &SensorReading) -> f64 {
        match self {
            Metric::Temperature => reading.temperature,
            Metric::Humidity => reading.humidity,
            Metric::SoilMoisture => reading.soil_moisture,
            Metric::Gas => reading.gas,
            Metric::Smoke => reading.smoke,
            Metric::Luminosity => reading.luminosity,
            Metric::AtmosphericPressure => reading.atmospheric_pressure,
            Metric::Co2 => reading.co2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Temperature => "Temperatura",
            Metric::Humidity => "Humidade do Ar",
            Metric::SoilMoisture => "Humidade do Solo",
            Metric::Gas => "Gás",
            Metric::Smoke => "Fumaça",
            Metric::Luminosity => "Luminosidade",
            Metric::AtmosphericPressure => "Pressão Atmosférica",
            Metric::Co2 => "CO₂",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Metric::Temperature => "°C",
            Metric::Humidity | Metric::SoilMoisture => "%",
            Metric::Gas | Metric::Smoke | Metric::Co2 => "ppm",
            Metric::Luminosity => "lx",
            Metric::AtmosphericPressure => "hPa",
        }
    }

    /// Decimal places used when the value is displayed or exported.
    pub fn precision(self) -> usize {
        match self {
            Metric::Gas | Metric::Smoke | Metric::Luminosity | Metric::Co2 => 0,
            _ => 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Alerts: GET /alerts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::High, Severity::Medium, Severity::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Low => "Baixo",
            Severity::Medium => "Médio",
            Severity::High => "Crítico",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Severity::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("severity", s))
    }
}

/// Sensor category an alert refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Temperature,
    Humidity,
    Soil,
    Gas,
    Smoke,
    Luminosity,
    Pressure,
    Co2,
}

impl AlertType {
    pub const ALL: [AlertType; 8] = [
        AlertType::Temperature,
        AlertType::Humidity,
        AlertType::Soil,
        AlertType::Gas,
        AlertType::Smoke,
        AlertType::Luminosity,
        AlertType::Pressure,
        AlertType::Co2,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AlertType::Temperature => "temperature",
            AlertType::Humidity => "humidity",
            AlertType::Soil => "soil",
            AlertType::Gas => "gas",
            AlertType::Smoke => "smoke",
            AlertType::Luminosity => "luminosity",
            AlertType::Pressure => "pressure",
            AlertType::Co2 => "co2",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AlertType::Temperature => "Temperatura",
            AlertType::Humidity => "Humidade",
            AlertType::Soil => "Solo",
            AlertType::Gas => "Gás",
            AlertType::Smoke => "Fumaça",
            AlertType::Luminosity => "Luminosidade",
            AlertType::Pressure => "Pressão",
            AlertType::Co2 => "CO₂",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AlertType::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("alert type", s))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct Alert {
    pub id: String,
    /// Short headline shown in lists and the critical banner.
    pub message: String,
    #[serde(default)]
    pub description: String,
    pub severity: Severity,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub resolved: bool,
}

impl Alert {
    /// High severity and still unresolved.
    pub fn is_critical(&self) -> bool {
        self.severity == Severity::High && !self.resolved
    }
}

// ---------------------------------------------------------------------------
// History: GET /sensors/history, GET /sensors/history/export
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default)]
    pub humidity: f64,
    #[serde(default)]
    pub soil_moisture: f64,
    #[serde(default)]
    pub gas: f64,
    #[serde(default)]
    pub smoke: f64,
    #[serde(default)]
    pub luminosity: f64,
    #[serde(default)]
    pub atmospheric_pressure: f64,
    #[serde(default)]
    pub co2: f64,
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value:?}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
