pub mod mock;
pub mod models;

#[cfg(test)]
pub(crate) mod fake;

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::ApiError;

use self::models::{Alert, ApiResponse, HistoryRecord, SensorReading};

// ---------------------------------------------------------------------------
// Source abstraction
// ---------------------------------------------------------------------------

/// Read-only access to the telemetry backend, one method per endpoint.
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Short name used in log fields.
    fn name(&self) -> &'static str;

    /// `GET /sensors/current`
    async fn current_reading(&self) -> Result<SensorReading, ApiError>;

    /// `GET /alerts`
    async fn alerts(&self) -> Result<Vec<Alert>, ApiError>;

    /// `GET /sensors/history?limit=N`
    async fn recent_history(&self, limit: usize) -> Result<Vec<SensorReading>, ApiError>;

    /// `GET /sensors/history` with optional `location`, `dateFrom`, `dateTo`.
    async fn history(&self, query: &HistoryQuery) -> Result<Vec<HistoryRecord>, ApiError>;

    /// `GET /sensors/history/export`
    async fn export_history(&self) -> Result<Vec<HistoryRecord>, ApiError>;
}

/// Server-side history filter as sent on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryQuery {
    pub location: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

impl HistoryQuery {
    pub fn is_empty(&self) -> bool {
        self.location.is_none() && self.date_from.is_none() && self.date_to.is_none()
    }

    /// Query parameters in wire order. Dates use the ISO-8601 form
    /// `2024-05-01T00:00:00.000Z`.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(location) = &self.location {
            pairs.push(("location", location.clone()));
        }
        if let Some(from) = self.date_from {
            pairs.push(("dateFrom", from.to_rfc3339_opts(SecondsFormat::Millis, true)));
        }
        if let Some(to) = self.date_to {
            pairs.push(("dateTo", to.to_rfc3339_opts(SecondsFormat::Millis, true)));
        }
        pairs
    }
}

// ---------------------------------------------------------------------------
// REST client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Builds a client for `base_url`, e.g. `http://localhost:8000/api`.
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        Url::parse(base_url)
            .map_err(|e| anyhow::anyhow!("API_BASE_URL is not a valid URL ({base_url:?}): {e}"))?;
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url: base_url.trim_end_matches('/').to_owned(),
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&format!("{}{}", self.inner.base_url, path))
            .map_err(|e| ApiError::Url(e.to_string()))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// GET `path`, then unwrap the `{data, success, message}` envelope.
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.url(path, query)?;
        debug!(url = %url, "Requesting telemetry");

        let resp = self.inner.http.get(url.clone()).send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;

        if !status.is_success() {
            // Error bodies may still carry the envelope with a message.
            let message = serde_json::from_slice::<ApiResponse<serde_json::Value>>(&bytes)
                .ok()
                .and_then(|env| env.message)
                .filter(|m| !m.trim().is_empty());
            warn!(url = %url, status = status.as_u16(), "Telemetry API returned error status");
            return match message {
                Some(message) => Err(ApiError::Unsuccessful {
                    message: Some(message),
                }),
                None => Err(ApiError::Status(status.as_u16())),
            };
        }

        serde_json::from_slice::<ApiResponse<T>>(&bytes)?.into_result()
    }
}

#[async_trait]
impl TelemetrySource for ApiClient {
    fn name(&self) -> &'static str {
        "api"
    }

    async fn current_reading(&self) -> Result<SensorReading, ApiError> {
        self.get("/sensors/current", &[]).await
    }

    async fn alerts(&self) -> Result<Vec<Alert>, ApiError> {
        self.get("/alerts", &[]).await
    }

    async fn recent_history(&self, limit: usize) -> Result<Vec<SensorReading>, ApiError> {
        self.get("/sensors/history", &[("limit", limit.to_string())])
            .await
    }

    async fn history(&self, query: &HistoryQuery) -> Result<Vec<HistoryRecord>, ApiError> {
        self.get("/sensors/history", &query.to_pairs()).await
    }

    async fn export_history(&self) -> Result<Vec<HistoryRecord>, ApiError> {
        self.get("/sensors/history/export", &[]).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
