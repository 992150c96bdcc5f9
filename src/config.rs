use std::{str::FromStr, time::Duration};

use anyhow::{Context, Result};

use crate::settings::REFRESH_INTERVALS;

// ---------------------------------------------------------------------------
// DataSourceKind
// ---------------------------------------------------------------------------

/// Where telemetry comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSourceKind {
    /// REST client against `API_BASE_URL`.
    Api,
    /// Built-in deterministic test data.
    Mock,
}

impl FromStr for DataSourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "api" => Ok(Self::Api),
            "mock" => Ok(Self::Mock),
            other => Err(anyhow::anyhow!("unknown data source: {other:?}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub data_source: DataSourceKind,
    pub server_host: String,
    pub server_port: u16,
    /// Initial dashboard polling interval in seconds.
    pub refresh_interval_secs: u64,
    /// `N` in `/sensors/history?limit=N` for the dashboard charts.
    pub recent_history_limit: usize,
    /// Per-request timeout of the REST client in seconds.
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            api_base_url: optional("API_BASE_URL", "http://localhost:8000/api"),
            data_source: optional("DATA_SOURCE", "api")
                .trim()
                .parse()
                .context("DATA_SOURCE must be 'api' or 'mock'")?,
            server_host: optional("SERVER_HOST", "0.0.0.0"),
            server_port: optional("SERVER_PORT", "8080")
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
            refresh_interval_secs: optional("REFRESH_INTERVAL_SECS", "30")
                .parse()
                .context("REFRESH_INTERVAL_SECS must be a positive integer")?,
            recent_history_limit: optional("RECENT_HISTORY_LIMIT", "20")
                .parse()
                .context("RECENT_HISTORY_LIMIT must be a positive integer")?,
            request_timeout_secs: optional("REQUEST_TIMEOUT_SECS", "10")
                .parse()
                .context("REQUEST_TIMEOUT_SECS must be a positive integer")?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            REFRESH_INTERVALS.contains(&self.refresh_interval_secs),
            "REFRESH_INTERVAL_SECS must be one of {REFRESH_INTERVALS:?}, got {}",
            self.refresh_interval_secs
        );
        anyhow::ensure!(
            self.request_timeout_secs > 0,
            "REQUEST_TIMEOUT_SECS must be greater than zero"
        );
        anyhow::ensure!(
            self.recent_history_limit > 0,
            "RECENT_HISTORY_LIMIT must be greater than zero"
        );
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn optional(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}
