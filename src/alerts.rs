use axum::http::HeaderMap;
use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;
use utoipa::IntoParams;

use crate::{
    settings,
    telemetry::models::{Alert, AlertType, ParseEnumError, Severity},
};

/// Characters of the description shown on an alert card.
pub const PREVIEW_CHARS: usize = 120;

pub const LOAD_ERROR: &str = "Erro ao carregar alertas";

/// Ids hidden from the dashboard banner, as a session cookie.
pub const DISMISSED_COOKIE: &str = "agrochain-dismissed";
/// Most recent dismissals kept in the cookie.
pub const MAX_DISMISSED: usize = 50;

// ---------------------------------------------------------------------------
// Filter selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Resolved,
}

impl StatusFilter {
    pub const ALL: [StatusFilter; 3] = [StatusFilter::All, StatusFilter::Active, StatusFilter::Resolved];

    pub fn as_str(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Active => "active",
            StatusFilter::Resolved => "resolved",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "Todos",
            StatusFilter::Active => "Ativos",
            StatusFilter::Resolved => "Resolvidos",
        }
    }

    fn matches(self, alert: &Alert) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => !alert.resolved,
            StatusFilter::Resolved => alert.resolved,
        }
    }
}

/// Raw `severity`, `type` and `status` query values as submitted by the
/// filter form.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AlertFilterParams {
    /// `all`, `low`, `medium` or `high`
    pub severity: Option<String>,
    /// `all` or a sensor category
    #[serde(rename = "type")]
    pub alert_type: Option<String>,
    /// `all`, `active` or `resolved`
    pub status: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error(transparent)]
    Enum(#[from] ParseEnumError),
    #[error("unknown status: {0:?}")]
    Status(String),
}

/// Page-local selection; `None` and `StatusFilter::All` select everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertFilter {
    pub severity: Option<Severity>,
    pub alert_type: Option<AlertType>,
    pub status: StatusFilter,
}

impl AlertFilter {
    pub fn from_params(params: &AlertFilterParams) -> Result<Self, FilterError> {
        let severity = match choice(params.severity.as_deref()) {
            Some(v) => Some(v.parse::<Severity>()?),
            None => None,
        };
        let alert_type = match choice(params.alert_type.as_deref()) {
            Some(v) => Some(v.parse::<AlertType>()?),
            None => None,
        };
        let status = match choice(params.status.as_deref()) {
            None => StatusFilter::All,
            Some("active") => StatusFilter::Active,
            Some("resolved") => StatusFilter::Resolved,
            Some(other) => return Err(FilterError::Status(other.to_owned())),
        };
        Ok(Self {
            severity,
            alert_type,
            status,
        })
    }

    pub fn matches(&self, alert: &Alert) -> bool {
        self.severity.is_none_or(|s| alert.severity == s)
            && self.alert_type.is_none_or(|t| alert.alert_type == t)
            && self.status.matches(alert)
    }

    /// Alerts satisfying every non-"all" criterion, in their original order.
    pub fn apply(&self, alerts: &[Alert]) -> Vec<Alert> {
        alerts.iter().filter(|a| self.matches(a)).cloned().collect()
    }
}

/// `"all"` and blank values mean "no restriction".
fn choice(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|v| !v.is_empty() && *v != "all")
}

/// Alerts for the dashboard banner: high severity and unresolved.
pub fn critical_alerts(alerts: &[Alert]) -> Vec<Alert> {
    alerts.iter().filter(|a| a.is_critical()).cloned().collect()
}

/// First `PREVIEW_CHARS` characters of the description followed by `...`.
pub fn preview(description: &str) -> String {
    let head: String = description.chars().take(PREVIEW_CHARS).collect();
    format!("{head}...")
}

/// `/alerts/{id}` with `id` percent-encoded as one path segment.
pub fn detail_path(id: &str) -> String {
    Url::parse("http://localhost/alerts/")
        .ok()
        .and_then(|mut url| {
            url.path_segments_mut().ok()?.pop_if_empty().push(id);
            Some(url.path().to_owned())
        })
        .unwrap_or_else(|| "/alerts".to_owned())
}

/// Form action of "Marcar como Resolvido".
pub fn resolve_path(id: &str) -> String {
    format!("{}/resolve", detail_path(id))
}

/// Form action of the banner "×" button.
pub fn dismiss_path(id: &str) -> String {
    format!("{}/dismiss", detail_path(id))
}

// ---------------------------------------------------------------------------
// Banner dismissal
// ---------------------------------------------------------------------------

/// Ids stored in the dismissal cookie, oldest first.
pub fn dismissed_ids(headers: &HeaderMap) -> Vec<String> {
    let Some(value) = settings::cookie_value(headers, DISMISSED_COOKIE) else {
        return Vec::new();
    };
    Url::parse(&format!("http://localhost/?{value}"))
        .map(|url| {
            url.query_pairs()
                .filter(|(key, _)| key == "id")
                .map(|(_, id)| id.into_owned())
                .collect()
        })
        .unwrap_or_default()
}

/// Appends `id` unless already present, keeping the newest `MAX_DISMISSED`.
pub fn with_dismissed(mut ids: Vec<String>, id: String) -> Vec<String> {
    if !ids.contains(&id) {
        ids.push(id);
    }
    let excess = ids.len().saturating_sub(MAX_DISMISSED);
    ids.drain(..excess);
    ids
}

/// `Set-Cookie` value holding `ids` form-encoded, e.g. `id=1&id=a+b%2Fc`.
pub fn dismissed_cookie(ids: &[String]) -> String {
    let encoded = Url::parse("http://localhost/")
        .map(|mut url| {
            url.query_pairs_mut()
                .extend_pairs(ids.iter().map(|id| ("id", id)));
            url.query().unwrap_or_default().to_owned()
        })
        .unwrap_or_default();
    format!("{DISMISSED_COOKIE}={encoded}; Path=/; SameSite=Lax")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
