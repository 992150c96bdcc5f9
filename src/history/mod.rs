pub mod export;

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use crate::{error::ApiError, telemetry::HistoryQuery};

/// Field locations offered by the history filter.
pub const LOCATIONS: [&str; 3] = ["Campo A", "Campo B", "Campo C"];

pub const LOAD_ERROR: &str = "Erro ao carregar histórico";
pub const FILTER_ERROR: &str = "Erro ao filtrar dados";
pub const FILTER_CONNECTION_ERROR: &str = "Erro ao aplicar filtros.";
pub const EXPORT_ERROR: &str = "Erro ao exportar dados.";

/// Raw form values of the history filter (`<input type="date">` sends
/// `YYYY-MM-DD` or an empty string).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryFilterParams {
    pub location: Option<String>,
    #[serde(rename = "dateFrom")]
    pub date_from: Option<String>,
    #[serde(rename = "dateTo")]
    pub date_to: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HistoryFilterError {
    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    Date(String),
    #[error("dateFrom {from} is after dateTo {to}")]
    Range { from: NaiveDate, to: NaiveDate },
}

/// Server-side filter selection of the History view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    pub location: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl HistoryFilter {
    pub fn from_params(params: &HistoryFilterParams) -> Result<Self, HistoryFilterError> {
        let location = params
            .location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty() && *l != "all")
            .map(str::to_owned);
        let date_from = parse_date(params.date_from.as_deref())?;
        let date_to = parse_date(params.date_to.as_deref())?;
        if let (Some(from), Some(to)) = (date_from, date_to) {
            if from > to {
                return Err(HistoryFilterError::Range { from, to });
            }
        }
        Ok(Self {
            location,
            date_from,
            date_to,
        })
    }

    /// `dateFrom` covers the start of its day and `dateTo` the end of its day,
    /// both in UTC.
    pub fn to_query(&self) -> HistoryQuery {
        HistoryQuery {
            location: self.location.clone(),
            date_from: self
                .date_from
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc()),
            date_to: self
                .date_to
                .and_then(|d| d.and_hms_opt(23, 59, 59))
                .map(|dt| dt.and_utc()),
        }
    }
}

impl HistoryFilterParams {
    /// The filter form always submits `location`; its presence means the
    /// user pressed "Aplicar Filtros".
    pub fn is_submitted(&self) -> bool {
        self.location.is_some() || self.date_from.is_some() || self.date_to.is_some()
    }
}

/// Error panel text for a failed history fetch.
///
/// A submitted filter that cannot reach the API reports its own message
/// instead of the generic connection error.
pub fn error_message(err: &ApiError, filtered: bool) -> String {
    match (filtered, err.is_transport()) {
        (true, true) => FILTER_CONNECTION_ERROR.to_owned(),
        (true, false) => err.user_message(FILTER_ERROR),
        (false, _) => err.user_message(LOAD_ERROR),
    }
}

fn parse_date(raw: Option<&str>) -> Result<Option<NaiveDate>, HistoryFilterError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| HistoryFilterError::Date(s.to_owned())),
    }
}
