use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::dashboard::{DashboardSnapshot, DashboardState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DashboardStatus {
    Loading,
    Ready,
    Failed,
}

/// Latest dashboard poll outcome.
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardDto {
    pub status: DashboardStatus,
    /// Present when `status` is `ready`.
    pub snapshot: Option<DashboardSnapshot>,
    /// Error panel text when `status` is `failed`.
    pub message: Option<String>,
    pub failed_at: Option<DateTime<Utc>>,
}

impl From<DashboardState> for DashboardDto {
    fn from(state: DashboardState) -> Self {
        match state {
            DashboardState::Loading => Self {
                status: DashboardStatus::Loading,
                snapshot: None,
                message: None,
                failed_at: None,
            },
            DashboardState::Ready(snapshot) => Self {
                status: DashboardStatus::Ready,
                snapshot: Some(snapshot),
                message: None,
                failed_at: None,
            },
            DashboardState::Failed { message, at } => Self {
                status: DashboardStatus::Failed,
                snapshot: None,
                message: Some(message),
                failed_at: Some(at),
            },
        }
    }
}
