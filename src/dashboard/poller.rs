use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tokio::{
    sync::watch,
    time::{self, Instant, Interval, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::{fetch_snapshot, DashboardState, DashboardStore, LOAD_ERROR};
use crate::telemetry::TelemetrySource;

/// Background task refreshing the dashboard snapshot.
///
/// Polls run inline in the tick loop, so a slow fetch delays the next tick
/// instead of overlapping with it.
pub struct DashboardPoller {
    source: Arc<dyn TelemetrySource>,
    store: DashboardStore,
    history_limit: usize,
    interval_rx: watch::Receiver<Duration>,
    cancel: CancellationToken,
}

impl DashboardPoller {
    pub fn new(
        source: Arc<dyn TelemetrySource>,
        store: DashboardStore,
        history_limit: usize,
        interval_rx: watch::Receiver<Duration>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            source,
            store,
            history_limit,
            interval_rx,
            cancel,
        }
    }

    /// Runs until the cancellation token fires.
    /// Spawn this via `tokio::spawn`.
    pub async fn run(mut self) {
        let mut period = *self.interval_rx.borrow_and_update();
        let mut ticker = new_ticker(Instant::now(), period);
        let mut watching = true;
        info!(
            source = self.source.name(),
            interval_secs = period.as_secs(),
            "Dashboard polling loop started"
        );

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = ticker.tick() => self.poll_once().await,
                changed = self.interval_rx.changed(), if watching => {
                    if changed.is_err() {
                        // Sender gone; keep the current period.
                        watching = false;
                        continue;
                    }
                    let next = *self.interval_rx.borrow_and_update();
                    if next != period && !next.is_zero() {
                        info!(
                            from_secs = period.as_secs(),
                            to_secs = next.as_secs(),
                            "Dashboard refresh interval changed"
                        );
                        period = next;
                        ticker = new_ticker(Instant::now() + period, period);
                    }
                }
            }
        }

        info!("Dashboard polling loop stopped");
    }

    /// Fetches one snapshot and publishes it, or publishes the failure.
    ///
    /// Nothing is published when the token fires while the fetch is in flight.
    pub async fn poll_once(&self) {
        let outcome = tokio::select! {
            _ = self.cancel.cancelled() => return,
            outcome = fetch_snapshot(self.source.as_ref(), self.history_limit) => outcome,
        };

        let state = match outcome {
            Ok(snapshot) => DashboardState::Ready(snapshot),
            Err(e) => {
                error!(source = self.source.name(), error = %e, "Failed to fetch dashboard data");
                DashboardState::Failed {
                    message: e.user_message(LOAD_ERROR),
                    at: Utc::now(),
                }
            }
        };
        self.store.publish(state).await;
    }
}

fn new_ticker(start: Instant, period: Duration) -> Interval {
    let mut ticker = time::interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}
