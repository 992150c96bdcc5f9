use std::sync::Arc;

use tokio::sync::RwLock;

use super::DashboardState;

/// Latest outcome of the dashboard polling loop.
///
/// Wrapped in `Arc` so it can be cheaply cloned into the poller and the web
/// state. Each poll tick replaces the whole state in a single write, so a
/// reader never sees a reading from one tick next to alerts from another.
#[derive(Clone)]
pub struct DashboardStore {
    inner: Arc<RwLock<DashboardState>>,
}

impl Default for DashboardStore {
    fn default() -> Self {
        Self {
            inner: Arc::new(RwLock::new(DashboardState::Loading)),
        }
    }
}

impl DashboardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current state.
    pub async fn publish(&self, state: DashboardState) {
        *self.inner.write().await = state;
    }

    /// Return a snapshot of the current state.
    pub async fn current(&self) -> DashboardState {
        self.inner.read().await.clone()
    }
}
