pub mod broadcast;
pub mod leaderboard;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{config::AppConfig, dao::stat_store::StatStore, error::ServiceError};

/// Shared handle to the application state, cheap to clone.
pub type SharedState = Arc<AppState>;

/// Central application state storing the storage handle and runtime config.
pub struct AppState {
    config: AppConfig,
    stat_store: RwLock<Option<Arc<dyn StatStore>>>,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            config,
            stat_store: RwLock::new(None),
            degraded: degraded_tx,
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the current stat store, if one is installed.
    pub async fn stat_store(&self) -> Option<Arc<dyn StatStore>> {
        let guard = self.stat_store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the stat store or fail with a degraded-mode error.
    pub async fn require_stat_store(&self) -> Result<Arc<dyn StatStore>, ServiceError> {
        self.stat_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new stat store implementation and leave degraded mode.
    pub async fn set_stat_store(&self, store: Arc<dyn StatStore>) {
        {
            let mut guard = self.stat_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Remove the current stat store and enter degraded mode.
    pub async fn clear_stat_store(&self) {
        {
            let mut guard = self.stat_store.write().await;
            guard.take();
        }
        self.update_degraded(true).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub async fn update_degraded(&self, value: bool) {
        if self.is_degraded().await == value {
            return;
        }

        self.degraded.send_replace(value);
    }
}
