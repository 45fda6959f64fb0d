use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::adapters::AdapterFactory;
use crate::error::{AppError, AppResult};
use crate::models::config::PoolConfig;
use crate::pool::persistence::{self, PoolMap, SaveScheduler};
use crate::pool::probe::AdapterCache;
use crate::pool::types::{ProviderEntry, ProviderFamily};
use crate::pool::PoolContext;

/// Supervises the provider credential pools: selection, health accounting,
/// recovery probing, and persistence of the pool document.
pub struct PoolManager {
    pools: Arc<PoolMap>,
    round_robin: Arc<DashMap<String, usize>>,
    adapter_cache: Arc<AdapterCache>,
    recovering: Arc<DashMap<String, ()>>,
    saver: SaveScheduler,
    config: PoolConfig,
    factory: Arc<dyn AdapterFactory>,
    cancel_token: CancellationToken,
    supervisor_handle: Arc<tokio::sync::Mutex<Option<tokio::task::JoinHandle<()>>>>,
}

impl PoolManager {
    pub fn new(config: PoolConfig, factory: Arc<dyn AdapterFactory>) -> Self {
        let pools: Arc<PoolMap> = Arc::new(DashMap::new());
        let saver = SaveScheduler::new(
            pools.clone(),
            config.provider_pools_file_path.clone(),
            config.save_debounce(),
        );

        Self {
            pools,
            round_robin: Arc::new(DashMap::new()),
            adapter_cache: Arc::new(DashMap::new()),
            recovering: Arc::new(DashMap::new()),
            saver,
            config,
            factory,
            cancel_token: CancellationToken::new(),
            supervisor_handle: Arc::new(tokio::sync::Mutex::new(None)),
        }
    }

    /// Loads the pool document into memory. Unrecognized families stay on
    /// disk untouched; entries without a uuid get one and are scheduled for
    /// save.
    pub fn load_pools(&self) -> AppResult<usize> {
        let document = persistence::read_pool_document(&self.config.provider_pools_file_path)
            .map_err(AppError::Pool)?;

        let mut loaded = 0usize;
        let mut families = 0usize;
        for (family_key, value) in document {
            if family_key.parse::<ProviderFamily>().is_err() {
                tracing::warn!(
                    "[W-POOL-UNKNOWN-FAMILY] preserving_unrecognized_family_on_disk: {}",
                    family_key
                );
                continue;
            }

            let mut entries: Vec<ProviderEntry> = match serde_json::from_value(value) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::error!(
                        "[E-POOL-LOAD-FAMILY] skipping_unparseable_family {}: {}",
                        family_key,
                        e
                    );
                    continue;
                }
            };

            let mut dirty = false;
            let mut seen = HashSet::new();
            for entry in &mut entries {
                if entry.uuid.trim().is_empty() {
                    entry.uuid = Uuid::new_v4().to_string();
                    dirty = true;
                    tracing::info!(
                        "[Pool] Assigned uuid {} to a {} entry missing one",
                        entry.uuid,
                        family_key
                    );
                }
                if !seen.insert(entry.uuid.clone()) {
                    tracing::warn!(
                        "[W-POOL-DUP-UUID] duplicate_uuid_in_family {}: {}",
                        family_key,
                        entry.uuid
                    );
                }
            }

            loaded += entries.len();
            families += 1;
            self.pools.insert(family_key.clone(), entries);
            if dirty {
                self.saver.schedule(&family_key);
            }
        }

        tracing::info!(
            "[Pool] Loaded {} provider entries across {} families from {}",
            loaded,
            families,
            self.config.provider_pools_file_path.display()
        );
        Ok(loaded)
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Total entries across all loaded families.
    pub fn len(&self) -> usize {
        self.pools.iter().map(|list| list.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn entries(&self, family: &str) -> Vec<ProviderEntry> {
        self.pools
            .get(family)
            .map(|list| list.value().clone())
            .unwrap_or_default()
    }

    /// Starts the periodic health sweep. Restarting replaces the old task.
    pub async fn start_supervisor(&self) {
        let mut slot = self.supervisor_handle.lock().await;
        if let Some(handle) = slot.take() {
            handle.abort();
        }
        *slot = Some(crate::pool::supervisor::start_supervisor(
            self.context(),
            self.cancel_token.clone(),
        ));
        tracing::info!(
            "[Supervisor] Health sweep scheduled every {}ms",
            self.config.health_check_interval_ms
        );
    }

    /// Cancels background work, waits up to `timeout` for the supervisor to
    /// stop, and flushes any pending families.
    pub async fn graceful_shutdown(&self, timeout: std::time::Duration) {
        self.cancel_token.cancel();

        let handle = self.supervisor_handle.lock().await.take();
        if let Some(handle) = handle {
            if tokio::time::timeout(timeout, handle).await.is_err() {
                tracing::warn!("[W-POOL-SHUTDOWN] supervisor_did_not_stop_within_timeout");
            }
        }

        self.saver.shutdown_flush();
        tracing::info!("[Pool] Shutdown flush complete");
    }

    /// Writes pending families now instead of waiting for the debounce.
    pub fn flush_pending(&self) {
        self.saver.flush();
    }

    pub(crate) fn context(&self) -> PoolContext {
        PoolContext {
            pools: self.pools.clone(),
            factory: self.factory.clone(),
            adapter_cache: self.adapter_cache.clone(),
            saver: self.saver.clone(),
            config: self.config.clone(),
            recovering: self.recovering.clone(),
        }
    }
}

#[path = "manager_selection.rs"]
mod manager_selection;

#[path = "manager_ops.rs"]
mod manager_ops;

#[cfg(test)]
#[path = "manager_tests.rs"]
mod manager_tests;
