pub mod manager;
pub(crate) mod ops;
pub(crate) mod persistence;
pub(crate) mod probe;
pub(crate) mod recovery;
pub mod supervisor;
pub mod types;

use dashmap::DashMap;
use std::sync::Arc;

use crate::adapters::AdapterFactory;
use crate::models::config::PoolConfig;
use persistence::{PoolMap, SaveScheduler};
use probe::AdapterCache;

/// Everything a background task (recovery probe, supervisor sweep) needs,
/// detached from the manager so tasks never hold it alive.
#[derive(Clone)]
pub(crate) struct PoolContext {
    pub(crate) pools: Arc<PoolMap>,
    pub(crate) factory: Arc<dyn AdapterFactory>,
    pub(crate) adapter_cache: Arc<AdapterCache>,
    pub(crate) saver: SaveScheduler,
    pub(crate) config: PoolConfig,
    pub(crate) recovering: Arc<DashMap<String, ()>>,
}
