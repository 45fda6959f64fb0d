pub mod adapters;
pub mod constants;
pub mod error;
pub mod logger;
pub mod models;
pub mod pool;
#[cfg(test)]
mod test_utils;

pub use adapters::kiro_usage::format_kiro_usage;
pub use adapters::{AdapterFactory, AdapterOptions, ServiceAdapter};
pub use error::{AppError, AppResult};
pub use models::config::{LogLevel, PoolConfig, SystemProxyConfig};
pub use models::kiro::KiroCredentials;
pub use models::usage::{UsageBucket, UsageSnapshot};
pub use pool::manager::PoolManager;
pub use pool::supervisor::SweepSummary;
pub use pool::types::{PoolStats, ProbeOutcome, ProviderEntry, ProviderFamily, SelectOptions};
