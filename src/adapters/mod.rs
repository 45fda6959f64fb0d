pub mod kiro_usage;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::models::SystemProxyConfig;
use crate::pool::types::{ProviderEntry, ProviderFamily};

/// Process-wide settings merged into adapter construction.
#[derive(Debug, Clone, Default)]
pub struct AdapterOptions {
    pub use_system_proxy: bool,
}

impl AdapterOptions {
    pub fn for_family(family: ProviderFamily, proxy: &SystemProxyConfig) -> Self {
        Self {
            use_system_proxy: family.system_proxy_enabled(proxy),
        }
    }
}

/// Capability contract between the pool manager and provider-specific logic.
///
/// `generate_content` is the only required capability; the usage-query and
/// refresh methods are opt-in and gated by their `supports_*` flags so the
/// probe engine can tell "unsupported" apart from "failed".
#[async_trait]
pub trait ServiceAdapter: Send + Sync {
    async fn generate_content(&self, model_name: &str, payload: &Value) -> Result<Value, String>;

    fn supports_usage_query(&self) -> bool {
        false
    }

    async fn get_usage_limits(&self) -> Result<Value, String> {
        Err("usage query not supported".to_string())
    }

    fn supports_refresh(&self) -> bool {
        false
    }

    fn supports_force_refresh(&self) -> bool {
        false
    }

    async fn refresh_token(&self) -> Result<(), String> {
        Err("token refresh not supported".to_string())
    }

    async fn force_refresh_token(&self) -> Result<(), String> {
        Err("force token refresh not supported".to_string())
    }
}

/// Builds adapters for pool entries. Implemented by the embedding proxy.
#[async_trait]
pub trait AdapterFactory: Send + Sync {
    async fn create(
        &self,
        family: ProviderFamily,
        entry: &ProviderEntry,
        options: AdapterOptions,
    ) -> Result<Arc<dyn ServiceAdapter>, String>;
}
