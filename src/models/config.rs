use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::constants;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

/// Per-family toggles for routing upstream calls through the system proxy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemProxyConfig {
    #[serde(default)]
    pub gemini: bool,
    #[serde(default)]
    pub openai: bool,
    #[serde(default)]
    pub claude: bool,
    #[serde(default)]
    pub qwen: bool,
    #[serde(default)]
    pub kiro: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    #[serde(default = "default_max_error_count")]
    pub max_error_count: u32,
    #[serde(default = "default_health_check_interval_ms")]
    pub health_check_interval_ms: u64,
    #[serde(default = "default_save_debounce_ms")]
    pub save_debounce_time_ms: u64,
    #[serde(default)]
    pub log_level: LogLevel,
    #[serde(default = "default_pools_file_path")]
    pub provider_pools_file_path: PathBuf,
    #[serde(default)]
    pub use_system_proxy: SystemProxyConfig,
}

fn default_max_error_count() -> u32 {
    constants::DEFAULT_MAX_ERROR_COUNT
}

fn default_health_check_interval_ms() -> u64 {
    constants::DEFAULT_HEALTH_CHECK_INTERVAL_MS
}

fn default_save_debounce_ms() -> u64 {
    constants::DEFAULT_SAVE_DEBOUNCE_MS
}

fn default_pools_file_path() -> PathBuf {
    PathBuf::from(constants::DEFAULT_POOLS_FILE)
}

impl PoolConfig {
    pub fn new() -> Self {
        Self {
            max_error_count: default_max_error_count(),
            health_check_interval_ms: default_health_check_interval_ms(),
            save_debounce_time_ms: default_save_debounce_ms(),
            log_level: LogLevel::default(),
            provider_pools_file_path: default_pools_file_path(),
            use_system_proxy: SystemProxyConfig::default(),
        }
    }

    pub fn health_check_interval(&self) -> Duration {
        Duration::from_millis(self.health_check_interval_ms)
    }

    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_time_ms)
    }

    /// Loads the config file, seeding it with defaults when absent, then
    /// applies environment overrides.
    pub fn load(path: &std::path::Path) -> AppResult<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str::<PoolConfig>(&content)
                .map_err(|e| AppError::Config(format!("failed_to_parse_config_file: {}", e)))?
        } else {
            let config = PoolConfig::new();
            if let Ok(content) = serde_json::to_string_pretty(&config) {
                let _ = std::fs::write(path, content);
            }
            config
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("PROVIDER_POOLS_FILE_PATH") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                tracing::info!("Using provider pools file from environment: {}", trimmed);
                self.provider_pools_file_path = PathBuf::from(trimmed);
            }
        }

        let toggles: [(&str, &mut bool); 5] = [
            ("USE_SYSTEM_PROXY_GEMINI", &mut self.use_system_proxy.gemini),
            ("USE_SYSTEM_PROXY_OPENAI", &mut self.use_system_proxy.openai),
            ("USE_SYSTEM_PROXY_CLAUDE", &mut self.use_system_proxy.claude),
            ("USE_SYSTEM_PROXY_QWEN", &mut self.use_system_proxy.qwen),
            ("USE_SYSTEM_PROXY_KIRO", &mut self.use_system_proxy.kiro),
        ];
        for (key, slot) in toggles {
            if let Ok(value) = std::env::var(key) {
                match parse_env_bool(&value) {
                    Some(parsed) => *slot = parsed,
                    None => tracing::warn!(
                        "[W-ENV-PROXY-INVALID] ignoring_invalid_value_for_{}: {}",
                        key,
                        value
                    ),
                }
            }
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn parse_env_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
