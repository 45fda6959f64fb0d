use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::constants::PROBE_PROMPT;
use crate::models::config::SystemProxyConfig;
use crate::models::usage::UsageSnapshot;

/// A backend kind with a fixed request shape and health-probe defaults.
/// The string forms are the keys used by the on-disk pool document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderFamily {
    GeminiCliOauth,
    GeminiAntigravity,
    OpenAiCustom,
    ClaudeCustom,
    ClaudeKiroOauth,
    OpenAiQwenOauth,
    OpenAiResponsesCustom,
}

impl ProviderFamily {
    pub const ALL: [ProviderFamily; 7] = [
        ProviderFamily::GeminiCliOauth,
        ProviderFamily::GeminiAntigravity,
        ProviderFamily::OpenAiCustom,
        ProviderFamily::ClaudeCustom,
        ProviderFamily::ClaudeKiroOauth,
        ProviderFamily::OpenAiQwenOauth,
        ProviderFamily::OpenAiResponsesCustom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderFamily::GeminiCliOauth => "gemini-cli-oauth",
            ProviderFamily::GeminiAntigravity => "gemini-antigravity",
            ProviderFamily::OpenAiCustom => "openai-custom",
            ProviderFamily::ClaudeCustom => "claude-custom",
            ProviderFamily::ClaudeKiroOauth => "claude-kiro-oauth",
            ProviderFamily::OpenAiQwenOauth => "openai-qwen-oauth",
            ProviderFamily::OpenAiResponsesCustom => "openaiResponses-custom",
        }
    }

    /// Model used by chat-send probes when the entry has no override.
    pub fn default_check_model(self) -> &'static str {
        match self {
            ProviderFamily::GeminiCliOauth | ProviderFamily::GeminiAntigravity => {
                "gemini-2.5-flash"
            }
            ProviderFamily::OpenAiCustom => "gpt-3.5-turbo",
            ProviderFamily::ClaudeCustom => "claude-3-7-sonnet-20250219",
            ProviderFamily::ClaudeKiroOauth => "claude-haiku-4-5",
            ProviderFamily::OpenAiQwenOauth => "qwen3-coder-flash",
            ProviderFamily::OpenAiResponsesCustom => "gpt-4o-mini",
        }
    }

    /// Families whose health is judged by a quota query when the adapter
    /// supports one.
    pub fn is_usage_based(self) -> bool {
        matches!(self, ProviderFamily::ClaudeKiroOauth)
    }

    pub fn system_proxy_enabled(self, proxy: &SystemProxyConfig) -> bool {
        match self {
            ProviderFamily::GeminiCliOauth | ProviderFamily::GeminiAntigravity => proxy.gemini,
            ProviderFamily::OpenAiCustom | ProviderFamily::OpenAiResponsesCustom => proxy.openai,
            ProviderFamily::ClaudeCustom => proxy.claude,
            ProviderFamily::OpenAiQwenOauth => proxy.qwen,
            ProviderFamily::ClaudeKiroOauth => proxy.kiro,
        }
    }

    /// Probe payloads in preference order; the first accepted shape wins.
    pub fn probe_payloads(self, model_name: &str) -> Vec<Value> {
        let gemini_contents = json!({
            "contents": [{"role": "user", "parts": [{"text": PROBE_PROMPT}]}]
        });

        match self {
            ProviderFamily::GeminiCliOauth | ProviderFamily::GeminiAntigravity => {
                vec![gemini_contents]
            }
            ProviderFamily::ClaudeKiroOauth => vec![
                json!({
                    "messages": [{"role": "user", "content": PROBE_PROMPT}],
                    "model": model_name,
                    "max_tokens": 1
                }),
                json!({
                    "contents": [{"role": "user", "parts": [{"text": PROBE_PROMPT}]}],
                    "max_tokens": 1
                }),
            ],
            ProviderFamily::OpenAiResponsesCustom => vec![json!({
                "input": [{"role": "user", "content": PROBE_PROMPT}],
                "model": model_name
            })],
            _ => vec![json!({
                "messages": [{"role": "user", "content": PROBE_PROMPT}],
                "model": model_name
            })],
        }
    }
}

impl std::fmt::Display for ProviderFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProviderFamily::ALL
            .into_iter()
            .find(|family| family.as_str() == s)
            .ok_or_else(|| format!("unknown provider family: {}", s))
    }
}

fn default_true() -> bool {
    true
}

/// One credential/account within a family, as stored in the pool document.
/// Timestamps serialize as ISO-8601 strings; keys the manager does not know
/// about (operator annotations like `_comment`) ride along in `extras`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderEntry {
    #[serde(default)]
    pub uuid: String,
    /// Family-specific opaque config (paths, tokens, endpoints).
    #[serde(default)]
    pub credentials: Value,
    #[serde(default)]
    pub check_model_name: Option<String>,
    #[serde(default)]
    pub check_health: bool,
    #[serde(default)]
    pub not_supported_models: Vec<String>,
    #[serde(default = "default_true")]
    pub is_healthy: bool,
    #[serde(default)]
    pub is_disabled: bool,
    #[serde(default)]
    pub error_count: u32,
    #[serde(default)]
    pub usage_count: u64,
    #[serde(default)]
    pub last_used: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_error_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_error_message: Option<String>,
    #[serde(default)]
    pub last_health_check_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_health_check_model: Option<String>,
    #[serde(default)]
    pub usage_info: Option<UsageSnapshot>,
    #[serde(flatten)]
    pub extras: serde_json::Map<String, Value>,
}

impl ProviderEntry {
    pub fn new(uuid: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            credentials: Value::Null,
            check_model_name: None,
            check_health: false,
            not_supported_models: Vec::new(),
            is_healthy: true,
            is_disabled: false,
            error_count: 0,
            usage_count: 0,
            last_used: None,
            last_error_time: None,
            last_error_message: None,
            last_health_check_time: None,
            last_health_check_model: None,
            usage_info: None,
            extras: serde_json::Map::new(),
        }
    }

    pub fn supports_model(&self, model: &str) -> bool {
        !self.not_supported_models.iter().any(|m| m == model)
    }

    pub fn record_usage(&mut self) {
        self.usage_count += 1;
        self.last_used = Some(Utc::now());
    }

    /// Registers a failure; flips to unhealthy at `max_error_count`.
    pub fn record_failure(&mut self, message: Option<String>, max_error_count: u32) {
        self.error_count += 1;
        self.last_error_time = Some(Utc::now());
        self.last_error_message = message;
        if self.error_count >= max_error_count {
            self.is_healthy = false;
        }
    }

    pub fn mark_healthy(&mut self, reset_usage_count: bool, check_model: Option<String>) {
        self.is_healthy = true;
        self.error_count = 0;
        self.last_error_time = None;
        self.last_error_message = None;
        self.last_health_check_time = Some(Utc::now());
        if check_model.is_some() {
            self.last_health_check_model = check_model;
        }
        if reset_usage_count {
            self.usage_count = 0;
        } else {
            // A successful probe counts as a use of the entry.
            self.record_usage();
        }
    }

    pub fn reset_counters(&mut self) {
        self.usage_count = 0;
        self.error_count = 0;
        self.is_healthy = true;
        self.last_error_time = None;
        self.last_error_message = None;
    }

    /// Whether this entry is unhealthy and its cool-down has elapsed.
    pub fn cooldown_elapsed(&self, now: DateTime<Utc>, interval: chrono::Duration) -> bool {
        if self.is_healthy {
            return false;
        }
        match self.last_error_time {
            Some(last_error) => now - last_error >= interval,
            None => false,
        }
    }
}

/// Result of one health probe.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub success: bool,
    pub model_name: String,
    pub error_message: Option<String>,
    pub usage_info: Option<UsageSnapshot>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SelectOptions {
    pub skip_usage_count: bool,
}

/// Per-family aggregate counters for the admin surface.
#[derive(Debug, Clone, Serialize)]
pub struct PoolStats {
    pub total_count: usize,
    pub healthy_count: usize,
    pub disabled_count: usize,
    pub total_usage: u64,
    pub total_errors: u64,
}

impl PoolStats {
    pub fn from_entries(entries: &[ProviderEntry]) -> Self {
        Self {
            total_count: entries.len(),
            healthy_count: entries.iter().filter(|e| e.is_healthy).count(),
            disabled_count: entries.iter().filter(|e| e.is_disabled).count(),
            total_usage: entries.iter().map(|e| e.usage_count).sum(),
            total_errors: entries.iter().map(|e| e.error_count as u64).sum(),
        }
    }
}
