use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One quota bucket contributing to an account's aggregate limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageBucket {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub current_usage: f64,
    #[serde(default)]
    pub usage_limit: f64,
}

impl UsageBucket {
    pub fn has_active_quota(&self) -> bool {
        self.usage_limit > 0.0 && self.current_usage < self.usage_limit
    }
}

/// Normalized quota snapshot cached on an entry after a quota-query probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSnapshot {
    pub total_used: f64,
    pub total_limit: f64,
    pub remaining: f64,
    pub usage_percent: u32,
    pub has_active_quota: bool,
    #[serde(default)]
    pub usage_breakdown: Vec<UsageBucket>,
    pub last_updated: DateTime<Utc>,
}

impl UsageSnapshot {
    pub fn from_buckets(buckets: Vec<UsageBucket>) -> Self {
        let total_used: f64 = buckets.iter().map(|b| b.current_usage).sum();
        let total_limit: f64 = buckets.iter().map(|b| b.usage_limit).sum();
        let has_active_quota = buckets.iter().any(UsageBucket::has_active_quota);
        let usage_percent = if total_limit > 0.0 {
            (100.0 * total_used / total_limit).round() as u32
        } else {
            0
        };

        Self {
            total_used,
            total_limit,
            remaining: total_limit - total_used,
            usage_percent,
            has_active_quota,
            usage_breakdown: buckets,
            last_updated: Utc::now(),
        }
    }
}

/// Renders quota amounts without a trailing `.0` for whole numbers.
pub(crate) fn format_quota_amount(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
