use serde_json::Value;

use crate::models::usage::{UsageBucket, UsageSnapshot};

fn read_amount(value: &Value, key: &str) -> f64 {
    value.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

fn bucket_from(value: &Value, fallback_label: &str) -> UsageBucket {
    let label = value
        .get("resourceType")
        .or_else(|| value.get("type"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| Some(fallback_label.to_string()));

    UsageBucket {
        label,
        current_usage: read_amount(value, "currentUsage"),
        usage_limit: read_amount(value, "usageLimit"),
    }
}

// A breakdown item (or the top-level document) may carry an embedded
// freeTrial block and a bonuses list; only ACTIVE bonuses count.
fn collect_from(container: &Value, buckets: &mut Vec<UsageBucket>) {
    if let Some(free_trial) = container.get("freeTrial").filter(|v| v.is_object()) {
        buckets.push(bucket_from(free_trial, "freeTrial"));
    }
    if let Some(bonuses) = container.get("bonuses").and_then(Value::as_array) {
        for bonus in bonuses {
            let active = bonus
                .get("status")
                .and_then(Value::as_str)
                .map(|s| s.eq_ignore_ascii_case("ACTIVE"))
                .unwrap_or(false);
            if active {
                buckets.push(bucket_from(bonus, "bonus"));
            }
        }
    }
}

/// Normalizes a raw Kiro usage-limits document into a quota snapshot.
///
/// Sums `currentUsage`/`usageLimit` across every `usageBreakdown` item plus
/// embedded free-trial and active bonus buckets. An unparseable document
/// yields an empty snapshot (zero limit, no active quota).
pub fn format_kiro_usage(raw: &Value) -> UsageSnapshot {
    let mut buckets = Vec::new();

    if let Some(items) = raw.get("usageBreakdown").and_then(Value::as_array) {
        for item in items {
            buckets.push(bucket_from(item, "usage"));
            collect_from(item, &mut buckets);
        }
    }
    collect_from(raw, &mut buckets);

    UsageSnapshot::from_buckets(buckets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn exhausted_breakdown_has_zero_remaining() {
        let snapshot = format_kiro_usage(&json!({
            "usageBreakdown": [
                {"currentUsage": 100, "usageLimit": 100}
            ]
        }));

        assert_eq!(snapshot.total_used, 100.0);
        assert_eq!(snapshot.total_limit, 100.0);
        assert_eq!(snapshot.remaining, 0.0);
        assert!(!snapshot.has_active_quota);
    }

    #[test]
    fn free_trial_and_active_bonuses_contribute() {
        let snapshot = format_kiro_usage(&json!({
            "usageBreakdown": [
                {
                    "resourceType": "CREDIT",
                    "currentUsage": 50,
                    "usageLimit": 50,
                    "freeTrial": {"currentUsage": 5, "usageLimit": 20},
                    "bonuses": [
                        {"status": "ACTIVE", "currentUsage": 0, "usageLimit": 10},
                        {"status": "EXPIRED", "currentUsage": 0, "usageLimit": 500}
                    ]
                }
            ]
        }));

        assert_eq!(snapshot.total_limit, 80.0);
        assert_eq!(snapshot.total_used, 55.0);
        assert_eq!(snapshot.remaining, 25.0);
        assert!(snapshot.has_active_quota, "free trial still has headroom");
    }

    #[test]
    fn top_level_free_trial_is_recognized() {
        let snapshot = format_kiro_usage(&json!({
            "freeTrial": {"currentUsage": 1, "usageLimit": 4}
        }));

        assert_eq!(snapshot.total_limit, 4.0);
        assert!(snapshot.has_active_quota);
    }

    #[test]
    fn garbage_document_yields_empty_snapshot() {
        let snapshot = format_kiro_usage(&json!("not an object"));
        assert_eq!(snapshot.total_limit, 0.0);
        assert_eq!(snapshot.usage_percent, 0);
        assert!(!snapshot.has_active_quota);
    }
}
