use dashmap::DashMap;
use std::sync::Arc;

use crate::adapters::kiro_usage::format_kiro_usage;
use crate::adapters::{AdapterFactory, AdapterOptions, ServiceAdapter};
use crate::models::config::PoolConfig;
use crate::models::usage::format_quota_amount;
use crate::pool::types::{ProbeOutcome, ProviderEntry, ProviderFamily};

/// Cached adapter instances, keyed `family:uuid`. Cleared before each probe
/// so the probe exercises freshly built credentials.
pub(crate) type AdapterCache = DashMap<String, Arc<dyn ServiceAdapter>>;

pub(crate) fn adapter_cache_key(family: ProviderFamily, uuid: &str) -> String {
    format!("{}:{}", family, uuid)
}

/// Probes one entry. Returns `None` when no check applies: the entry has
/// health checking off and the probe was not forced.
pub(crate) async fn probe_entry(
    factory: &Arc<dyn AdapterFactory>,
    cache: &AdapterCache,
    config: &PoolConfig,
    family: ProviderFamily,
    entry: &ProviderEntry,
    force_check: bool,
) -> Option<ProbeOutcome> {
    if !entry.check_health && !force_check {
        return None;
    }

    let model_name = entry
        .check_model_name
        .clone()
        .unwrap_or_else(|| family.default_check_model().to_string());

    cache.remove(&adapter_cache_key(family, &entry.uuid));

    let options = AdapterOptions::for_family(family, &config.use_system_proxy);
    let adapter = match factory.create(family, entry, options).await {
        Ok(adapter) => adapter,
        Err(e) => {
            tracing::warn!(
                "[Probe] Adapter unavailable for {} entry {}: {}",
                family,
                entry.uuid,
                e
            );
            return Some(ProbeOutcome {
                success: false,
                model_name,
                error_message: Some(e),
                usage_info: None,
            });
        }
    };
    cache.insert(adapter_cache_key(family, &entry.uuid), adapter.clone());

    if family.is_usage_based() && adapter.supports_usage_query() {
        if let Some(outcome) = probe_usage_quota(adapter.as_ref(), family, entry, &model_name).await
        {
            return Some(outcome);
        }
        tracing::debug!(
            "[Probe] Usage query gave no verdict for {} entry {}, falling back to chat probe",
            family,
            entry.uuid
        );
    }

    Some(probe_chat_send(adapter.as_ref(), family, &model_name).await)
}

/// Mode A: judge health from the remaining quota. `None` means the quota
/// call itself failed and the caller should fall back to a chat probe.
async fn probe_usage_quota(
    adapter: &dyn ServiceAdapter,
    family: ProviderFamily,
    entry: &ProviderEntry,
    model_name: &str,
) -> Option<ProbeOutcome> {
    // Stale tokens make quota queries lie; refresh first when possible.
    if adapter.supports_force_refresh() {
        if let Err(e) = adapter.force_refresh_token().await {
            tracing::warn!(
                "[Probe] Forced token refresh failed for {} entry {}: {}",
                family,
                entry.uuid,
                e
            );
        }
    } else if adapter.supports_refresh() {
        if let Err(e) = adapter.refresh_token().await {
            tracing::warn!(
                "[Probe] Token refresh failed for {} entry {}: {}",
                family,
                entry.uuid,
                e
            );
        }
    }

    let raw = match adapter.get_usage_limits().await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(
                "[Probe] Usage query failed for {} entry {}: {}",
                family,
                entry.uuid,
                e
            );
            return None;
        }
    };

    let snapshot = format_kiro_usage(&raw);
    let healthy = snapshot.has_active_quota && snapshot.remaining > 0.0;
    let error_message = if healthy {
        None
    } else if snapshot.remaining <= 0.0 {
        Some(format!(
            "quota exhausted ({}/{})",
            format_quota_amount(snapshot.total_used),
            format_quota_amount(snapshot.total_limit)
        ))
    } else {
        Some("no active quota".to_string())
    };

    tracing::debug!(
        "[Probe] {} entry {} quota: {}/{} used ({}%)",
        family,
        entry.uuid,
        snapshot.total_used,
        snapshot.total_limit,
        snapshot.usage_percent
    );

    Some(ProbeOutcome {
        success: healthy,
        model_name: model_name.to_string(),
        error_message,
        usage_info: Some(snapshot),
    })
}

/// Mode B: send a minimal chat request, trying each family payload shape in
/// order until one is accepted.
async fn probe_chat_send(
    adapter: &dyn ServiceAdapter,
    family: ProviderFamily,
    model_name: &str,
) -> ProbeOutcome {
    let mut last_error: Option<String> = None;

    for (attempt, payload) in family.probe_payloads(model_name).iter().enumerate() {
        match adapter.generate_content(model_name, payload).await {
            Ok(_) => {
                if attempt > 0 {
                    tracing::debug!(
                        "[Probe] {} probe succeeded with fallback payload #{}",
                        family,
                        attempt + 1
                    );
                }
                return ProbeOutcome {
                    success: true,
                    model_name: model_name.to_string(),
                    error_message: None,
                    usage_info: None,
                };
            }
            Err(e) => {
                tracing::debug!(
                    "[Probe] {} probe payload #{} failed: {}",
                    family,
                    attempt + 1,
                    e
                );
                last_error = Some(e);
            }
        }
    }

    ProbeOutcome {
        success: false,
        model_name: model_name.to_string(),
        error_message: last_error,
        usage_info: None,
    }
}
