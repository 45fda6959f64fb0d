use chrono::Utc;

use crate::pool::persistence::{PoolMap, SaveScheduler};
use crate::pool::types::{ProbeOutcome, ProviderEntry};

pub(crate) fn with_entry_mut<F, R>(pools: &PoolMap, family: &str, uuid: &str, f: F) -> Option<R>
where
    F: FnOnce(&mut ProviderEntry) -> R,
{
    let mut list = pools.get_mut(family)?;
    let entry = list.value_mut().iter_mut().find(|e| e.uuid == uuid)?;
    Some(f(entry))
}

pub(crate) fn get_entry(pools: &PoolMap, family: &str, uuid: &str) -> Option<ProviderEntry> {
    pools
        .get(family)?
        .value()
        .iter()
        .find(|e| e.uuid == uuid)
        .cloned()
}

pub(crate) fn mark_unhealthy(
    pools: &PoolMap,
    saver: &SaveScheduler,
    max_error_count: u32,
    family: &str,
    uuid: &str,
    error_message: Option<&str>,
) {
    let outcome = with_entry_mut(pools, family, uuid, |entry| {
        entry.record_failure(error_message.map(str::to_string), max_error_count);
        (entry.is_healthy, entry.error_count)
    });

    match outcome {
        Some((true, error_count)) => {
            tracing::debug!(
                "[Pool] {} entry {} error {}/{}: {}",
                family,
                uuid,
                error_count,
                max_error_count,
                error_message.unwrap_or("unknown error")
            );
        }
        Some((false, error_count)) => {
            tracing::warn!(
                "[Pool] {} entry {} marked unhealthy after {} error(s): {}",
                family,
                uuid,
                error_count,
                error_message.unwrap_or("unknown error")
            );
        }
        None => {
            tracing::warn!(
                "[W-POOL-UNKNOWN-ENTRY] mark_unhealthy_ignored: family={} uuid={}",
                family,
                uuid
            );
            return;
        }
    }
    saver.schedule(family);
}

pub(crate) fn mark_healthy(
    pools: &PoolMap,
    saver: &SaveScheduler,
    family: &str,
    uuid: &str,
    reset_usage_count: bool,
    health_check_model: Option<String>,
) {
    let was_unhealthy = with_entry_mut(pools, family, uuid, |entry| {
        let was_unhealthy = !entry.is_healthy;
        entry.mark_healthy(reset_usage_count, health_check_model.clone());
        was_unhealthy
    });

    match was_unhealthy {
        Some(true) => tracing::info!("[Pool] {} entry {} is healthy again", family, uuid),
        Some(false) => tracing::debug!("[Pool] {} entry {} confirmed healthy", family, uuid),
        None => {
            tracing::warn!(
                "[W-POOL-UNKNOWN-ENTRY] mark_healthy_ignored: family={} uuid={}",
                family,
                uuid
            );
            return;
        }
    }
    saver.schedule(family);
}

/// Records a failed or quota-bearing probe attempt on an already-unhealthy
/// entry without touching `error_count`.
pub(crate) fn record_probe_attempt(
    pools: &PoolMap,
    saver: &SaveScheduler,
    family: &str,
    uuid: &str,
    outcome: &ProbeOutcome,
) {
    let found = with_entry_mut(pools, family, uuid, |entry| {
        if outcome.error_message.is_some() {
            entry.last_error_message = outcome.error_message.clone();
        }
        entry.last_health_check_time = Some(Utc::now());
        entry.last_health_check_model = Some(outcome.model_name.clone());
        if let Some(snapshot) = outcome.usage_info.clone() {
            entry.usage_info = Some(snapshot);
        }
    });

    if found.is_none() {
        tracing::warn!(
            "[W-POOL-UNKNOWN-ENTRY] record_probe_attempt_ignored: family={} uuid={}",
            family,
            uuid
        );
        return;
    }
    saver.schedule(family);
}

pub(crate) fn store_usage_info(
    pools: &PoolMap,
    family: &str,
    uuid: &str,
    snapshot: crate::models::usage::UsageSnapshot,
) {
    with_entry_mut(pools, family, uuid, |entry| {
        entry.usage_info = Some(snapshot);
    });
}

pub(crate) fn reset_counters(pools: &PoolMap, saver: &SaveScheduler, family: &str, uuid: &str) {
    if with_entry_mut(pools, family, uuid, |entry| entry.reset_counters()).is_none() {
        tracing::warn!(
            "[W-POOL-UNKNOWN-ENTRY] reset_counters_ignored: family={} uuid={}",
            family,
            uuid
        );
        return;
    }
    tracing::info!("[Pool] Reset counters for {} entry {}", family, uuid);
    saver.schedule(family);
}

pub(crate) fn set_disabled(
    pools: &PoolMap,
    saver: &SaveScheduler,
    family: &str,
    uuid: &str,
    disabled: bool,
) {
    if with_entry_mut(pools, family, uuid, |entry| entry.is_disabled = disabled).is_none() {
        tracing::warn!(
            "[W-POOL-UNKNOWN-ENTRY] set_disabled_ignored: family={} uuid={}",
            family,
            uuid
        );
        return;
    }
    tracing::info!(
        "[Pool] {} entry {} {}",
        family,
        uuid,
        if disabled { "disabled" } else { "enabled" }
    );
    saver.schedule(family);
}
