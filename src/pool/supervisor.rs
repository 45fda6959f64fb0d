use rand::Rng;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::constants;
use crate::pool::types::{ProviderEntry, ProviderFamily};
use crate::pool::{ops, probe, PoolContext};

/// Outcome counts for one health sweep.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SweepSummary {
    pub total: u32,
    pub probed: u32,
    pub skipped: u32,
    pub healthy: u32,
    pub failed: u32,
    pub reset: u32,
}

/// Probes every entry in every family, honoring the per-entry cool-down
/// unless `is_init` (the startup sweep probes everything eligible).
pub(crate) async fn run_health_sweep(ctx: &PoolContext, is_init: bool) -> SweepSummary {
    let mut summary = SweepSummary::default();
    let interval = chrono::Duration::milliseconds(ctx.config.health_check_interval_ms as i64);

    let family_keys: Vec<String> = ctx.pools.iter().map(|e| e.key().clone()).collect();
    for family_key in family_keys {
        let Ok(family) = family_key.parse::<ProviderFamily>() else {
            tracing::debug!(
                "[Supervisor] Skipping unrecognized family {} during sweep",
                family_key
            );
            continue;
        };

        let entries: Vec<ProviderEntry> = ctx
            .pools
            .get(&family_key)
            .map(|list| list.value().clone())
            .unwrap_or_default();

        for entry in entries {
            summary.total += 1;

            let now = chrono::Utc::now();
            let in_cooldown = !entry.is_healthy
                && entry
                    .last_error_time
                    .map(|last_error| now - last_error < interval)
                    .unwrap_or(false);
            if in_cooldown && !is_init {
                summary.skipped += 1;
                continue;
            }

            let outcome = probe::probe_entry(
                &ctx.factory,
                &ctx.adapter_cache,
                &ctx.config,
                family,
                &entry,
                false,
            )
            .await;

            match outcome {
                None => {
                    // No check ran for this entry; clear any stale counters.
                    ops::reset_counters(&ctx.pools, &ctx.saver, &family_key, &entry.uuid);
                    summary.reset += 1;
                }
                Some(outcome) if outcome.success => {
                    summary.probed += 1;
                    summary.healthy += 1;
                    if let Some(usage) = outcome.usage_info.clone() {
                        ops::store_usage_info(&ctx.pools, &family_key, &entry.uuid, usage);
                    }
                    ops::mark_healthy(
                        &ctx.pools,
                        &ctx.saver,
                        &family_key,
                        &entry.uuid,
                        true,
                        Some(outcome.model_name),
                    );
                }
                Some(outcome) => {
                    summary.probed += 1;
                    summary.failed += 1;
                    ops::mark_unhealthy(
                        &ctx.pools,
                        &ctx.saver,
                        ctx.config.max_error_count,
                        &family_key,
                        &entry.uuid,
                        outcome.error_message.as_deref(),
                    );
                    ops::record_probe_attempt(
                        &ctx.pools,
                        &ctx.saver,
                        &family_key,
                        &entry.uuid,
                        &outcome,
                    );
                }
            }
        }
    }

    if summary.failed > 0 {
        tracing::warn!(
            "[Supervisor] Sweep complete: {} probed, {} healthy, {} failed, {} reset, {} skipped",
            summary.probed,
            summary.healthy,
            summary.failed,
            summary.reset,
            summary.skipped
        );
    } else {
        tracing::info!(
            "[Supervisor] Sweep complete: {} probed, {} healthy, {} reset, {} skipped",
            summary.probed,
            summary.healthy,
            summary.reset,
            summary.skipped
        );
    }

    summary
}

/// Runs the startup sweep after a short jitter, then sweeps on every
/// `health_check_interval` tick until cancelled.
pub(crate) fn start_supervisor(ctx: PoolContext, cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        let (jitter_min_ms, jitter_max_ms) = constants::startup_sweep_jitter_bounds_ms();
        let jitter_ms = if jitter_max_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(jitter_min_ms..=jitter_max_ms)
        };
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(std::time::Duration::from_millis(jitter_ms)) => {}
        }

        run_health_sweep(&ctx, true).await;

        let mut interval = tokio::time::interval(ctx.config.health_check_interval());
        interval.tick().await;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    run_health_sweep(&ctx, false).await;
                }
            }
        }
    })
}
