use crate::pool::ops;
use crate::pool::probe;
use crate::pool::types::ProviderFamily;
use crate::pool::PoolContext;

/// Fires a background recovery probe for a cooled-down unhealthy entry.
///
/// The selector's `lastErrorTime` overwrite is the first guard against
/// duplicate dispatch; the in-flight set closes the remaining race between
/// selections that both observed the elapsed cool-down.
pub(crate) fn spawn_recovery(ctx: PoolContext, family: ProviderFamily, uuid: String) {
    let key = probe::adapter_cache_key(family, &uuid);
    if ctx.recovering.insert(key.clone(), ()).is_some() {
        tracing::debug!(
            "[Recovery] Probe already in flight for {} entry {}",
            family,
            uuid
        );
        return;
    }

    tokio::spawn(async move {
        tracing::info!("[Recovery] Probing unhealthy {} entry {}", family, uuid);

        let snapshot = ops::get_entry(&ctx.pools, family.as_str(), &uuid);
        let outcome = match snapshot {
            Some(entry) => {
                probe::probe_entry(
                    &ctx.factory,
                    &ctx.adapter_cache,
                    &ctx.config,
                    family,
                    &entry,
                    true,
                )
                .await
            }
            None => None,
        };

        match outcome {
            Some(outcome) if outcome.success => {
                if let Some(usage) = outcome.usage_info.clone() {
                    ops::store_usage_info(&ctx.pools, family.as_str(), &uuid, usage);
                }
                ops::mark_healthy(
                    &ctx.pools,
                    &ctx.saver,
                    family.as_str(),
                    &uuid,
                    false,
                    Some(outcome.model_name.clone()),
                );
                tracing::info!(
                    "[Recovery] {} entry {} recovered via {}",
                    family,
                    uuid,
                    outcome.model_name
                );
            }
            Some(outcome) => {
                // The entry is already unhealthy; record the attempt without
                // inflating errorCount.
                ops::record_probe_attempt(&ctx.pools, &ctx.saver, family.as_str(), &uuid, &outcome);
                tracing::warn!(
                    "[Recovery] {} entry {} still unhealthy: {}",
                    family,
                    uuid,
                    outcome.error_message.as_deref().unwrap_or("unknown error")
                );
            }
            None => {
                tracing::debug!("[Recovery] No probe ran for {} entry {}", family, uuid);
            }
        }

        ctx.recovering.remove(&key);
    });
}
