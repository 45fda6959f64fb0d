use super::PoolManager;
use chrono::Utc;

use crate::pool::recovery;
use crate::pool::types::{ProviderEntry, ProviderFamily, SelectOptions};

impl PoolManager {
    /// Selects a provider entry for `family`, optionally restricted to
    /// entries that can serve `requested_model`.
    ///
    /// Healthy entries are preferred; when none exist the selector serves
    /// from the unhealthy (but enabled) pool rather than failing. Unhealthy
    /// entries whose cool-down elapsed get an asynchronous recovery probe
    /// dispatched; the call never waits on it.
    pub fn select(
        &self,
        family: &str,
        requested_model: Option<&str>,
        opts: SelectOptions,
    ) -> Option<ProviderEntry> {
        if family.trim().is_empty() {
            tracing::error!("[E-SELECT-BAD-FAMILY] selection_requires_a_family_name");
            return None;
        }

        let mut recoveries: Vec<String> = Vec::new();
        let selected = {
            let mut list = self.pools.get_mut(family)?;
            let entries = list.value_mut();
            if entries.is_empty() {
                tracing::debug!("[Selector] Family {} has no entries", family);
                return None;
            }

            let mut candidates: Vec<usize> = entries
                .iter()
                .enumerate()
                .filter(|(_, e)| !e.is_disabled)
                .map(|(i, _)| i)
                .collect();
            if candidates.is_empty() {
                tracing::debug!("[Selector] Every {} entry is disabled", family);
                return None;
            }
            if let Some(model) = requested_model {
                candidates.retain(|&i| entries[i].supports_model(model));
                if candidates.is_empty() {
                    tracing::debug!("[Selector] No {} entry supports model {}", family, model);
                    return None;
                }
            }

            // Cool-down sweep. Overwriting lastErrorTime here debounces
            // concurrent selections racing to dispatch the same recovery.
            let now = Utc::now();
            let interval =
                chrono::Duration::milliseconds(self.config.health_check_interval_ms as i64);
            for &i in &candidates {
                if entries[i].cooldown_elapsed(now, interval) {
                    entries[i].last_error_time = Some(now);
                    recoveries.push(entries[i].uuid.clone());
                }
            }

            let healthy: Vec<usize> = candidates
                .iter()
                .copied()
                .filter(|&i| entries[i].is_healthy)
                .collect();
            let pool = if healthy.is_empty() {
                tracing::warn!(
                    "[Selector] No healthy {} entries, serving from the unhealthy pool",
                    family
                );
                candidates
            } else {
                healthy
            };

            let rr_key = match requested_model {
                Some(model) => format!("{}:{}", family, model),
                None => family.to_string(),
            };
            let position = {
                let mut index = self.round_robin.entry(rr_key).or_insert(0);
                let position = *index % pool.len();
                *index = (position + 1) % pool.len();
                position
            };

            let entry = &mut entries[pool[position]];
            if !opts.skip_usage_count {
                entry.record_usage();
            }
            entry.clone()
        };

        if !opts.skip_usage_count {
            self.saver.schedule(family);
        }

        if !recoveries.is_empty() {
            match family.parse::<ProviderFamily>() {
                Ok(parsed) => {
                    for uuid in recoveries {
                        recovery::spawn_recovery(self.context(), parsed, uuid);
                    }
                }
                Err(_) => tracing::debug!(
                    "[Selector] Skipping recovery dispatch for unrecognized family {}",
                    family
                ),
            }
        }

        Some(selected)
    }
}
