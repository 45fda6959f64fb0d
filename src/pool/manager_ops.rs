use super::PoolManager;

use crate::pool::ops;
use crate::pool::supervisor::{self, SweepSummary};
use crate::pool::types::{PoolStats, ProviderEntry};

impl PoolManager {
    // ===== Health accounting =====

    /// Registers a failure for an entry; flips it to unhealthy once
    /// `max_error_count` consecutive failures accumulate.
    pub fn mark_unhealthy(&self, family: &str, uuid: &str, error_message: Option<&str>) {
        ops::mark_unhealthy(
            &self.pools,
            &self.saver,
            self.config.max_error_count,
            family,
            uuid,
            error_message,
        );
    }

    /// Confirms an entry healthy and clears its error state. With
    /// `reset_usage_count` the usage counter is zeroed; without it the
    /// confirmation counts as a use.
    pub fn mark_healthy(
        &self,
        family: &str,
        uuid: &str,
        reset_usage_count: bool,
        health_check_model: Option<String>,
    ) {
        ops::mark_healthy(
            &self.pools,
            &self.saver,
            family,
            uuid,
            reset_usage_count,
            health_check_model,
        );
    }

    // ===== Operator actions =====

    pub fn disable(&self, family: &str, uuid: &str) {
        ops::set_disabled(&self.pools, &self.saver, family, uuid, true);
    }

    pub fn enable(&self, family: &str, uuid: &str) {
        ops::set_disabled(&self.pools, &self.saver, family, uuid, false);
    }

    pub fn reset_counters(&self, family: &str, uuid: &str) {
        ops::reset_counters(&self.pools, &self.saver, family, uuid);
    }

    /// Sweeps every entry in every family through the probe engine.
    pub async fn perform_health_checks(&self, is_init: bool) -> SweepSummary {
        supervisor::run_health_sweep(&self.context(), is_init).await
    }

    // ===== Introspection =====

    pub fn get_entry(&self, family: &str, uuid: &str) -> Option<ProviderEntry> {
        ops::get_entry(&self.pools, family, uuid)
    }

    pub fn stats(&self, family: &str) -> Option<PoolStats> {
        self.pools
            .get(family)
            .map(|list| PoolStats::from_entries(list.value()))
    }

    pub fn overview(&self) -> Vec<(String, PoolStats)> {
        let mut overview: Vec<(String, PoolStats)> = self
            .pools
            .iter()
            .map(|list| (list.key().clone(), PoolStats::from_entries(list.value())))
            .collect();
        overview.sort_by(|a, b| a.0.cmp(&b.0));
        overview
    }
}
