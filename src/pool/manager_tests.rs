use super::PoolManager;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::{AdapterFactory, AdapterOptions, ServiceAdapter};
use crate::models::config::PoolConfig;
use crate::pool::types::{ProviderEntry, ProviderFamily, SelectOptions};
use crate::pool::{probe, recovery};

struct MockAdapter {
    generate_results: Mutex<VecDeque<Result<Value, String>>>,
    generate_calls: Mutex<Vec<(String, Value)>>,
    usage_result: Mutex<Option<Result<Value, String>>>,
    supports_usage: bool,
    supports_force_refresh: bool,
    force_refreshes: AtomicUsize,
    delay: Option<Duration>,
}

impl MockAdapter {
    fn healthy() -> Arc<Self> {
        Arc::new(Self {
            generate_results: Mutex::new(VecDeque::new()),
            generate_calls: Mutex::new(Vec::new()),
            usage_result: Mutex::new(None),
            supports_usage: false,
            supports_force_refresh: false,
            force_refreshes: AtomicUsize::new(0),
            delay: None,
        })
    }

    fn scripted(results: Vec<Result<Value, String>>) -> Arc<Self> {
        let adapter = Self::healthy();
        *adapter.generate_results.lock() = results.into();
        adapter
    }

    fn with_usage(result: Result<Value, String>) -> Arc<Self> {
        Arc::new(Self {
            generate_results: Mutex::new(VecDeque::new()),
            generate_calls: Mutex::new(Vec::new()),
            usage_result: Mutex::new(Some(result)),
            supports_usage: true,
            supports_force_refresh: true,
            force_refreshes: AtomicUsize::new(0),
            delay: None,
        })
    }

    fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            generate_results: Mutex::new(VecDeque::new()),
            generate_calls: Mutex::new(Vec::new()),
            usage_result: Mutex::new(None),
            supports_usage: false,
            supports_force_refresh: false,
            force_refreshes: AtomicUsize::new(0),
            delay: Some(delay),
        })
    }

    fn generate_count(&self) -> usize {
        self.generate_calls.lock().len()
    }

    fn generate_payloads(&self) -> Vec<Value> {
        self.generate_calls
            .lock()
            .iter()
            .map(|(_, payload)| payload.clone())
            .collect()
    }
}

#[async_trait]
impl ServiceAdapter for MockAdapter {
    async fn generate_content(&self, model_name: &str, payload: &Value) -> Result<Value, String> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.generate_calls
            .lock()
            .push((model_name.to_string(), payload.clone()));
        self.generate_results
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(json!({"ok": true})))
    }

    fn supports_usage_query(&self) -> bool {
        self.supports_usage
    }

    async fn get_usage_limits(&self) -> Result<Value, String> {
        self.usage_result
            .lock()
            .clone()
            .unwrap_or_else(|| Err("usage query not supported".to_string()))
    }

    fn supports_force_refresh(&self) -> bool {
        self.supports_force_refresh
    }

    async fn force_refresh_token(&self) -> Result<(), String> {
        self.force_refreshes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct MockFactory {
    adapter: Arc<MockAdapter>,
}

impl MockFactory {
    fn new(adapter: Arc<MockAdapter>) -> Arc<Self> {
        Arc::new(Self { adapter })
    }
}

#[async_trait]
impl AdapterFactory for MockFactory {
    async fn create(
        &self,
        _family: ProviderFamily,
        _entry: &ProviderEntry,
        _options: AdapterOptions,
    ) -> Result<Arc<dyn ServiceAdapter>, String> {
        Ok(self.adapter.clone())
    }
}

fn test_config(dir: &tempfile::TempDir, debounce_ms: u64) -> PoolConfig {
    PoolConfig {
        save_debounce_time_ms: debounce_ms,
        provider_pools_file_path: dir.path().join("provider_pools.json"),
        ..PoolConfig::default()
    }
}

fn mk_entry(uuid: &str) -> ProviderEntry {
    let mut entry = ProviderEntry::new(uuid);
    entry.check_health = true;
    entry
}

fn manager_with(
    dir: &tempfile::TempDir,
    debounce_ms: u64,
    adapter: Arc<MockAdapter>,
) -> PoolManager {
    PoolManager::new(test_config(dir, debounce_ms), MockFactory::new(adapter))
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..100 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("condition not reached within 2s");
}

#[tokio::test]
async fn round_robin_alternates_across_healthy_entries() {
    let dir = tempfile::tempdir().expect("tempdir");
    let manager = manager_with(&dir, 10_000, MockAdapter::healthy());
    manager.pools.insert(
        "openai-custom".to_string(),
        vec![mk_entry("a"), mk_entry("b")],
    );

    let picks: Vec<String> = (0..5)
        .map(|_| {
            manager
                .select("openai-custom", None, SelectOptions::default())
                .expect("selection")
                .uuid
        })
        .collect();

    assert_eq!(picks, ["a", "b", "a", "b", "a"]);
    assert_eq!(manager.get_entry("openai-custom", "a").unwrap().usage_count, 3);
    assert_eq!(manager.get_entry("openai-custom", "b").unwrap().usage_count, 2);
}

#[tokio::test]
async fn model_filter_and_round_robin_keys_are_independent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let manager = manager_with(&dir, 10_000, MockAdapter::healthy());
    let mut a = mk_entry("a");
    a.not_supported_models = vec!["gpt-4o".to_string()];
    manager
        .pools
        .insert("openai-custom".to_string(), vec![a, mk_entry("b")]);

    for _ in 0..3 {
        let picked = manager
            .select("openai-custom", Some("gpt-4o"), SelectOptions::default())
            .expect("selection");
        assert_eq!(picked.uuid, "b");
    }

    // The unfiltered index is untouched by the model-keyed traffic.
    let first = manager
        .select("openai-custom", None, SelectOptions::default())
        .expect("selection");
    let second = manager
        .select("openai-custom", None, SelectOptions::default())
        .expect("selection");
    assert_eq!(first.uuid, "a");
    assert_eq!(second.uuid, "b");
}

#[tokio::test]
async fn model_filter_with_no_survivors_returns_none() {
    let dir = tempfile::tempdir().expect("tempdir");
    let manager = manager_with(&dir, 10_000, MockAdapter::healthy());
    let mut a = mk_entry("a");
    a.not_supported_models = vec!["gpt-4o".to_string()];
    manager.pools.insert("openai-custom".to_string(), vec![a]);

    assert!(manager
        .select("openai-custom", Some("gpt-4o"), SelectOptions::default())
        .is_none());
}

#[tokio::test]
async fn disabled_entries_are_never_selected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let manager = manager_with(&dir, 10_000, MockAdapter::healthy());
    let mut a = mk_entry("a");
    a.is_disabled = true;
    let mut b = mk_entry("b");
    b.is_healthy = false;
    manager
        .pools
        .insert("claude-custom".to_string(), vec![a.clone(), b]);

    for _ in 0..4 {
        let picked = manager
            .select("claude-custom", None, SelectOptions::default())
            .expect("selection");
        assert_ne!(picked.uuid, "a");
    }

    manager.pools.insert("claude-custom".to_string(), vec![a]);
    assert!(manager
        .select("claude-custom", None, SelectOptions::default())
        .is_none());
}

#[tokio::test]
async fn invalid_or_unknown_family_returns_none() {
    let dir = tempfile::tempdir().expect("tempdir");
    let manager = manager_with(&dir, 10_000, MockAdapter::healthy());

    assert!(manager.select("", None, SelectOptions::default()).is_none());
    assert!(manager
        .select("openai-custom", None, SelectOptions::default())
        .is_none());
}

#[tokio::test]
async fn skip_usage_count_leaves_counters_untouched() {
    let dir = tempfile::tempdir().expect("tempdir");
    let manager = manager_with(&dir, 10_000, MockAdapter::healthy());
    manager
        .pools
        .insert("openai-custom".to_string(), vec![mk_entry("a")]);

    let opts = SelectOptions {
        skip_usage_count: true,
    };
    manager.select("openai-custom", None, opts).expect("selection");

    let entry = manager.get_entry("openai-custom", "a").unwrap();
    assert_eq!(entry.usage_count, 0);
    assert!(entry.last_used.is_none());
}

#[tokio::test]
async fn error_escalation_flips_health_and_fallback_still_serves() {
    let dir = tempfile::tempdir().expect("tempdir");
    let manager = manager_with(&dir, 10_000, MockAdapter::healthy());
    manager
        .pools
        .insert("claude-custom".to_string(), vec![mk_entry("x")]);

    for _ in 0..3 {
        manager.mark_unhealthy("claude-custom", "x", Some("timeout"));
    }
    let entry = manager.get_entry("claude-custom", "x").unwrap();
    assert!(!entry.is_healthy);
    assert_eq!(entry.error_count, 3);
    assert_eq!(entry.last_error_message.as_deref(), Some("timeout"));

    // Cool-down has not elapsed: fallback selection, no recovery dispatch.
    let picked = manager
        .select("claude-custom", None, SelectOptions::default())
        .expect("fallback selection");
    assert_eq!(picked.uuid, "x");
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!manager.get_entry("claude-custom", "x").unwrap().is_healthy);
}

#[tokio::test]
async fn cooled_down_entry_recovers_through_selection() {
    let dir = tempfile::tempdir().expect("tempdir");
    let adapter = MockAdapter::healthy();
    let manager = manager_with(&dir, 10_000, adapter.clone());

    let mut entry = mk_entry("x");
    entry.is_healthy = false;
    entry.error_count = 3;
    entry.last_error_time = Some(chrono::Utc::now() - chrono::Duration::milliseconds(700_000));
    manager
        .pools
        .insert("claude-custom".to_string(), vec![entry]);

    let picked = manager
        .select("claude-custom", None, SelectOptions::default())
        .expect("fallback selection");
    assert_eq!(picked.uuid, "x");

    wait_until(|| manager.get_entry("claude-custom", "x").unwrap().is_healthy).await;

    let entry = manager.get_entry("claude-custom", "x").unwrap();
    assert_eq!(entry.error_count, 0);
    assert!(entry.last_error_time.is_none());
    // One use from selection, one from the recovery confirmation.
    assert_eq!(entry.usage_count, 2);
    assert_eq!(
        entry.last_health_check_model.as_deref(),
        Some("claude-3-7-sonnet-20250219")
    );
}

#[tokio::test]
async fn concurrent_selections_dispatch_a_single_recovery() {
    let dir = tempfile::tempdir().expect("tempdir");
    let adapter = MockAdapter::healthy();
    let manager = manager_with(&dir, 10_000, adapter.clone());

    let mut entry = mk_entry("x");
    entry.is_healthy = false;
    entry.error_count = 3;
    entry.last_error_time = Some(chrono::Utc::now() - chrono::Duration::milliseconds(700_000));
    manager
        .pools
        .insert("claude-custom".to_string(), vec![entry]);

    // The first call overwrites lastErrorTime; the second sees a fresh
    // cool-down and must not dispatch again.
    manager
        .select("claude-custom", None, SelectOptions::default())
        .expect("selection");
    manager
        .select("claude-custom", None, SelectOptions::default())
        .expect("selection");

    wait_until(|| manager.get_entry("claude-custom", "x").unwrap().is_healthy).await;
    assert_eq!(adapter.generate_count(), 1);
}

#[tokio::test]
async fn in_flight_set_blocks_overlapping_recovery_probes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let adapter = MockAdapter::slow(Duration::from_millis(150));
    let manager = manager_with(&dir, 10_000, adapter.clone());

    let mut entry = mk_entry("x");
    entry.is_healthy = false;
    entry.error_count = 3;
    entry.last_error_time = Some(chrono::Utc::now());
    manager
        .pools
        .insert("claude-custom".to_string(), vec![entry]);

    let family = ProviderFamily::ClaudeCustom;
    recovery::spawn_recovery(manager.context(), family, "x".to_string());
    recovery::spawn_recovery(manager.context(), family, "x".to_string());

    wait_until(|| manager.get_entry("claude-custom", "x").unwrap().is_healthy).await;
    assert_eq!(adapter.generate_count(), 1);
}

#[tokio::test]
async fn failed_recovery_updates_attempt_fields_without_error_bump() {
    let dir = tempfile::tempdir().expect("tempdir");
    let adapter = MockAdapter::scripted(vec![Err("still broken".to_string())]);
    let manager = manager_with(&dir, 10_000, adapter.clone());

    let mut entry = mk_entry("x");
    entry.is_healthy = false;
    entry.error_count = 3;
    entry.last_error_time = Some(chrono::Utc::now() - chrono::Duration::milliseconds(700_000));
    manager
        .pools
        .insert("claude-custom".to_string(), vec![entry]);

    manager
        .select("claude-custom", None, SelectOptions::default())
        .expect("selection");

    wait_until(|| {
        manager
            .get_entry("claude-custom", "x")
            .unwrap()
            .last_health_check_time
            .is_some()
    })
    .await;

    let entry = manager.get_entry("claude-custom", "x").unwrap();
    assert!(!entry.is_healthy);
    assert_eq!(entry.error_count, 3, "recovery failures do not escalate");
    assert_eq!(entry.last_error_message.as_deref(), Some("still broken"));
    assert_eq!(
        entry.last_health_check_model.as_deref(),
        Some("claude-3-7-sonnet-20250219")
    );
}

#[tokio::test]
async fn probe_gating_requires_check_health_or_force() {
    let dir = tempfile::tempdir().expect("tempdir");
    let adapter = MockAdapter::healthy();
    let manager = manager_with(&dir, 10_000, adapter.clone());
    let ctx = manager.context();

    let mut entry = ProviderEntry::new("x");
    entry.check_health = false;

    let outcome = probe::probe_entry(
        &ctx.factory,
        &ctx.adapter_cache,
        &ctx.config,
        ProviderFamily::OpenAiCustom,
        &entry,
        false,
    )
    .await;
    assert!(outcome.is_none());
    assert_eq!(adapter.generate_count(), 0);

    let outcome = probe::probe_entry(
        &ctx.factory,
        &ctx.adapter_cache,
        &ctx.config,
        ProviderFamily::OpenAiCustom,
        &entry,
        true,
    )
    .await;
    assert!(outcome.expect("forced probe").success);
}

#[tokio::test]
async fn kiro_quota_exhaustion_is_an_unhealthy_verdict() {
    let dir = tempfile::tempdir().expect("tempdir");
    let adapter = MockAdapter::with_usage(Ok(json!({
        "usageBreakdown": [{"currentUsage": 100, "usageLimit": 100}]
    })));
    let manager = manager_with(&dir, 10_000, adapter.clone());
    let ctx = manager.context();

    let outcome = probe::probe_entry(
        &ctx.factory,
        &ctx.adapter_cache,
        &ctx.config,
        ProviderFamily::ClaudeKiroOauth,
        &mk_entry("k"),
        true,
    )
    .await
    .expect("probe outcome");

    assert!(!outcome.success);
    assert_eq!(outcome.model_name, "claude-haiku-4-5");
    assert_eq!(
        outcome.error_message.as_deref(),
        Some("quota exhausted (100/100)")
    );
    let usage = outcome.usage_info.expect("usage snapshot");
    assert_eq!(usage.remaining, 0.0);
    assert_eq!(usage.usage_percent, 100);
    assert_eq!(adapter.force_refreshes.load(Ordering::SeqCst), 1);
    assert_eq!(adapter.generate_count(), 0, "no chat probe after a verdict");
}

#[tokio::test]
async fn usage_query_failure_falls_back_to_chat_probe() {
    let dir = tempfile::tempdir().expect("tempdir");
    let adapter = MockAdapter::with_usage(Err("usage endpoint 500".to_string()));
    let manager = manager_with(&dir, 10_000, adapter.clone());
    let ctx = manager.context();

    let outcome = probe::probe_entry(
        &ctx.factory,
        &ctx.adapter_cache,
        &ctx.config,
        ProviderFamily::ClaudeKiroOauth,
        &mk_entry("k"),
        true,
    )
    .await
    .expect("probe outcome");

    assert!(outcome.success);
    assert!(outcome.usage_info.is_none());
    assert_eq!(adapter.generate_count(), 1);
}

#[tokio::test]
async fn kiro_chat_probe_falls_back_to_contents_payload() {
    let dir = tempfile::tempdir().expect("tempdir");
    let adapter = MockAdapter::scripted(vec![
        Err("bad request shape".to_string()),
        Ok(json!({"ok": true})),
    ]);
    let manager = manager_with(&dir, 10_000, adapter.clone());
    let ctx = manager.context();

    let outcome = probe::probe_entry(
        &ctx.factory,
        &ctx.adapter_cache,
        &ctx.config,
        ProviderFamily::ClaudeKiroOauth,
        &mk_entry("k"),
        true,
    )
    .await
    .expect("probe outcome");

    assert!(outcome.success);
    assert_eq!(outcome.model_name, "claude-haiku-4-5");

    let payloads = adapter.generate_payloads();
    assert_eq!(payloads.len(), 2);
    assert!(payloads[0].get("messages").is_some());
    assert_eq!(payloads[0]["max_tokens"], 1);
    assert!(payloads[1].get("contents").is_some());
}

#[tokio::test]
async fn sweep_resets_unchecked_entries_and_marks_failures() {
    let dir = tempfile::tempdir().expect("tempdir");
    let adapter = MockAdapter::scripted(vec![Err("upstream 503".to_string())]);
    let manager = manager_with(&dir, 10_000, adapter.clone());

    let mut unchecked = ProviderEntry::new("quiet");
    unchecked.usage_count = 5;
    unchecked.error_count = 2;
    let checked = mk_entry("loud");
    manager
        .pools
        .insert("openai-custom".to_string(), vec![unchecked, checked]);

    let summary = manager.perform_health_checks(false).await;

    assert_eq!(summary.total, 2);
    assert_eq!(summary.probed, 1);
    assert_eq!(summary.reset, 1);
    assert_eq!(summary.failed, 1);

    let quiet = manager.get_entry("openai-custom", "quiet").unwrap();
    assert_eq!(quiet.usage_count, 0);
    assert_eq!(quiet.error_count, 0);
    assert!(quiet.is_healthy);

    let loud = manager.get_entry("openai-custom", "loud").unwrap();
    assert_eq!(loud.error_count, 1);
    assert_eq!(loud.last_error_message.as_deref(), Some("upstream 503"));
    assert!(loud.last_health_check_time.is_some());
    assert_eq!(loud.last_health_check_model.as_deref(), Some("gpt-3.5-turbo"));
}

#[tokio::test]
async fn sweep_success_resets_usage_count() {
    let dir = tempfile::tempdir().expect("tempdir");
    let manager = manager_with(&dir, 10_000, MockAdapter::healthy());

    let mut entry = mk_entry("x");
    entry.usage_count = 9;
    entry.is_healthy = false;
    entry.error_count = 3;
    manager
        .pools
        .insert("openai-custom".to_string(), vec![entry]);

    let summary = manager.perform_health_checks(true).await;
    assert_eq!(summary.healthy, 1);

    let entry = manager.get_entry("openai-custom", "x").unwrap();
    assert!(entry.is_healthy);
    assert_eq!(entry.usage_count, 0, "supervisor path resets usage");
}

#[tokio::test]
async fn sweep_honors_cooldown_unless_initial() {
    let dir = tempfile::tempdir().expect("tempdir");
    let adapter = MockAdapter::healthy();
    let manager = manager_with(&dir, 10_000, adapter.clone());

    let mut entry = mk_entry("x");
    entry.is_healthy = false;
    entry.error_count = 3;
    entry.last_error_time = Some(chrono::Utc::now());
    manager
        .pools
        .insert("openai-custom".to_string(), vec![entry]);

    let summary = manager.perform_health_checks(false).await;
    assert_eq!(summary.skipped, 1);
    assert_eq!(adapter.generate_count(), 0);

    let summary = manager.perform_health_checks(true).await;
    assert_eq!(summary.probed, 1);
    assert_eq!(adapter.generate_count(), 1);
}

#[tokio::test]
async fn rapid_selections_coalesce_into_one_document_write() {
    let dir = tempfile::tempdir().expect("tempdir");
    let seed = json!({
        "openai-custom": [
            {"uuid": "a", "_comment": "primary account"},
            {"uuid": "b"}
        ],
        "legacy-family": [{"uuid": "z"}]
    });
    std::fs::write(
        dir.path().join("provider_pools.json"),
        serde_json::to_string_pretty(&seed).unwrap(),
    )
    .expect("seed document");

    let manager = manager_with(&dir, 150, MockAdapter::healthy());
    assert_eq!(manager.load_pools().expect("load"), 2);
    assert!(manager.entries("legacy-family").is_empty());

    for _ in 0..10 {
        manager
            .select("openai-custom", None, SelectOptions::default())
            .expect("selection");
    }

    let on_disk = std::fs::read_to_string(dir.path().join("provider_pools.json")).unwrap();
    let on_disk: Value = serde_json::from_str(&on_disk).unwrap();
    assert_eq!(
        on_disk["openai-custom"][0].get("usageCount"),
        None,
        "nothing is written before the debounce fires"
    );

    tokio::time::sleep(Duration::from_millis(500)).await;

    let on_disk = std::fs::read_to_string(dir.path().join("provider_pools.json")).unwrap();
    let on_disk: Value = serde_json::from_str(&on_disk).unwrap();
    assert_eq!(on_disk["openai-custom"][0]["usageCount"], 5);
    assert_eq!(on_disk["openai-custom"][1]["usageCount"], 5);
    assert_eq!(on_disk["openai-custom"][0]["_comment"], "primary account");
    assert_eq!(on_disk["legacy-family"][0]["uuid"], "z");
}

#[tokio::test]
async fn load_pools_backfills_missing_uuids() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        dir.path().join("provider_pools.json"),
        r#"{"claude-kiro-oauth": [{"checkHealth": true}]}"#,
    )
    .expect("seed document");

    let manager = manager_with(&dir, 50, MockAdapter::healthy());
    assert_eq!(manager.load_pools().expect("load"), 1);

    let entries = manager.entries("claude-kiro-oauth");
    assert_eq!(entries.len(), 1);
    assert!(!entries[0].uuid.is_empty());

    tokio::time::sleep(Duration::from_millis(300)).await;
    let on_disk = std::fs::read_to_string(dir.path().join("provider_pools.json")).unwrap();
    let on_disk: Value = serde_json::from_str(&on_disk).unwrap();
    assert_eq!(on_disk["claude-kiro-oauth"][0]["uuid"], entries[0].uuid);
}

#[tokio::test]
async fn graceful_shutdown_flushes_pending_families() {
    let dir = tempfile::tempdir().expect("tempdir");
    let manager = manager_with(&dir, 600_000, MockAdapter::healthy());
    manager
        .pools
        .insert("openai-custom".to_string(), vec![mk_entry("a")]);

    manager
        .select("openai-custom", None, SelectOptions::default())
        .expect("selection");
    assert!(!dir.path().join("provider_pools.json").exists());

    manager.graceful_shutdown(Duration::from_millis(500)).await;

    let on_disk = std::fs::read_to_string(dir.path().join("provider_pools.json")).unwrap();
    let on_disk: Value = serde_json::from_str(&on_disk).unwrap();
    assert_eq!(on_disk["openai-custom"][0]["usageCount"], 1);
}

#[tokio::test]
async fn stats_and_overview_reflect_pool_state() {
    let dir = tempfile::tempdir().expect("tempdir");
    let manager = manager_with(&dir, 10_000, MockAdapter::healthy());

    let mut sick = mk_entry("sick");
    sick.is_healthy = false;
    sick.error_count = 3;
    let mut off = mk_entry("off");
    off.is_disabled = true;
    manager
        .pools
        .insert("openai-custom".to_string(), vec![mk_entry("ok"), sick, off]);
    manager
        .pools
        .insert("claude-custom".to_string(), vec![mk_entry("c")]);

    let stats = manager.stats("openai-custom").expect("stats");
    assert_eq!(stats.total_count, 3);
    assert_eq!(stats.healthy_count, 2);
    assert_eq!(stats.disabled_count, 1);
    assert_eq!(stats.total_errors, 3);

    let overview = manager.overview();
    assert_eq!(overview.len(), 2);
    assert_eq!(overview[0].0, "claude-custom");
    assert_eq!(overview[1].0, "openai-custom");
}
