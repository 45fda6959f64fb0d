/// Consecutive failures before an entry is flipped to unhealthy.
pub const DEFAULT_MAX_ERROR_COUNT: u32 = 3;

/// Cool-down after a failure before recovery probing may run (milliseconds).
pub const DEFAULT_HEALTH_CHECK_INTERVAL_MS: u64 = 600_000;

/// Debounce window for coalesced pool-document writes (milliseconds).
pub const DEFAULT_SAVE_DEBOUNCE_MS: u64 = 1_000;

/// Default on-disk pool document path.
pub const DEFAULT_POOLS_FILE: &str = "provider_pools.json";

/// Prompt text sent by chat-send health probes.
pub const PROBE_PROMPT: &str = "Hi";

/// Random delay window before the startup health sweep (milliseconds).
const STARTUP_SWEEP_JITTER_MIN_MS_DEFAULT: u64 = 150;
const STARTUP_SWEEP_JITTER_MAX_MS_DEFAULT: u64 = 1_200;

pub(crate) fn startup_sweep_jitter_bounds_ms() -> (u64, u64) {
    let min = std::env::var("WEIR_STARTUP_SWEEP_JITTER_MIN_MS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(STARTUP_SWEEP_JITTER_MIN_MS_DEFAULT);
    let max = std::env::var("WEIR_STARTUP_SWEEP_JITTER_MAX_MS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(STARTUP_SWEEP_JITTER_MAX_MS_DEFAULT);

    if min <= max {
        (min, max)
    } else {
        (max, min)
    }
}
