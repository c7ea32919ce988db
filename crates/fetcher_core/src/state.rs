use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Schema version of [`FetcherState`].
///
/// Bump it whenever the shape of the state changes: snapshots are stored under
/// a version-qualified path, so older snapshots are simply never found.
pub const STATE_VERSION: u32 = 1;

pub const PARTIAL_SYNC_SEC: i64 = 10 * 60;
pub const FULL_SYNC_SEC: i64 = 24 * 3600;
pub const EXPORT_SEC: i64 = 4 * 3600;

pub type PilotId = i64;

/// Durable state of the fetcher process.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FetcherState {
    pub version: u32,

    pub started_sec: i64,
    pub re_started_sec: i64,
    /// 0 until the first clean shutdown.
    pub stopped_sec: i64,
    pub last_tick_sec: i64,
    pub num_ticks: u64,
    pub num_starts: u64,

    pub last_updated_ms: i64,

    pub next_partial_sync_sec: i64,
    pub next_full_sync_sec: i64,
    pub next_export_sec: i64,

    pub mem_rss_mb: u32,
    pub mem_heap_mb: u32,

    /// Set for the duration of a tick.
    pub in_tick: bool,
    pub pilots: BTreeMap<PilotId, PilotState>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PilotState {
    pub name: String,
    pub enabled: bool,
    /// Keyed by tracker provider name.
    pub trackers: BTreeMap<String, TrackerState>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrackerState {
    pub enabled: bool,
    pub account: String,
    pub last_fix_sec: i64,
    pub last_fetch_sec: i64,
    pub next_fetch_sec: i64,
    pub num_requests: u64,
    pub num_errors: u64,
    pub num_consecutive_errors: u32,
}

/// Memory usage sampled at the end of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoryUsage {
    pub rss_mb: u32,
    pub heap_mb: u32,
}

/// Creates a brand-new state anchored at `now_sec`.
pub fn create_init_state(now_sec: i64) -> FetcherState {
    FetcherState {
        version: STATE_VERSION,

        started_sec: now_sec,
        re_started_sec: now_sec,
        stopped_sec: 0,
        last_tick_sec: 0,
        num_ticks: 0,
        num_starts: 0,

        last_updated_ms: 0,

        next_partial_sync_sec: now_sec + PARTIAL_SYNC_SEC,
        next_full_sync_sec: now_sec + FULL_SYNC_SEC,
        next_export_sec: now_sec + EXPORT_SEC,

        mem_rss_mb: 0,
        mem_heap_mb: 0,

        in_tick: false,
        pilots: BTreeMap::new(),
    }
}

/// [`create_init_state`] at the current wall-clock time.
pub fn create_init_state_now() -> FetcherState {
    create_init_state(ms_to_sec(chrono::Utc::now().timestamp_millis()))
}

/// Converts milliseconds to seconds, rounding to the nearest second.
pub fn ms_to_sec(ms: i64) -> i64 {
    (ms + 500).div_euclid(1000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ms_to_sec_rounds_to_nearest() {
        assert_eq!(ms_to_sec(1_499), 1);
        assert_eq!(ms_to_sec(1_500), 2);
        assert_eq!(ms_to_sec(0), 0);
    }
}
