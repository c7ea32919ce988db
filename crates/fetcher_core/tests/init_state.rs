use fetcher_core::{create_init_state, create_init_state_now, STATE_VERSION};
use pretty_assertions::assert_eq;

#[test]
fn init_state_schedules_deadlines_from_now() {
    let now = 1_700_000_000;
    let state = create_init_state(now);

    assert_eq!(state.version, STATE_VERSION);
    assert_eq!(state.started_sec, now);
    assert_eq!(state.re_started_sec, now);
    assert_eq!(state.next_partial_sync_sec, now + 600);
    assert_eq!(state.next_full_sync_sec, now + 86_400);
    assert_eq!(state.next_export_sec, now + 14_400);
}

#[test]
fn init_state_zeroes_counters_and_gauges() {
    let state = create_init_state(42);

    assert_eq!(state.stopped_sec, 0);
    assert_eq!(state.last_tick_sec, 0);
    assert_eq!(state.num_ticks, 0);
    assert_eq!(state.num_starts, 0);
    assert_eq!(state.last_updated_ms, 0);
    assert_eq!(state.mem_rss_mb, 0);
    assert_eq!(state.mem_heap_mb, 0);
    assert!(!state.in_tick);
    assert!(state.pilots.is_empty());
}

#[test]
fn init_state_now_uses_wall_clock() {
    let before = wall_clock_sec();
    let state = create_init_state_now();
    let after = wall_clock_sec();

    assert!(state.started_sec >= before - 1 && state.started_sec <= after + 1);
    assert_eq!(state.next_export_sec - state.started_sec, 14_400);
}

fn wall_clock_sec() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}
