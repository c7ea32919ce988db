use fetcher_core::{
    create_init_state, update, Effect, MemoryUsage, Msg, SnapshotKind, EXPORT_SEC, FULL_SYNC_SEC,
    PARTIAL_SYNC_SEC,
};
use pretty_assertions::assert_eq;

const T0: i64 = 1_700_000_000;

fn ms(sec: i64) -> i64 {
    sec * 1000
}

fn init_logging() {
    fetcher_logging::initialize_for_tests();
}

#[test]
fn start_counts_restarts_and_records_time() {
    init_logging();
    let state = create_init_state(T0);

    let (state, effects) = update(state, Msg::Started { now_ms: ms(T0 + 5) });
    assert!(effects.is_empty());
    assert_eq!(state.num_starts, 1);
    assert_eq!(state.re_started_sec, T0 + 5);
    assert_eq!(state.started_sec, T0);
    assert_eq!(state.last_updated_ms, ms(T0 + 5));

    let (state, _) = update(state, Msg::Started { now_ms: ms(T0 + 50) });
    assert_eq!(state.num_starts, 2);
    assert_eq!(state.re_started_sec, T0 + 50);
}

#[test]
fn start_after_a_run_without_shutdown_is_reported() {
    init_logging();
    let state = create_init_state(T0);
    let (state, _) = update(state, Msg::Started { now_ms: ms(T0) });
    let (state, _) = update(
        state,
        Msg::TickCompleted {
            now_ms: ms(T0 + 30),
            memory: None,
        },
    );

    // The process died here: no ShutdownRequested was applied.
    let (state, effects) = update(state, Msg::Started { now_ms: ms(T0 + 60) });
    assert_eq!(
        effects,
        vec![Effect::ReportUncleanShutdown {
            last_tick_sec: T0 + 30
        }]
    );
    assert_eq!(state.num_starts, 2);
    assert!(!state.in_tick);
}

#[test]
fn start_after_a_clean_shutdown_is_quiet() {
    init_logging();
    let state = create_init_state(T0);
    let (state, _) = update(state, Msg::Started { now_ms: ms(T0) });
    let (state, _) = update(state, Msg::ShutdownRequested { now_ms: ms(T0 + 40) });

    let (state, effects) = update(state, Msg::Started { now_ms: ms(T0 + 60) });
    assert!(effects.is_empty());
    assert_eq!(state.num_starts, 2);
}

#[test]
fn start_with_a_tick_left_open_is_reported_and_cleared() {
    init_logging();
    let mut state = create_init_state(T0);
    state.in_tick = true;
    state.last_tick_sec = T0 + 30;

    let (state, effects) = update(state, Msg::Started { now_ms: ms(T0 + 60) });
    assert_eq!(
        effects,
        vec![Effect::ReportUncleanShutdown {
            last_tick_sec: T0 + 30
        }]
    );
    assert!(!state.in_tick);
}

#[test]
fn tick_advances_counters_and_memory() {
    init_logging();
    let state = create_init_state(T0);

    let (state, _) = update(state, Msg::TickStarted { now_ms: ms(T0 + 1) });
    assert!(state.in_tick);

    let (state, effects) = update(
        state,
        Msg::TickCompleted {
            now_ms: ms(T0 + 2),
            memory: Some(MemoryUsage {
                rss_mb: 120,
                heap_mb: 80,
            }),
        },
    );
    assert!(effects.is_empty());
    assert!(!state.in_tick);
    assert_eq!(state.num_ticks, 1);
    assert_eq!(state.last_tick_sec, T0 + 2);
    assert_eq!(state.mem_rss_mb, 120);
    assert_eq!(state.mem_heap_mb, 80);

    // No sample keeps the previous gauges.
    let (state, _) = update(
        state,
        Msg::TickCompleted {
            now_ms: ms(T0 + 3),
            memory: None,
        },
    );
    assert_eq!(state.num_ticks, 2);
    assert_eq!(state.mem_rss_mb, 120);
}

#[test]
fn last_tick_never_moves_backwards() {
    let state = create_init_state(T0);
    let (state, _) = update(
        state,
        Msg::TickCompleted {
            now_ms: ms(T0 + 100),
            memory: None,
        },
    );
    let (state, _) = update(
        state,
        Msg::TickCompleted {
            now_ms: ms(T0 + 10),
            memory: None,
        },
    );
    assert_eq!(state.last_tick_sec, T0 + 100);
    assert_eq!(state.num_ticks, 2);
}

#[test]
fn partial_sync_fires_when_due_and_is_rearmed() {
    let state = create_init_state(T0);
    let due = T0 + PARTIAL_SYNC_SEC;

    let (state, effects) = update(
        state,
        Msg::TickCompleted {
            now_ms: ms(due - 1),
            memory: None,
        },
    );
    assert!(effects.is_empty());

    let (state, effects) = update(
        state,
        Msg::TickCompleted {
            now_ms: ms(due),
            memory: None,
        },
    );
    assert_eq!(effects, vec![Effect::PartialSync]);
    assert_eq!(state.next_partial_sync_sec, due + PARTIAL_SYNC_SEC);
}

#[test]
fn full_sync_subsumes_partial_sync() {
    let state = create_init_state(T0);
    let now = T0 + FULL_SYNC_SEC;

    let (state, effects) = update(
        state,
        Msg::TickCompleted {
            now_ms: ms(now),
            memory: None,
        },
    );
    assert_eq!(
        effects,
        vec![Effect::FullSync, Effect::Export(SnapshotKind::Periodic)]
    );
    assert_eq!(state.next_full_sync_sec, now + FULL_SYNC_SEC);
    assert_eq!(state.next_partial_sync_sec, now + PARTIAL_SYNC_SEC);
    assert_eq!(state.next_export_sec, now + EXPORT_SEC);
}

#[test]
fn periodic_export_fires_on_its_own_cadence() {
    let mut state = create_init_state(T0);
    // Keep the syncs out of the way.
    state.next_partial_sync_sec = T0 + FULL_SYNC_SEC;

    let now = T0 + EXPORT_SEC;
    let (state, effects) = update(
        state,
        Msg::TickCompleted {
            now_ms: ms(now),
            memory: None,
        },
    );
    assert_eq!(effects, vec![Effect::Export(SnapshotKind::Periodic)]);
    assert_eq!(state.next_export_sec, now + EXPORT_SEC);
}

#[test]
fn shutdown_records_stop_time_and_requests_export() {
    let state = create_init_state(T0);
    let (state, _) = update(state, Msg::TickStarted { now_ms: ms(T0 + 1) });

    let (state, effects) = update(state, Msg::ShutdownRequested { now_ms: ms(T0 + 9) });
    assert_eq!(effects, vec![Effect::Export(SnapshotKind::Shutdown)]);
    assert_eq!(state.stopped_sec, T0 + 9);
    assert!(!state.in_tick);
    assert_eq!(state.last_updated_ms, ms(T0 + 9));
}
