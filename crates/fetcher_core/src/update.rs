use crate::{
    ms_to_sec, Effect, FetcherState, Msg, SnapshotKind, EXPORT_SEC, FULL_SYNC_SEC,
    PARTIAL_SYNC_SEC,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: FetcherState, msg: Msg) -> (FetcherState, Vec<Effect>) {
    let effects = match msg {
        Msg::Started { now_ms } => {
            let mut effects = Vec::new();
            if ended_uncleanly(&state) {
                effects.push(Effect::ReportUncleanShutdown {
                    last_tick_sec: state.last_tick_sec,
                });
            }
            state.in_tick = false;
            state.num_starts += 1;
            state.re_started_sec = ms_to_sec(now_ms);
            state.last_updated_ms = now_ms;
            effects
        }
        Msg::TickStarted { now_ms } => {
            state.in_tick = true;
            state.last_updated_ms = now_ms;
            Vec::new()
        }
        Msg::TickCompleted { now_ms, memory } => {
            let now_sec = ms_to_sec(now_ms);
            state.in_tick = false;
            state.num_ticks += 1;
            // Never move backwards, even if the wall clock does.
            state.last_tick_sec = state.last_tick_sec.max(now_sec);
            if let Some(memory) = memory {
                state.mem_rss_mb = memory.rss_mb;
                state.mem_heap_mb = memory.heap_mb;
            }
            state.last_updated_ms = now_ms;
            schedule_due(&mut state, now_sec)
        }
        Msg::ShutdownRequested { now_ms } => {
            state.stopped_sec = ms_to_sec(now_ms);
            state.in_tick = false;
            state.last_updated_ms = now_ms;
            vec![Effect::Export(SnapshotKind::Shutdown)]
        }
    };

    (state, effects)
}

/// The restored run started but never recorded a shutdown after that start.
fn ended_uncleanly(state: &FetcherState) -> bool {
    state.in_tick || (state.num_starts > 0 && state.stopped_sec < state.re_started_sec)
}

/// Emits an effect for every deadline reached at `now_sec` and re-arms it.
fn schedule_due(state: &mut FetcherState, now_sec: i64) -> Vec<Effect> {
    let mut effects = Vec::new();

    // A full sync covers everything a partial sync would do.
    if state.next_full_sync_sec <= now_sec {
        effects.push(Effect::FullSync);
        state.next_full_sync_sec = now_sec + FULL_SYNC_SEC;
        state.next_partial_sync_sec = now_sec + PARTIAL_SYNC_SEC;
    } else if state.next_partial_sync_sec <= now_sec {
        effects.push(Effect::PartialSync);
        state.next_partial_sync_sec = now_sec + PARTIAL_SYNC_SEC;
    }

    if state.next_export_sec <= now_sec {
        effects.push(Effect::Export(SnapshotKind::Periodic));
        state.next_export_sec = now_sec + EXPORT_SEC;
    }

    effects
}
