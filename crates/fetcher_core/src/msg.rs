use crate::MemoryUsage;

/// Inputs to [`crate::update`]. Timestamps are wall-clock milliseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The process (re)started with this state as its live state.
    Started { now_ms: i64 },
    /// A processing tick begins.
    TickStarted { now_ms: i64 },
    /// A processing tick finished, optionally with a memory sample.
    TickCompleted {
        now_ms: i64,
        memory: Option<MemoryUsage>,
    },
    /// The supervisor received a shutdown signal.
    ShutdownRequested { now_ms: i64 },
}
