//! Fetcher core: the durable process state and its pure state machine.
mod effect;
mod msg;
mod select;
mod state;
mod update;

pub use effect::{Effect, SnapshotKind};
pub use msg::Msg;
pub use select::{most_recent_or, select_most_recent};
pub use state::{
    create_init_state, create_init_state_now, ms_to_sec, FetcherState, MemoryUsage, PilotId,
    PilotState, TrackerState, EXPORT_SEC, FULL_SYNC_SEC, PARTIAL_SYNC_SEC, STATE_VERSION,
};
pub use update::update;
