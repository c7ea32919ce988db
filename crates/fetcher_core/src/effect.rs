use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    PartialSync,
    FullSync,
    Export(SnapshotKind),
    /// The restored run never recorded a shutdown after its last start.
    ReportUncleanShutdown { last_tick_sec: i64 },
}

/// The well-known snapshot slots in durable storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotKind {
    Periodic,
    Shutdown,
}

impl SnapshotKind {
    /// Restore scan order. Earlier kinds win ties on `last_tick_sec`.
    pub const ALL: [SnapshotKind; 2] = [SnapshotKind::Periodic, SnapshotKind::Shutdown];
}

impl fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotKind::Periodic => write!(f, "periodic"),
            SnapshotKind::Shutdown => write!(f, "shutdown"),
        }
    }
}
