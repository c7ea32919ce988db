use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use fetcher_core::{create_init_state, ms_to_sec, update, Effect, FetcherState, Msg, SnapshotKind};
use fetcher_logging::{fetcher_debug, fetcher_error, fetcher_info, fetcher_warn, set_current_tick};
use fetcher_store::{ExportError, StateStore};
use tokio::task::{JoinError, JoinSet};
use tokio::time::MissedTickBehavior;

use crate::memory;

/// Wall clock in milliseconds.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(|| chrono::Utc::now().timestamp_millis())
}

/// The work done by a tick and by the syncs. Polling lives behind this seam.
#[async_trait::async_trait]
pub trait TickWorker: Send {
    async fn tick(&mut self, state: &mut FetcherState);

    async fn partial_sync(&mut self, state: &mut FetcherState);

    async fn full_sync(&mut self, state: &mut FetcherState);
}

/// Worker that only logs; used until polling is wired in.
#[derive(Debug, Default)]
pub struct IdleWorker;

#[async_trait::async_trait]
impl TickWorker for IdleWorker {
    async fn tick(&mut self, state: &mut FetcherState) {
        fetcher_debug!("Idle tick ({} pilots)", state.pilots.len());
    }

    async fn partial_sync(&mut self, _state: &mut FetcherState) {
        fetcher_info!("Partial sync");
    }

    async fn full_sync(&mut self, _state: &mut FetcherState) {
        fetcher_info!("Full sync");
    }
}

/// Owns the one live [`FetcherState`] for the lifetime of the process.
pub struct Supervisor<W: TickWorker> {
    store: Arc<StateStore>,
    worker: W,
    clock: Clock,
    tick_interval: Duration,
    state: FetcherState,
    exports: JoinSet<Result<String, ExportError>>,
    failed_exports: u64,
    previous_run_clean: bool,
}

impl<W: TickWorker> Supervisor<W> {
    /// Restores the freshest snapshot (or starts fresh) and records the start.
    pub async fn start(
        store: Arc<StateStore>,
        worker: W,
        clock: Clock,
        tick_interval: Duration,
    ) -> Self {
        let fallback = create_init_state(ms_to_sec(clock()));
        let state = store.restore_state(fallback).await;

        let mut supervisor = Self {
            store,
            worker,
            clock,
            tick_interval,
            state,
            exports: JoinSet::new(),
            failed_exports: 0,
            previous_run_clean: true,
        };
        let now_ms = (supervisor.clock)();
        supervisor.apply(Msg::Started { now_ms }).await;
        fetcher_info!(
            "Fetcher started (start #{}, {} ticks so far)",
            supervisor.state.num_starts,
            supervisor.state.num_ticks
        );
        supervisor
    }

    pub fn state(&self) -> &FetcherState {
        &self.state
    }

    /// False when the restored run ended without writing its shutdown snapshot.
    pub fn previous_run_clean(&self) -> bool {
        self.previous_run_clean
    }

    /// Ticks until `shutdown` resolves, then writes the shutdown snapshot.
    pub async fn run_until<F>(mut self, shutdown: F) -> Result<FetcherState, ExportError>
    where
        F: Future<Output = ()>,
    {
        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = interval.tick() => self.tick().await,
            }
        }

        self.shutdown().await
    }

    /// Runs one tick and any work that became due.
    pub async fn tick(&mut self) {
        set_current_tick(self.state.num_ticks + 1);
        let now_ms = (self.clock)();
        self.apply(Msg::TickStarted { now_ms }).await;

        self.worker.tick(&mut self.state).await;

        self.apply(Msg::TickCompleted {
            now_ms: (self.clock)(),
            memory: memory::sample(),
        })
        .await;
        self.collect_finished_exports();
    }

    /// Writes the shutdown snapshot and returns the final state.
    pub async fn shutdown(mut self) -> Result<FetcherState, ExportError> {
        fetcher_info!("Shutting down");
        let now_ms = (self.clock)();
        let msg = Msg::ShutdownRequested { now_ms };
        let (state, effects) = update(std::mem::take(&mut self.state), msg);
        self.state = state;

        // Let pending periodic writes land before the final one.
        while let Some(joined) = self.exports.join_next().await {
            self.record_export(joined);
        }

        for effect in effects {
            if effect == Effect::Export(SnapshotKind::Shutdown) {
                self.store.export(SnapshotKind::Shutdown, &self.state).await?;
            }
        }
        Ok(self.state)
    }

    async fn apply(&mut self, msg: Msg) {
        let (state, effects) = update(std::mem::take(&mut self.state), msg);
        self.state = state;
        for effect in effects {
            self.run_effect(effect).await;
        }
    }

    async fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::PartialSync => self.worker.partial_sync(&mut self.state).await,
            Effect::FullSync => self.worker.full_sync(&mut self.state).await,
            Effect::Export(kind) => self.spawn_export(kind),
            Effect::ReportUncleanShutdown { last_tick_sec } => {
                self.previous_run_clean = false;
                fetcher_warn!(
                    "Previous run ended without a clean shutdown (last tick at {})",
                    last_tick_sec
                );
            }
        }
    }

    /// Exports run in the background so a slow write never stalls ticking.
    fn spawn_export(&mut self, kind: SnapshotKind) {
        let store = self.store.clone();
        let snapshot = self.state.clone();
        self.exports
            .spawn(async move { store.export(kind, &snapshot).await });
    }

    fn collect_finished_exports(&mut self) {
        while let Some(joined) = self.exports.try_join_next() {
            self.record_export(joined);
        }
    }

    fn record_export(&mut self, joined: Result<Result<String, ExportError>, JoinError>) {
        match joined {
            Ok(Ok(path)) => fetcher_debug!("Export to {} completed", path),
            Ok(Err(err)) => {
                self.failed_exports += 1;
                fetcher_error!(
                    "Export of the {} snapshot failed ({} so far): {}",
                    err.kind(),
                    self.failed_exports,
                    err
                );
            }
            Err(err) => {
                self.failed_exports += 1;
                fetcher_error!("Export task failed: {}", err);
            }
        }
    }
}
