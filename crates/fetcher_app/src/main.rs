mod cli;
mod config;
mod logging;
mod memory;
mod supervisor;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use fetcher_core::{create_init_state, ms_to_sec};
use fetcher_logging::{fetcher_error, fetcher_info};
use fetcher_store::{FsSnapshotStore, StateStore};

use cli::{Cli, Command};
use config::FetcherConfig;
use supervisor::{system_clock, IdleWorker, Supervisor};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = FetcherConfig::load(cli.config.as_deref())?;
    logging::initialize(config.log_destination, config.level_filter()?);
    fetcher_info!(
        "Environment {}, storage {}/{}",
        config.environment,
        config.storage_root.display(),
        config.bucket
    );

    let storage = Arc::new(FsSnapshotStore::new(config.storage_root.clone()));
    let store = Arc::new(StateStore::new(
        storage,
        config.layout(),
        config.export_settings(),
    ));

    match cli.command() {
        Command::Inspect => {
            let clock = system_clock();
            let state = store
                .restore_state(create_init_state(ms_to_sec(clock())))
                .await;
            let json = serde_json::to_string_pretty(&state).context("failed to render state")?;
            println!("{json}");
        }
        Command::Run => {
            let supervisor =
                Supervisor::start(store, IdleWorker, system_clock(), config.tick_interval()).await;
            fetcher_info!(
                "Tracking {} pilots, next export at {}{}",
                supervisor.state().pilots.len(),
                supervisor.state().next_export_sec,
                if supervisor.previous_run_clean() {
                    ""
                } else {
                    " (recovered after an unclean stop)"
                }
            );
            match supervisor.run_until(shutdown_signal()).await {
                Ok(state) => fetcher_info!(
                    "Stopped cleanly after {} ticks",
                    state.num_ticks
                ),
                Err(err) => {
                    fetcher_error!("Shutdown export failed: {}", err);
                    return Err(err.into());
                }
            }
        }
    }
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            fetcher_error!("Failed to listen for Ctrl-C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                fetcher_error!("Failed to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => fetcher_info!("Received Ctrl-C"),
        _ = terminate => fetcher_info!("Received SIGTERM"),
    }
}
