use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing_subscriber::filter::LevelFilter;

use homelink::api;
use homelink::api::AppState;
use homelink::backend;
use homelink::backend::ConfigIdentity;
use homelink::config::Config;
use homelink::directory::DeviceCache;
use homelink::directory::DeviceDirectory;
use homelink::session::spawn_probe_loop;
use homelink::session::HubStatus;
use homelink::session::ModeSession;

#[derive(Parser)]
#[command(name = "homelink", about = "Dual-backend smart-home device directory")]
struct Cli {
    /// Path to the configuration file
    #[arg(default_value = "homelink.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::from_file(&cli.config)?;

    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::from(config.logging.level))
        .init();

    tracing::info!("homelink starting");
    tracing::info!("Loaded config from: {}", cli.config.display());

    let backends = backend::build_backends(&config)?;
    let cache = Arc::new(DeviceCache::new());

    let probe_timeout = config
        .hub
        .as_ref()
        .map(|hub| hub.probe_timeout())
        .unwrap_or(Duration::from_secs(2));

    // The probe loop is the single writer of HubStatus. Without a hub pairing
    // the status simply stays Unknown.
    let (probe_handle, status_rx, _status_tx) = match (&backends.hub, &config.hub) {
        (Some(hub), Some(hub_config)) => {
            let handle = spawn_probe_loop(
                Arc::clone(hub),
                hub_config.probe_interval(),
                hub_config.probe_timeout(),
            );
            let status = handle.status();
            (Some(handle), status, None)
        }
        _ => {
            let (tx, rx) = watch::channel(HubStatus::Unknown);
            (None, rx, Some(tx))
        }
    };

    let session = Arc::new(ModeSession::new(
        config.initial_mode(),
        backends.hub.clone(),
        config.cloud_enabled(),
        status_rx,
        Arc::clone(&cache),
        probe_timeout,
    ));

    let directory = Arc::new(DeviceDirectory::new(
        Arc::new(ConfigIdentity::from_config(&config)),
        backends.cloud.clone(),
        backends.hub.clone(),
        backends.overrides,
        cache,
        probe_timeout,
    ));

    tracing::info!(
        "session starting in {} mode ({} users configured)",
        session.mode(),
        config.users.len()
    );

    let state = Arc::new(AppState {
        version: env!("CARGO_PKG_VERSION"),
        session,
        directory,
        probe: probe_handle.as_ref().map(|handle| handle.kicker()),
    });

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let server = tokio::spawn(api::serve(
        config.api.listen.clone(),
        config.api.port,
        state,
        shutdown_rx,
    ));

    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received shutdown signal"),
        Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
    }

    let _ = shutdown_tx.send(());
    if let Some(handle) = probe_handle {
        handle.shutdown().await;
    }
    match server.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!("API server error: {}", e),
        Err(e) => tracing::error!("API server task failed: {}", e),
    }

    tracing::info!("homelink shutdown complete");
    Ok(())
}
