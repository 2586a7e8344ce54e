#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Lets Dance server entrypoint (systemd-friendly).
//! Wires the store, scheduler and gossip together and serves until SIGINT.

use std::sync::Arc;

use tracing::{info, warn};

use lets_dance::core::crypto::ProtocolKeyPolicy;
use lets_dance::core::store::BoardStore;
use lets_dance::core::timecodec::SystemClock;
use lets_dance::core::types::Settings;
use lets_dance::http::handlers::AppState;
use lets_dance::http::{Server, ServerConfig};
use lets_dance::monitoring::metrics::Metrics;
use lets_dance::networking::client::PeerClient;
use lets_dance::networking::peers::sync_peer_file;
use lets_dance::scheduler::Scheduler;
use lets_dance::tasks::{schedule_board_expiry, Gossip};

/// Concurrent background jobs (gossip fan-out + maintenance).
const SCHEDULER_WORKERS: usize = 10;

#[tokio::main]
async fn main() {
    let _ = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .compact()
        .try_init();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("configuration error: {e}");
            std::process::exit(1);
        }
    };
    if settings.debug {
        warn!("running in debug mode; set DEBUG=false in production");
    }

    let store = match BoardStore::open(&settings.data_dir) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("store open failed: {e}");
            std::process::exit(1);
        }
    };

    let metrics: Arc<Metrics> = Arc::new(Metrics::new().expect("metrics init failed"));
    metrics.boards_stored.set(store.count() as i64);

    let client = PeerClient::new().expect("http client init failed");
    let clock = Arc::new(SystemClock);

    let scheduler = Scheduler::new(SCHEDULER_WORKERS);
    scheduler.start();
    schedule_board_expiry(
        &scheduler,
        store.clone(),
        clock.clone(),
        Arc::clone(&metrics),
    );

    // Peer roster: explicit path, or <data_dir>/peers.toml when present.
    let roster = settings
        .peer_file
        .clone()
        .or_else(|| {
            let fallback = std::path::Path::new(&settings.data_dir).join("peers.toml");
            fallback.exists().then_some(fallback)
        });
    if let Some(path) = roster {
        if let Err(e) = sync_peer_file(&store, &path) {
            warn!(roster = %path.display(), error = %e, "peer roster not loaded");
        }
    }

    let gossip = Gossip::new(
        store.clone(),
        scheduler.clone(),
        client,
        Arc::clone(&metrics),
    );

    let state = AppState {
        store,
        gossip,
        clock,
        key_policy: Arc::new(ProtocolKeyPolicy),
        metrics,
    };

    info!(listen = %settings.listen_addr, data_dir = %settings.data_dir, "lets-dance starting");

    let server = Server::new(ServerConfig {
        listen_addr: settings.listen_addr,
    });
    let (ready_tx, ready_rx) = tokio::sync::oneshot::channel();
    let serve = tokio::spawn(server.run(state, ready_tx));

    if let Ok(addr) = ready_rx.await {
        info!(%addr, "accepting connections");
    }

    match serve.await {
        Ok(Ok(())) => info!("server stopped"),
        Ok(Err(e)) => {
            eprintln!("server failed: {e}");
            scheduler.stop();
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("server task failed: {e}");
            scheduler.stop();
            std::process::exit(1);
        }
    }
    scheduler.stop();
}
