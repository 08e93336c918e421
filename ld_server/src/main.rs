//! Liar's dice server: one shared game behind a REST API and an event stream.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Error;
use ld_server::{api, config::ServerConfig, logging};
use liars_dice::{EventHub, GameEngine, LedgerSettlement};
use log::{error, info};
use pico_args::Arguments;

const HELP: &str = "\
Run a liar's dice server

USAGE:
  ld_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:3000]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  SETTLEMENT_TIMEOUT_SECS  Upper bound on a settlement call [default: 10]
  GAME_FEE                 House fee taken from each settled pot [default: 0]
  SUBSCRIBER_CAPACITY      Events buffered per subscriber [default: 64]
  STARTING_BALANCE         Balance given to a new account on join [default: 1000]
  RUST_LOG                 Log filter [default: info]
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let bind: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;

    logging::init();

    let config = ServerConfig::from_env(bind)?;
    config.validate()?;

    let hub = Arc::new(EventHub::new(config.engine.subscriber_capacity));
    let ledger = Arc::new(LedgerSettlement::new());
    let engine = Arc::new(GameEngine::new(
        config.engine.clone(),
        hub.clone(),
        ledger.clone(),
    ));

    let app = api::create_router(api::AppState {
        engine,
        ledger,
        starting_balance: config.starting_balance,
    });

    info!("Starting HTTP/WebSocket server on {}", config.bind);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(hub))
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Server stopped");

    Ok(())
}

/// Graceful shutdown signal
///
/// Shutting the hub down ends every open event stream so the server can drain.
async fn shutdown_signal(hub: Arc<EventHub>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install CTRL+C signal handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down server...");
    hub.shutdown().await;
}
