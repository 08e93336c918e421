//! HTTP/WebSocket API for the liar's dice server.
//!
//! # Endpoints Overview
//!
//! ## Game
//! - `GET  /api/v1/game/status` - Current game snapshot
//! - `POST /api/v1/game/new/{ante}` - Start a fresh game
//! - `POST /api/v1/game/join/{id}` / `leave/{id}` - Lobby membership
//! - `POST /api/v1/game/start` - Leave the lobby and start play
//! - `POST /api/v1/game/rolldice/{id}` - Roll a player's cup
//! - `POST /api/v1/game/claim/{id}/{number}/{suit}` - Make a claim
//! - `POST /api/v1/game/liar/{id}` - Challenge the last claim
//! - `POST /api/v1/game/newround` - Close the round
//! - `POST /api/v1/game/next` - Skip a stalled player
//! - `POST /api/v1/game/out/{id}/{outs}` - Force a player's out count
//! - `POST /api/v1/game/reconcile/{id}` - Settle a finished game
//! - `GET  /api/v1/game/balance/{id}` - Account balance
//!
//! ## WebSocket
//! - `GET /ws/events?subscriber=<id>` - Stream of event tags
//!
//! ## Health Check
//! - `GET /health` - Server health status
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use ld_server::api::{AppState, create_router};
//! use liars_dice::{EngineConfig, EventHub, GameEngine, LedgerSettlement};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EngineConfig::default();
//! let hub = Arc::new(EventHub::new(config.subscriber_capacity));
//! let ledger = Arc::new(LedgerSettlement::new());
//! let engine = Arc::new(GameEngine::new(config, hub, ledger.clone()));
//!
//! let app = create_router(AppState {
//!     engine,
//!     ledger,
//!     starting_balance: 1000,
//! });
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively. In production, configure appropriate
//! origins, methods, and headers.

pub mod errors;
pub mod game;
pub mod request_id;
pub mod websocket;

use axum::{
    Router,
    extract::State,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use liars_dice::{GameEngine, LedgerSettlement};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers and WebSocket connections.
#[derive(Clone)]
pub struct AppState {
    /// The game engine; also owns the event hub
    pub engine: Arc<GameEngine>,
    /// Settlement ledger the engine reconciles against
    pub ledger: Arc<LedgerSettlement>,
    /// Credited to an account the first time it joins
    pub starting_balance: u64,
}

/// Create the complete API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    let root_routes = Router::new()
        .route("/health", get(health_check))
        .route("/ws/events", get(websocket::events_handler));

    Router::new()
        .merge(root_routes)
        .nest("/api/v1/game", create_game_router())
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn create_game_router() -> Router<AppState> {
    Router::new()
        .route("/status", get(game::status))
        .route("/balance/{id}", get(game::balance))
        .route("/new/{ante}", post(game::new_game))
        .route("/join/{id}", post(game::join))
        .route("/leave/{id}", post(game::leave))
        .route("/start", post(game::start))
        .route("/rolldice/{id}", post(game::roll_dice))
        .route("/claim/{id}/{number}/{suit}", post(game::claim))
        .route("/liar/{id}", post(game::call_liar))
        .route("/newround", post(game::new_round))
        .route("/next", post(game::next_turn))
        .route("/out/{id}/{outs}", post(game::apply_out))
        .route("/reconcile/{id}", post(game::reconcile))
}

/// Health check endpoint for monitoring and load balancers.
///
/// # Example
///
/// ```bash
/// curl http://localhost:3000/health
/// # {"status":"healthy","game":"playing","subscribers":2,"timestamp":"2026-10-16T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let game = state
        .engine
        .status()
        .await
        .ok()
        .map(|snapshot| snapshot.status.to_string());
    let hub = state.engine.hub();

    Json(json!({
        "status": if hub.is_shutdown().await { "shutting_down" } else { "healthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "game": game,
        "subscribers": hub.subscriber_count().await,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
