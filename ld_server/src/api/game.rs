//! Game operation handlers.
//!
//! Each endpoint maps one-to-one onto a [`GameEngine`](liars_dice::GameEngine)
//! operation. Player IDs come from the path and are trimmed before use.
//!
//! # Examples
//!
//! ```bash
//! curl -X POST http://localhost:3000/api/v1/game/new/5
//! curl -X POST http://localhost:3000/api/v1/game/join/alice
//! curl -X POST http://localhost:3000/api/v1/game/claim/alice/2/4
//! curl http://localhost:3000/api/v1/game/status
//! ```

use axum::{
    Json,
    extract::{Path, State},
};
use liars_dice::{
    Claim, EngineError, Face, GameSnapshot, PlayerId, ReconcileRequest, RoundOutcome,
    RoundResult, Settlement, SettlementError,
};
use serde::Serialize;

use super::{AppState, errors::ApiError, request_id::RequestId};
use crate::logging::log_game_operation;

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Body for operations that only succeed or fail
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub status: &'static str,
}

const OK: OkResponse = OkResponse { status: "ok" };

#[derive(Debug, Serialize)]
pub struct RollResponse {
    pub player: PlayerId,
    pub dice: Vec<Face>,
}

#[derive(Debug, Serialize)]
pub struct ReconcileResponse {
    #[serde(flatten)]
    pub request: ReconcileRequest,
    pub payout: u64,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub player: PlayerId,
    pub balance: u64,
}

/// Log the outcome and pass it through
fn traced<T>(
    request_id: &RequestId,
    operation: &str,
    player: Option<&PlayerId>,
    result: Result<T, EngineError>,
) -> Result<T, ApiError> {
    let player = player.map(PlayerId::as_str);
    match &result {
        Ok(_) => log_game_operation(operation, player, None),
        Err(err) => {
            tracing::debug!(request_id = %request_id.as_str(), "{} failed: {}", operation, err);
            log_game_operation(operation, player, Some(&err.client_message()));
        }
    }
    result.map_err(ApiError::from)
}

/// `GET /api/v1/game/status`
pub async fn status(State(state): State<AppState>) -> ApiResult<GameSnapshot> {
    Ok(Json(state.engine.status().await?))
}

/// `POST /api/v1/game/new/{ante}`
pub async fn new_game(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(ante): Path<u64>,
) -> Json<GameSnapshot> {
    let snapshot = state.engine.new_game(ante).await;
    tracing::info!(request_id = %request_id.as_str(), game_id = %snapshot.id, ante, "New game");
    Json(snapshot)
}

/// `POST /api/v1/game/join/{id}`
///
/// Funds the player's account with the starting balance the first time the
/// ID is seen.
pub async fn join(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(id): Path<String>,
) -> ApiResult<OkResponse> {
    let player = PlayerId::new(&id);
    let result = state.engine.add_player(&player).await;
    traced(&request_id, "join", Some(&player), result)?;

    match state.ledger.balance(&player).await {
        Ok(_) => {}
        Err(SettlementError::AccountNotFound(_)) => {
            state.ledger.deposit(&player, state.starting_balance).await?;
            tracing::info!(player = %player, amount = state.starting_balance, "Funded new account");
        }
        Err(err) => return Err(err.into()),
    }

    Ok(Json(OK))
}

/// `POST /api/v1/game/leave/{id}`
pub async fn leave(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(id): Path<String>,
) -> ApiResult<OkResponse> {
    let player = PlayerId::new(&id);
    let result = state.engine.remove_player(&player).await;
    traced(&request_id, "leave", Some(&player), result)?;
    Ok(Json(OK))
}

/// `POST /api/v1/game/start`
pub async fn start(State(state): State<AppState>, request_id: RequestId) -> ApiResult<OkResponse> {
    let result = state.engine.start_game().await;
    traced(&request_id, "start", None, result)?;
    Ok(Json(OK))
}

/// `POST /api/v1/game/rolldice/{id}`
pub async fn roll_dice(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(id): Path<String>,
) -> ApiResult<RollResponse> {
    let player = PlayerId::new(&id);
    let result = state.engine.roll_dice(&player).await;
    let dice = traced(&request_id, "rolldice", Some(&player), result)?;
    Ok(Json(RollResponse { player, dice }))
}

/// `POST /api/v1/game/claim/{id}/{number}/{suit}`
pub async fn claim(
    State(state): State<AppState>,
    request_id: RequestId,
    Path((id, number, suit)): Path<(String, u32, Face)>,
) -> ApiResult<Claim> {
    let player = PlayerId::new(&id);
    let result = state.engine.claim(&player, number, suit).await;
    Ok(Json(traced(&request_id, "claim", Some(&player), result)?))
}

/// `POST /api/v1/game/liar/{id}`
pub async fn call_liar(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(id): Path<String>,
) -> ApiResult<RoundOutcome> {
    let player = PlayerId::new(&id);
    let result = state.engine.call_liar(&player).await;
    Ok(Json(traced(&request_id, "callliar", Some(&player), result)?))
}

/// `POST /api/v1/game/newround`
pub async fn new_round(
    State(state): State<AppState>,
    request_id: RequestId,
) -> ApiResult<RoundResult> {
    let result = state.engine.new_round().await;
    Ok(Json(traced(&request_id, "newround", None, result)?))
}

/// `POST /api/v1/game/next`
pub async fn next_turn(
    State(state): State<AppState>,
    request_id: RequestId,
) -> ApiResult<OkResponse> {
    let result = state.engine.next_turn().await;
    traced(&request_id, "nextturn", None, result)?;
    Ok(Json(OK))
}

/// `POST /api/v1/game/out/{id}/{outs}`
pub async fn apply_out(
    State(state): State<AppState>,
    request_id: RequestId,
    Path((id, outs)): Path<(String, u8)>,
) -> ApiResult<OkResponse> {
    let player = PlayerId::new(&id);
    let result = state.engine.apply_out(&player, outs).await;
    traced(&request_id, "outs", Some(&player), result)?;
    Ok(Json(OK))
}

/// `POST /api/v1/game/reconcile/{id}`
///
/// # Errors
///
/// - `400 Bad Request`: Game not over, or caller is not the winner
/// - `502 Bad Gateway`: Settlement failed or timed out
pub async fn reconcile(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(id): Path<String>,
) -> ApiResult<ReconcileResponse> {
    let player = PlayerId::new(&id);
    let result = state.engine.reconcile(&player).await;
    let request = traced(&request_id, "reconcile", Some(&player), result)?;
    let payout = request.payout();
    Ok(Json(ReconcileResponse { request, payout }))
}

/// `GET /api/v1/game/balance/{id}`
pub async fn balance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<BalanceResponse> {
    let player = PlayerId::new(&id);
    let balance = state.engine.player_balance(&player).await?;
    Ok(Json(BalanceResponse { player, balance }))
}
