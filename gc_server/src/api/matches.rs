//! Match API handlers.
//!
//! This module provides HTTP REST endpoints for match operations including:
//! - Listing waiting and started matches, page by page
//! - Reading a match's public detail and its move history
//! - Creating, joining and starting matches
//! - Submitting turns
//!
//! Reads are public; every mutation requires a JWT bearer token and acts as
//! the player named in it.
//!
//! # Examples
//!
//! Create a 7x6 connect-four match:
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/matches \
//!   -H "Authorization: Bearer TOKEN" \
//!   -H "Content-Type: application/json" \
//!   -d '{"width": 7, "height": 6, "win_threshold": 4, "color": "#ff0000"}'
//! ```
//!
//! Place a stone:
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/matches/1/turns \
//!   -H "Authorization: Bearer TOKEN" \
//!   -H "Content-Type: application/json" \
//!   -d '{"row": 5, "col": 3}'
//! ```

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
};
use grid_connect::game::{
    Color, HistorySuffix, MatchError, MatchId, MatchState, MatchSummary, MatchView, PlayerId,
    SeatView, TurnOutcome,
};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::logging::log_match_error;

#[derive(Debug, Deserialize)]
pub struct CreateMatchRequest {
    pub width: usize,
    pub height: usize,
    pub win_threshold: usize,
    pub color: Color,
}

#[derive(Debug, Deserialize)]
pub struct JoinMatchRequest {
    pub color: Color,
}

#[derive(Debug, Deserialize)]
pub struct SubmitTurnRequest {
    pub row: i64,
    pub col: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
    pub count: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub from: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StartMatchResponse {
    pub id: MatchId,
    pub seats: Vec<SeatView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// HTTP status for each rejection kind
pub fn status_for(err: &MatchError) -> StatusCode {
    match err {
        MatchError::InvalidConfig(_) => StatusCode::UNPROCESSABLE_ENTITY,
        MatchError::OutOfBounds | MatchError::OutOfRange(_) => StatusCode::BAD_REQUEST,
        MatchError::NotOwner | MatchError::NotYourTurn => StatusCode::FORBIDDEN,
        MatchError::NotFound(_) => StatusCode::NOT_FOUND,
        MatchError::AlreadyStarted
        | MatchError::ColorTaken
        | MatchError::AlreadyInAnotherActiveMatch
        | MatchError::AlreadyJoined
        | MatchError::MatchFull
        | MatchError::NotStarted
        | MatchError::AlreadyFinished
        | MatchError::CellOccupied => StatusCode::CONFLICT,
        MatchError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        MatchError::ActorUnavailable => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn reject(operation: &str, player: Option<PlayerId>, err: MatchError) -> ApiError {
    let status = status_for(&err);
    log_match_error(
        operation,
        player,
        err.code(),
        &err.to_string(),
        status.is_server_error(),
    );
    (
        status,
        Json(ErrorResponse {
            error: err.code().to_string(),
            message: err.client_message(),
        }),
    )
}

/// List matches waiting for players.
///
/// # Query Parameters
///
/// - `page`: 1-based page number (default 1)
/// - `count`: Page size, clamped to 1..=100 (default 10)
///
/// # Response
///
/// Returns `200 OK` with match summaries, oldest first:
/// ```json
/// [
///   {
///     "id": 1,
///     "width": 7,
///     "height": 6,
///     "win_threshold": 4,
///     "owner": 17,
///     "created_at": "2025-11-22T10:30:00Z"
///   }
/// ]
/// ```
pub async fn list_waiting(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<MatchSummary>>, ApiError> {
    list(state, MatchState::Waiting, query).await
}

/// List matches in progress. Same parameters and shape as [`list_waiting`].
pub async fn list_started(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<MatchSummary>>, ApiError> {
    list(state, MatchState::Started, query).await
}

async fn list(
    state: AppState,
    match_state: MatchState,
    query: PageQuery,
) -> Result<Json<Vec<MatchSummary>>, ApiError> {
    state
        .manager
        .list_matches(match_state, query.page, query.count)
        .await
        .map(Json)
        .map_err(|e| reject("list", None, e))
}

/// Get the public detail of a match.
///
/// Players are listed by id before the start and in seat order afterwards.
///
/// # Errors
///
/// - `404 Not Found`: Match doesn't exist
pub async fn get_match(
    State(state): State<AppState>,
    Path(match_id): Path<MatchId>,
) -> Result<Json<MatchView>, ApiError> {
    state
        .manager
        .match_view(match_id)
        .await
        .map(Json)
        .map_err(|e| reject("view", None, e))
}

/// Get the moves played from index `from` onward, plus the conclusion.
///
/// # Errors
///
/// - `400 Bad Request`: Negative `from`
/// - `404 Not Found`: Match doesn't exist
pub async fn get_history(
    State(state): State<AppState>,
    Path(match_id): Path<MatchId>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistorySuffix>, ApiError> {
    state
        .manager
        .history(match_id, query.from.unwrap_or(0))
        .await
        .map(Json)
        .map_err(|e| reject("history", None, e))
}

/// Create a match owned by the authenticated player.
///
/// # Request Body
///
/// ```json
/// {"width": 7, "height": 6, "win_threshold": 4, "color": "#ff0000"}
/// ```
///
/// # Response
///
/// Returns `201 Created` with the new match's detail.
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid authentication token
/// - `409 Conflict`: Player is already in another active match
/// - `422 Unprocessable Entity`: Invalid geometry or color
pub async fn create_match(
    State(state): State<AppState>,
    Extension(player): Extension<PlayerId>,
    Json(request): Json<CreateMatchRequest>,
) -> Result<(StatusCode, Json<MatchView>), ApiError> {
    let reject = |e| reject("create", Some(player), e);

    let match_id = state
        .manager
        .create_match(
            player,
            request.width,
            request.height,
            request.win_threshold,
            request.color,
        )
        .await
        .map_err(reject)?;
    let view = state.manager.match_view(match_id).await.map_err(reject)?;

    Ok((StatusCode::CREATED, Json(view)))
}

/// Join a waiting match with a color no one else has taken.
///
/// # Request Body
///
/// ```json
/// {"color": "#00ff00"}
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid authentication token
/// - `404 Not Found`: Match doesn't exist
/// - `409 Conflict`: Already started, color taken, already joined, match
///   full, or player active in another match
pub async fn join_match(
    State(state): State<AppState>,
    Extension(player): Extension<PlayerId>,
    Path(match_id): Path<MatchId>,
    Json(request): Json<JoinMatchRequest>,
) -> Result<Json<MatchView>, ApiError> {
    let reject = |e| reject("join", Some(player), e);

    state
        .manager
        .join_match(match_id, player, request.color)
        .await
        .map_err(reject)?;
    let view = state.manager.match_view(match_id).await.map_err(reject)?;

    Ok(Json(view))
}

/// Start a match; only its owner may do so.
///
/// # Response
///
/// Returns `200 OK` with the randomized seat order:
/// ```json
/// {"id": 1, "seats": [{"player": 9, "color": "#00ff00", "seat": 0}]}
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: Requester is not the owner
/// - `409 Conflict`: Match already started
pub async fn start_match(
    State(state): State<AppState>,
    Extension(player): Extension<PlayerId>,
    Path(match_id): Path<MatchId>,
) -> Result<Json<StartMatchResponse>, ApiError> {
    let order = state
        .manager
        .start_match(match_id, player)
        .await
        .map_err(|e| reject("start", Some(player), e))?;

    let seats = order
        .players()
        .iter()
        .zip(order.colors().as_slice())
        .enumerate()
        .map(|(seat, (&player, &color))| SeatView {
            player,
            color,
            seat: Some(seat),
        })
        .collect();

    Ok(Json(StartMatchResponse {
        id: match_id,
        seats,
    }))
}

/// Place a stone for the authenticated player.
///
/// # Request Body
///
/// ```json
/// {"row": 2, "col": 3}
/// ```
///
/// # Response
///
/// Returns `200 OK` with the accepted cell, the seat that played it and,
/// when this move ended the match, its conclusion.
///
/// # Errors
///
/// - `400 Bad Request`: Cell outside the board
/// - `403 Forbidden`: Not your turn
/// - `409 Conflict`: Match not started, already finished, or cell occupied
pub async fn submit_turn(
    State(state): State<AppState>,
    Extension(player): Extension<PlayerId>,
    Path(match_id): Path<MatchId>,
    Json(request): Json<SubmitTurnRequest>,
) -> Result<Json<TurnOutcome>, ApiError> {
    state
        .manager
        .submit_turn(match_id, player, request.row, request.col)
        .await
        .map(Json)
        .map_err(|e| reject("turn", Some(player), e))
}
