//! JSON-over-HTTP transport for the lobby.
//!
//! Each route is a thin shim over a registry, session or cursor operation;
//! every [`LobbyErrorKind`] maps to exactly one status code.

use crate::{
    CursorId, GameSession, HttpPeer, LobbyError, LobbyErrorKind, MoveReport, Occupancy,
    SessionRegistry, SessionStatus, SessionSummary, SpectatorCookie,
};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use noughts_board::{Board, Mark};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Request for creating a game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGameRequest {
    /// Unique name for the new game.
    pub name: String,
}

/// Request for joining a game as a player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequest {
    /// Player identity, used in logs.
    pub identity: String,
    /// Where turn and end-of-game notifications are posted.
    pub callback_url: String,
}

/// Mark assigned to a joining player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinResponse {
    /// Session name.
    pub game: String,
    /// Assigned mark; Nought for the first joiner, Cross for the second.
    pub mark: Mark,
}

/// Request for making a move.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Mark of the player moving.
    pub mark: Mark,
    /// Row, 0-2.
    pub x: usize,
    /// Column, 0-2.
    pub y: usize,
}

/// Request for watching a game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchRequest {
    /// Where game events are posted.
    pub callback_url: String,
}

/// Spectator slot and the board at attach time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchResponse {
    /// Pass back to stop watching.
    pub cookie: SpectatorCookie,
    /// Board when the spectator attached.
    pub board: Board,
}

/// A session as it appears in listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Session name.
    pub name: String,
    /// Filled player slots.
    pub players: u8,
    /// Occupancy derived from `players`.
    pub occupancy: Occupancy,
}

impl From<&SessionSummary> for SessionInfo {
    fn from(summary: &SessionSummary) -> Self {
        let players = summary.session().players();
        Self {
            name: summary.name().to_string(),
            players,
            occupancy: Occupancy::from_players(players),
        }
    }
}

/// First page of a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingResponse {
    /// Sessions in this page.
    pub sessions: Vec<SessionInfo>,
    /// Cursor over the rest, if any remain.
    pub cursor: Option<CursorId>,
    /// Whether the cursor holds more sessions.
    pub more: bool,
}

/// A page drawn from a cursor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CursorPageResponse {
    /// Sessions in this page.
    pub sessions: Vec<SessionInfo>,
    /// Whether the cursor holds more sessions.
    pub more: bool,
}

/// Full view of one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameDetails {
    /// Session name.
    pub name: String,
    /// Filled player slots.
    pub players: u8,
    /// Occupancy derived from `players`.
    pub occupancy: Occupancy,
    /// Lifecycle status.
    pub status: SessionStatus,
    /// Current board.
    pub board: Board,
    /// Mark to move, while in progress.
    pub whose_turn: Option<Mark>,
    /// Active spectators.
    pub spectators: usize,
}

impl From<&GameSession> for GameDetails {
    fn from(session: &GameSession) -> Self {
        let players = session.players();
        Self {
            name: session.name().to_string(),
            players,
            occupancy: Occupancy::from_players(players),
            status: session.status(),
            board: session.board(),
            whose_turn: session.whose_turn(),
            spectators: session.spectators(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for LobbyError {
    fn into_response(self) -> Response {
        let status = match self.kind {
            LobbyErrorKind::NameInUse(_) | LobbyErrorKind::CannotJoin { .. } => {
                StatusCode::CONFLICT
            }
            LobbyErrorKind::InvalidName(_) => StatusCode::BAD_REQUEST,
            LobbyErrorKind::InvalidMove(_) => StatusCode::UNPROCESSABLE_ENTITY,
            LobbyErrorKind::CursorExpired(_) => StatusCode::GONE,
            LobbyErrorKind::NotFound(_) => StatusCode::NOT_FOUND,
            LobbyErrorKind::PeerUnreachable { .. } => StatusCode::BAD_GATEWAY,
        };
        debug!(%status, error = %self.kind, "Request failed");
        (status, Json(ErrorBody { error: self.kind.to_string() })).into_response()
    }
}

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    registry: SessionRegistry,
    http: reqwest::Client,
    default_page_size: usize,
}

impl AppState {
    /// Bundles the registry with the client used to reach peers.
    pub fn new(registry: SessionRegistry, http: reqwest::Client, default_page_size: usize) -> Self {
        Self {
            registry,
            http,
            default_page_size,
        }
    }

    fn find(&self, name: &str) -> Result<Arc<GameSession>, LobbyError> {
        self.registry
            .get(name)
            .ok_or_else(|| LobbyError::new(LobbyErrorKind::NotFound(name.to_string())))
    }
}

/// Builds the lobby routes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/games", post(create_game).get(list_games))
        .route("/games/{name}", get(game_details).delete(kill_game))
        .route("/games/{name}/players", post(join_game))
        .route("/games/{name}/moves", post(play_move))
        .route("/games/{name}/spectators", post(watch_game))
        .route("/games/{name}/spectators/{cookie}", delete(unwatch_game))
        .route("/cursors/{id}", get(next_page).delete(close_cursor))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    page_size: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct NextQuery {
    n: Option<usize>,
}

#[instrument(skip(app))]
async fn create_game(
    State(app): State<AppState>,
    Json(req): Json<CreateGameRequest>,
) -> Result<(StatusCode, Json<GameDetails>), LobbyError> {
    let session = app.registry.create(&req.name)?;
    Ok((StatusCode::CREATED, Json(GameDetails::from(session.as_ref()))))
}

#[instrument(skip(app))]
async fn list_games(
    State(app): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<ListingResponse> {
    let listing = app.registry.list(query.page_size.unwrap_or(app.default_page_size));
    Json(ListingResponse {
        sessions: listing.sessions.iter().map(SessionInfo::from).collect(),
        more: listing.more(),
        cursor: listing.cursor.map(|cursor| cursor.id()),
    })
}

#[instrument(skip(app))]
async fn next_page(
    State(app): State<AppState>,
    Path(id): Path<u64>,
    Query(query): Query<NextQuery>,
) -> Result<Json<CursorPageResponse>, LobbyError> {
    let page = app
        .registry
        .cursor(CursorId::new(id))?
        .next(query.n.unwrap_or(app.default_page_size))?;
    Ok(Json(CursorPageResponse {
        sessions: page.sessions.iter().map(SessionInfo::from).collect(),
        more: page.more,
    }))
}

#[instrument(skip(app))]
async fn close_cursor(State(app): State<AppState>, Path(id): Path<u64>) -> StatusCode {
    app.registry.close_cursor(CursorId::new(id));
    StatusCode::NO_CONTENT
}

#[instrument(skip(app))]
async fn game_details(
    State(app): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<GameDetails>, LobbyError> {
    let session = app.find(&name)?;
    Ok(Json(GameDetails::from(session.as_ref())))
}

#[instrument(skip(app))]
async fn join_game(
    State(app): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<JoinRequest>,
) -> Result<Json<JoinResponse>, LobbyError> {
    let session = app.find(&name)?;
    let peer = Arc::new(HttpPeer::new(app.http.clone(), req.callback_url));
    let (_controller, mark) = session.join(req.identity, peer).await?;
    Ok(Json(JoinResponse { game: name, mark }))
}

#[instrument(skip(app))]
async fn play_move(
    State(app): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<MoveReport>, LobbyError> {
    let session = app.find(&name)?;
    let report = session.play(req.x, req.y, req.mark).await?;
    Ok(Json(report))
}

#[instrument(skip(app))]
async fn watch_game(
    State(app): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<WatchRequest>,
) -> Result<(StatusCode, Json<WatchResponse>), LobbyError> {
    let session = app.find(&name)?;
    let peer = Arc::new(HttpPeer::new(app.http.clone(), req.callback_url));
    let (cookie, board) = session.watch(peer);
    Ok((StatusCode::CREATED, Json(WatchResponse { cookie, board })))
}

#[instrument(skip(app))]
async fn unwatch_game(
    State(app): State<AppState>,
    Path((name, cookie)): Path<(String, usize)>,
) -> StatusCode {
    if let Some(session) = app.registry.get(&name) {
        session.unwatch(SpectatorCookie::new(cookie));
    }
    StatusCode::NO_CONTENT
}

#[instrument(skip(app))]
async fn kill_game(State(app): State<AppState>, Path(name): Path<String>) -> StatusCode {
    match app.registry.get(&name) {
        Some(session) => {
            session.kill().await;
            info!(session = %name, "Game killed on request");
        }
        None => debug!(session = %name, "Kill of unknown game ignored"),
    }
    StatusCode::NO_CONTENT
}
