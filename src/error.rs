//! Error types for the lobby core.

use crate::{CursorId, SessionStatus};
use derive_more::{Display, Error};
use noughts_board::MoveError;
use tracing::instrument;

/// Why a move was refused.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum MoveRejection {
    /// The session is not accepting moves (waiting, finished or killed).
    #[display("game is {}", _0)]
    NotInProgress(SessionStatus),
    /// The board refused the placement.
    #[display("{}", _0)]
    Board(MoveError),
}

/// The failure taxonomy of the lobby.
///
/// Everything except [`LobbyErrorKind::PeerUnreachable`] is returned to the
/// caller that triggered it and leaves state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum LobbyErrorKind {
    /// A live session already uses this name.
    #[display("game name '{}' is already in use", _0)]
    NameInUse(String),

    /// Session names must be non-empty.
    #[display("invalid game name '{}'", _0)]
    InvalidName(String),

    /// The session has two players or is no longer joinable.
    #[display("cannot join game '{}': {}", game, reason)]
    CannotJoin {
        /// Session name.
        game: String,
        /// Status that refused the join.
        reason: SessionStatus,
    },

    /// Wrong turn, occupied cell, or session not in progress.
    #[display("invalid move: {}", _0)]
    InvalidMove(MoveRejection),

    /// The cursor was closed or reaped.
    #[display("cursor {} not found", _0)]
    CursorExpired(CursorId),

    /// No live session with this name.
    #[display("game '{}' not found", _0)]
    NotFound(String),

    /// A remote player or spectator could not be reached.
    #[display("peer {} unreachable: {}", peer, reason)]
    PeerUnreachable {
        /// Peer label, usually its callback address.
        peer: String,
        /// Transport-level cause.
        reason: String,
    },
}

/// Lobby error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("{} at {}:{}", kind, file, line)]
pub struct LobbyError {
    /// What went wrong.
    pub kind: LobbyErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl LobbyError {
    /// Creates a new lobby error with caller location tracking.
    #[track_caller]
    #[instrument(skip(kind))]
    pub fn new(kind: LobbyErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> &LobbyErrorKind {
        &self.kind
    }
}
