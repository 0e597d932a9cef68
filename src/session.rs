//! One hosted match: player slots, turn state and spectators.

use crate::registry::Shared;
use crate::{
    LobbyError, LobbyErrorKind, MoveRejection, Notification, Peer, SpectatorCookie, SpectatorHub,
    lock,
};
use derive_new::new;
use noughts_board::{Board, Mark, Outcome, Position, TurnEngine};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, Weak};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Fewer than two players have joined.
    #[display("waiting for players")]
    WaitingForPlayers,
    /// Both players joined; moves are accepted.
    #[display("in progress")]
    InProgress,
    /// A move ended the match.
    #[display("finished ({})", _0)]
    Finished(Outcome),
    /// The session was killed before it finished.
    #[display("killed")]
    Killed,
}

impl SessionStatus {
    /// Finished or killed.
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Finished(_) | SessionStatus::Killed)
    }
}

/// Response to an accepted move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveReport {
    /// Board after the move.
    pub board: Board,
    /// Session status after the move.
    pub status: SessionStatus,
}

#[derive(Debug, new)]
struct PlayerSlot {
    identity: String,
    peer: Arc<dyn Peer>,
}

#[derive(Debug)]
struct SessionState {
    engine: TurnEngine,
    noughts: Option<PlayerSlot>,
    crosses: Option<PlayerSlot>,
    status: SessionStatus,
}

impl SessionState {
    fn player(&self, mark: Mark) -> Option<&PlayerSlot> {
        match mark {
            Mark::Nought => self.noughts.as_ref(),
            Mark::Cross => self.crosses.as_ref(),
        }
    }

    fn peers(&self) -> Vec<(Mark, Arc<dyn Peer>)> {
        [Mark::Nought, Mark::Cross]
            .into_iter()
            .filter_map(|mark| self.player(mark).map(|p| (mark, Arc::clone(&p.peer))))
            .collect()
    }
}

/// A notification copied out from under the session lock.
type Outbound = (Mark, Arc<dyn Peer>, Notification);

/// A match between two players, with optional spectators.
///
/// All board, turn and slot state sits behind one lock. No remote call is
/// made while that lock is held: notifications are copied out first and sent
/// after it is released.
#[derive(Debug)]
pub struct GameSession {
    name: String,
    serial: u64,
    state: Mutex<SessionState>,
    spectators: SpectatorHub,
    registry: Weak<Shared>,
}

impl GameSession {
    #[instrument(skip(registry, shutdown))]
    pub(crate) fn new(
        name: String,
        serial: u64,
        registry: Weak<Shared>,
        shutdown: CancellationToken,
    ) -> Self {
        info!(session = %name, "Creating new game session");
        Self {
            spectators: SpectatorHub::spawn(name.clone(), shutdown),
            name,
            serial,
            state: Mutex::new(SessionState {
                engine: TurnEngine::new(),
                noughts: None,
                crosses: None,
                status: SessionStatus::WaitingForPlayers,
            }),
            registry,
        }
    }

    /// Session name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of filled player slots (0, 1 or 2).
    pub fn players(&self) -> u8 {
        let state = lock(&self.state);
        u8::from(state.noughts.is_some()) + u8::from(state.crosses.is_some())
    }

    /// Identity of the player holding `mark`, if that slot is filled.
    pub fn player_identity(&self, mark: Mark) -> Option<String> {
        lock(&self.state).player(mark).map(|p| p.identity.clone())
    }

    /// Current status.
    pub fn status(&self) -> SessionStatus {
        lock(&self.state).status
    }

    /// Copy of the current board.
    pub fn board(&self) -> Board {
        *lock(&self.state).engine.board()
    }

    /// The mark to move, only while the session is in progress.
    pub fn whose_turn(&self) -> Option<Mark> {
        let state = lock(&self.state);
        match state.status {
            SessionStatus::InProgress => state.engine.to_move(),
            _ => None,
        }
    }

    /// Spectator slots still receiving events.
    pub fn spectators(&self) -> usize {
        self.spectators.active()
    }

    /// Takes the next free player slot.
    ///
    /// The first joiner plays Nought and waits. The second plays Cross, which
    /// starts the match and tells Nought it is their turn.
    ///
    /// # Errors
    ///
    /// Returns [`LobbyErrorKind::CannotJoin`] once both slots are filled or the
    /// session has ended.
    #[instrument(skip(self, peer), fields(session = %self.name, peer = peer.label()))]
    pub async fn join(
        self: &Arc<Self>,
        identity: String,
        peer: Arc<dyn Peer>,
    ) -> Result<(GameController, Mark), LobbyError> {
        let (mark, outbound) = {
            let mut state = lock(&self.state);
            if state.status != SessionStatus::WaitingForPlayers {
                warn!(status = %state.status, "Join refused");
                return Err(LobbyError::new(LobbyErrorKind::CannotJoin {
                    game: self.name.clone(),
                    reason: state.status,
                }));
            }

            let slot = PlayerSlot::new(identity, peer);
            if state.noughts.is_none() {
                state.noughts = Some(slot);
                (Mark::Nought, None)
            } else {
                state.crosses = Some(slot);
                state.status = SessionStatus::InProgress;
                let your_turn = state.player(Mark::Nought).map(|p| {
                    let note = Notification::YourTurn {
                        game: self.name.clone(),
                        board: *state.engine.board(),
                    };
                    (Mark::Nought, Arc::clone(&p.peer), note)
                });
                (Mark::Cross, your_turn)
            }
        };

        info!(%mark, "Player joined");
        if let Some(outbound) = outbound {
            self.notify_players(vec![outbound]).await;
        }
        Ok((GameController::new(Arc::clone(self), mark), mark))
    }

    /// Plays `mark` at row `x`, column `y`.
    ///
    /// # Errors
    ///
    /// Returns [`LobbyErrorKind::InvalidMove`] if the session is not in
    /// progress, it is not `mark`'s turn, the cell is taken or off the board.
    /// A refused move changes nothing.
    #[instrument(skip(self), fields(session = %self.name))]
    pub async fn play(&self, x: usize, y: usize, mark: Mark) -> Result<MoveReport, LobbyError> {
        let (report, outbound) = {
            let mut state = lock(&self.state);
            if state.status != SessionStatus::InProgress {
                warn!(status = %state.status, "Move refused");
                return Err(LobbyError::new(LobbyErrorKind::InvalidMove(
                    MoveRejection::NotInProgress(state.status),
                )));
            }

            let placement = Position::new(x, y)
                .and_then(|pos| state.engine.place(pos, mark))
                .map_err(|e| {
                    warn!(error = %e, "Move refused");
                    LobbyError::new(LobbyErrorKind::InvalidMove(MoveRejection::Board(e)))
                })?;

            let board = *state.engine.board();
            let outbound: Vec<Outbound> = match placement.outcome() {
                None => {
                    let next = mark.opponent();
                    self.spectators.broadcast(Notification::Update {
                        game: self.name.clone(),
                        board,
                    });
                    state
                        .player(next)
                        .map(|p| {
                            let note = Notification::YourTurn {
                                game: self.name.clone(),
                                board,
                            };
                            (next, Arc::clone(&p.peer), note)
                        })
                        .into_iter()
                        .collect()
                }
                Some(outcome) => {
                    info!(
                        winner = ?outcome.winner(),
                        moves = state.engine.history().len(),
                        "Match over"
                    );
                    state.status = SessionStatus::Finished(outcome);
                    let note = Notification::GameOver {
                        game: self.name.clone(),
                        board,
                        outcome,
                    };
                    self.spectators.broadcast(note.clone());
                    self.spectators.close();
                    state
                        .peers()
                        .into_iter()
                        .map(|(mark, peer)| (mark, peer, note.clone()))
                        .collect()
                }
            };

            let report = MoveReport {
                board,
                status: state.status,
            };
            (report, outbound)
        };

        info!(status = %report.status, "Move accepted");
        if report.status.is_terminal() {
            self.leave_registry();
        }
        self.notify_players(outbound).await;
        Ok(report)
    }

    /// Attaches a spectator and returns its cookie with the current board.
    #[instrument(skip(self, peer), fields(session = %self.name))]
    pub fn watch(&self, peer: Arc<dyn Peer>) -> (SpectatorCookie, Board) {
        // Attach under the session lock so no event is queued between the
        // snapshot and the attach.
        let state = lock(&self.state);
        let cookie = self.spectators.attach(peer);
        (cookie, *state.engine.board())
    }

    /// Detaches a spectator. Unknown or already-retired cookies are ignored.
    #[instrument(skip(self), fields(session = %self.name))]
    pub fn unwatch(&self, cookie: SpectatorCookie) {
        if !self.spectators.retire(cookie) {
            debug!(%cookie, "Unwatch of inactive spectator ignored");
        }
    }

    /// Ends the session without a result.
    ///
    /// Players and spectators are told the game was aborted and the session
    /// leaves the registry. A no-op once the session is finished or killed.
    #[instrument(skip(self), fields(session = %self.name))]
    pub async fn kill(&self) {
        let outbound: Vec<Outbound> = {
            let mut state = lock(&self.state);
            if state.status.is_terminal() {
                debug!(status = %state.status, "Kill ignored");
                return;
            }
            state.status = SessionStatus::Killed;

            let note = Notification::Aborted {
                game: self.name.clone(),
                board: *state.engine.board(),
            };
            self.spectators.broadcast(note.clone());
            self.spectators.close();
            state
                .peers()
                .into_iter()
                .map(|(mark, peer)| (mark, peer, note.clone()))
                .collect()
        };

        info!("Session killed");
        self.leave_registry();
        self.notify_players(outbound).await;
    }

    fn leave_registry(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(&self.name, self.serial);
        }
    }

    /// Sends player notifications. Failures are logged; the session carries
    /// on and waits for the unreachable player's next call.
    async fn notify_players(&self, outbound: Vec<Outbound>) {
        for (mark, peer, note) in outbound {
            match peer.notify(&note).await {
                Ok(()) => debug!(
                    session = %self.name,
                    %mark,
                    event = note.event(),
                    "Player notified"
                ),
                Err(err) => warn!(
                    session = %self.name,
                    %mark,
                    event = note.event(),
                    error = %err.kind,
                    "Player unreachable"
                ),
            }
        }
    }
}

/// A player's handle on a session, bound to the mark they were given.
#[derive(Debug, Clone, new)]
#[new(visibility = "pub(crate)")]
pub struct GameController {
    session: Arc<GameSession>,
    mark: Mark,
}

impl GameController {
    /// The mark this controller plays.
    pub fn mark(&self) -> Mark {
        self.mark
    }

    /// The session being played.
    pub fn session(&self) -> &Arc<GameSession> {
        &self.session
    }

    /// Plays this controller's mark at row `x`, column `y`.
    ///
    /// # Errors
    ///
    /// See [`GameSession::play`].
    pub async fn play(&self, x: usize, y: usize) -> Result<MoveReport, LobbyError> {
        self.session.play(x, y, self.mark).await
    }
}
