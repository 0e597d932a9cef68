//! Session factory and registry: unique names, snapshot listings, cursors.

use crate::reaper::CursorReaper;
use crate::{
    CursorId, GameSession, ListingCursor, LobbyConfig, LobbyError, LobbyErrorKind, lock,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Human-readable occupancy derived from a session's player count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum Occupancy {
    /// Nobody has joined.
    #[display("No players yet")]
    NoPlayers,
    /// Nought is waiting for an opponent.
    #[display("One player waiting")]
    OneWaiting,
    /// Both slots are filled.
    #[display("Game in progress")]
    InProgress,
}

impl Occupancy {
    /// Maps a player count onto an occupancy.
    pub fn from_players(players: u8) -> Self {
        match players {
            0 => Occupancy::NoPlayers,
            1 => Occupancy::OneWaiting,
            _ => Occupancy::InProgress,
        }
    }
}

/// A listing entry: the session name and a read-only handle on it.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    name: String,
    session: Arc<GameSession>,
}

impl SessionSummary {
    fn new(session: &Arc<GameSession>) -> Self {
        Self {
            name: session.name().to_string(),
            session: Arc::clone(session),
        }
    }

    /// Name at listing time.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The session itself. Its state is live, not part of the snapshot.
    pub fn session(&self) -> &Arc<GameSession> {
        &self.session
    }

    /// Live occupancy of the session.
    pub fn occupancy(&self) -> Occupancy {
        Occupancy::from_players(self.session.players())
    }
}

/// First page of a listing plus, if sessions remain, a cursor over the rest.
#[derive(Debug, Clone)]
pub struct Listing {
    /// Up to `page_size` sessions.
    pub sessions: Vec<SessionSummary>,
    /// Cursor over the remaining sessions.
    pub cursor: Option<Arc<ListingCursor>>,
}

impl Listing {
    /// Whether sessions remain beyond this page.
    pub fn more(&self) -> bool {
        self.cursor.is_some()
    }
}

#[derive(Debug)]
struct SessionEntry {
    serial: u64,
    session: Arc<GameSession>,
}

#[derive(Debug, Default)]
struct RegistryState {
    sessions: HashMap<String, SessionEntry>,
    cursors: HashMap<CursorId, Arc<ListingCursor>>,
    next_serial: u64,
    next_cursor: u64,
}

/// State shared by the registry handle, its sessions, cursors and reaper.
///
/// Sessions, cursors and the reaper hold it weakly.
#[derive(Debug)]
pub(crate) struct Shared {
    state: Mutex<RegistryState>,
    shutdown: CancellationToken,
    reaper: CursorReaper,
}

impl Shared {
    /// Drops `name` if it still refers to the session with `serial`.
    #[instrument(skip(self))]
    pub(crate) fn remove(&self, name: &str, serial: u64) {
        let mut state = lock(&self.state);
        match state.sessions.get(name) {
            Some(entry) if entry.serial == serial => {
                state.sessions.remove(name);
                info!(session = name, live = state.sessions.len(), "Session removed");
            }
            _ => debug!(session = name, "Session already removed"),
        }
    }

    pub(crate) fn forget_cursor(&self, id: CursorId) -> Option<Arc<ListingCursor>> {
        lock(&self.state).cursors.remove(&id)
    }

    /// Reaps every cursor left unused since the previous sweep.
    ///
    /// The registry lock is held only for this pass.
    pub(crate) fn sweep_cursors(&self) -> usize {
        let mut state = lock(&self.state);
        let before = state.cursors.len();
        state.cursors.retain(|id, cursor| {
            let evict = cursor.sweep();
            if evict {
                debug!(cursor = %id, "Reaping idle cursor");
            }
            !evict
        });
        let reaped = before - state.cursors.len();
        if reaped > 0 {
            info!(reaped, remaining = state.cursors.len(), "Idle cursors reaped");
        }
        reaped
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Creates, lists and destroys sessions. Cheap to clone.
///
/// Must be created within a Tokio runtime: it starts the cursor reaper, and
/// every session it creates starts a spectator delivery worker.
#[derive(Debug, Clone)]
pub struct SessionRegistry {
    shared: Arc<Shared>,
}

impl SessionRegistry {
    /// Creates an empty registry and starts its reaper.
    #[instrument(skip(config))]
    pub fn new(config: &LobbyConfig) -> Self {
        let shutdown = CancellationToken::new();
        let period = config.reaper_interval();
        let shared = Arc::new_cyclic(|weak| Shared {
            state: Mutex::new(RegistryState::default()),
            reaper: CursorReaper::spawn(weak.clone(), period, shutdown.child_token()),
            shutdown,
        });
        info!(reaper_period = ?shared.reaper.period(), "Session registry created");
        Self { shared }
    }

    /// Creates a session under a name no live session uses.
    ///
    /// # Errors
    ///
    /// Returns [`LobbyErrorKind::InvalidName`] for a blank name and
    /// [`LobbyErrorKind::NameInUse`] if a live session already has it.
    #[instrument(skip(self))]
    pub fn create(&self, name: &str) -> Result<Arc<GameSession>, LobbyError> {
        if name.trim().is_empty() {
            warn!("Blank game name refused");
            return Err(LobbyError::new(LobbyErrorKind::InvalidName(name.to_string())));
        }

        let mut state = lock(&self.shared.state);
        if state.sessions.contains_key(name) {
            warn!(session = name, "Game name already in use");
            return Err(LobbyError::new(LobbyErrorKind::NameInUse(name.to_string())));
        }

        let serial = state.next_serial;
        state.next_serial += 1;
        let session = Arc::new(GameSession::new(
            name.to_string(),
            serial,
            Arc::downgrade(&self.shared),
            self.shared.shutdown.child_token(),
        ));
        state.sessions.insert(
            name.to_string(),
            SessionEntry {
                serial,
                session: Arc::clone(&session),
            },
        );

        info!(session = name, live = state.sessions.len(), "Created new session");
        Ok(session)
    }

    /// Live session by name.
    pub fn get(&self, name: &str) -> Option<Arc<GameSession>> {
        lock(&self.shared.state)
            .sessions
            .get(name)
            .map(|entry| Arc::clone(&entry.session))
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        lock(&self.shared.state).sessions.len()
    }

    /// No live sessions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of cursors not yet closed or reaped.
    pub fn cursor_count(&self) -> usize {
        lock(&self.shared.state).cursors.len()
    }

    /// Snapshots the live sessions in creation order.
    ///
    /// The first `page_size` come back directly; a cursor covers the rest.
    /// `page_size = 0` returns everything through the cursor.
    #[instrument(skip(self))]
    pub fn list(&self, page_size: usize) -> Listing {
        let mut state = lock(&self.shared.state);

        let mut entries: Vec<&SessionEntry> = state.sessions.values().collect();
        entries.sort_by_key(|entry| entry.serial);
        let mut sessions: Vec<SessionSummary> =
            entries.into_iter().map(|entry| SessionSummary::new(&entry.session)).collect();
        let rest = sessions.split_off(page_size.min(sessions.len()));

        let cursor = if rest.is_empty() {
            None
        } else {
            let id = CursorId::new(state.next_cursor);
            state.next_cursor += 1;
            let cursor = Arc::new(ListingCursor::new(id, rest, Arc::downgrade(&self.shared)));
            state.cursors.insert(id, Arc::clone(&cursor));
            Some(cursor)
        };

        info!(
            returned = sessions.len(),
            cursor = ?cursor.as_ref().map(|c| c.id()),
            "Listed sessions"
        );
        Listing { sessions, cursor }
    }

    /// Cursor by id.
    ///
    /// # Errors
    ///
    /// Returns [`LobbyErrorKind::CursorExpired`] once it was closed or reaped.
    #[instrument(skip(self))]
    pub fn cursor(&self, id: CursorId) -> Result<Arc<ListingCursor>, LobbyError> {
        lock(&self.shared.state)
            .cursors
            .get(&id)
            .cloned()
            .ok_or_else(|| LobbyError::new(LobbyErrorKind::CursorExpired(id)))
    }

    /// Closes a cursor. Unknown ids are ignored.
    #[instrument(skip(self))]
    pub fn close_cursor(&self, id: CursorId) {
        match self.shared.forget_cursor(id) {
            Some(cursor) => cursor.expire(),
            None => debug!(cursor = %id, "Close of unknown cursor ignored"),
        }
    }

    /// Runs one reaper pass now. Returns how many cursors were reaped.
    pub fn sweep_cursors(&self) -> usize {
        self.shared.sweep_cursors()
    }

    /// Stops the reaper and every spectator delivery worker.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) {
        self.shared.shutdown.cancel();
        self.shared.reaper.join().await;
        info!("Session registry shut down");
    }
}
