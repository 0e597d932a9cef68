//! Noughts Lobby - hosts many concurrent noughts-and-crosses games.
//!
//! # Architecture
//!
//! - **Registry**: creates and destroys sessions by unique name, hands out
//!   paginated listings and owns the cursor reaper
//! - **Cursor**: resumable listing over a snapshot; idle cursors are reaped
//! - **Session**: one match, its two player slots and its spectators
//! - **Spectators**: queued fan-out that retires unreachable observers
//! - **Server**: JSON over HTTP transport for all of the above
//!
//! # Example
//!
//! ```no_run
//! use noughts_lobby::{LobbyConfig, SessionRegistry};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let registry = SessionRegistry::new(&LobbyConfig::default());
//! registry.create("friday")?;
//!
//! let listing = registry.list(10);
//! assert_eq!(listing.sessions.len(), 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod config;
mod cursor;
mod error;
mod peer;
mod reaper;
mod registry;
mod server;
mod session;
mod spectator;

pub use client::LobbyClient;
pub use config::{ConfigError, LobbyConfig};
pub use cursor::{CursorId, CursorPage, ListingCursor};
pub use error::{LobbyError, LobbyErrorKind, MoveRejection};
pub use peer::{HttpPeer, Notification, Peer};
pub use registry::{Listing, Occupancy, SessionRegistry, SessionSummary};
pub use server::{
    AppState, CreateGameRequest, CursorPageResponse, GameDetails, JoinRequest, JoinResponse,
    ListingResponse, MoveRequest, SessionInfo, WatchRequest, WatchResponse, router,
};
pub use session::{GameController, GameSession, MoveReport, SessionStatus};
pub use spectator::{SpectatorCookie, SpectatorHub};

pub use noughts_board::{Board, Cell, Mark, Outcome, Position};

/// Locks a mutex, recovering the guard if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &std::sync::Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
