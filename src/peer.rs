//! Remote collaborators: players and spectators reached through callbacks.
//!
//! The lobby never talks to a client directly. Every outbound message goes
//! through a [`Peer`], and a failed delivery surfaces as
//! [`LobbyErrorKind::PeerUnreachable`].

use crate::{LobbyError, LobbyErrorKind};
use async_trait::async_trait;
use noughts_board::{Board, Outcome};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// A message pushed to a player or spectator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Notification {
    /// Sent to the player whose turn just began.
    YourTurn {
        /// Session name.
        game: String,
        /// Board after the opponent's move.
        board: Board,
    },
    /// Sent to spectators after a move that did not end the match.
    Update {
        /// Session name.
        game: String,
        /// Board after the move.
        board: Board,
    },
    /// Sent to players and spectators when a move ended the match.
    GameOver {
        /// Session name.
        game: String,
        /// Final board.
        board: Board,
        /// How it ended.
        outcome: Outcome,
    },
    /// Sent to players and spectators when the session was killed.
    Aborted {
        /// Session name.
        game: String,
        /// Board at the time of the kill.
        board: Board,
    },
}

impl Notification {
    /// Short event name for logs.
    pub fn event(&self) -> &'static str {
        match self {
            Notification::YourTurn { .. } => "your_turn",
            Notification::Update { .. } => "update",
            Notification::GameOver { .. } => "game_over",
            Notification::Aborted { .. } => "aborted",
        }
    }
}

/// Something the lobby can push notifications to.
#[async_trait]
pub trait Peer: Send + Sync + std::fmt::Debug {
    /// Human-readable label used in logs and errors.
    fn label(&self) -> &str;

    /// Delivers one notification.
    ///
    /// # Errors
    ///
    /// Returns [`LobbyErrorKind::PeerUnreachable`] when the peer cannot be
    /// reached or refuses the delivery.
    async fn notify(&self, notification: &Notification) -> Result<(), LobbyError>;
}

/// A peer reached by `POST`ing JSON to a callback URL.
#[derive(Debug, Clone)]
pub struct HttpPeer {
    client: reqwest::Client,
    url: String,
}

impl HttpPeer {
    /// Builds the shared HTTP client, bounding every delivery by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns the underlying `reqwest` error if the client cannot be built.
    #[instrument]
    pub fn client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder().timeout(timeout).build()
    }

    /// Creates a peer for `url` using a shared client.
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    #[track_caller]
    fn unreachable(&self, reason: String) -> LobbyError {
        LobbyError::new(LobbyErrorKind::PeerUnreachable {
            peer: self.url.clone(),
            reason,
        })
    }
}

#[async_trait]
impl Peer for HttpPeer {
    fn label(&self) -> &str {
        &self.url
    }

    #[instrument(skip(self, notification), fields(peer = %self.url, event = notification.event()))]
    async fn notify(&self, notification: &Notification) -> Result<(), LobbyError> {
        let response = self
            .client
            .post(&self.url)
            .json(notification)
            .send()
            .await
            .map_err(|e| self.unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.unreachable(format!("callback answered {}", status)));
        }

        debug!(%status, "Notification delivered");
        Ok(())
    }
}
