//! Command-line client for a running lobby.

use crate::{
    CreateGameRequest, CursorPageResponse, GameDetails, ListingResponse, SessionInfo,
};
use anyhow::{Context, Result, bail};
use tracing::{debug, info, instrument, warn};

/// HTTP client for the lobby API.
#[derive(Debug, Clone)]
pub struct LobbyClient {
    base_url: String,
    client: reqwest::Client,
}

impl LobbyClient {
    /// Creates a client for the lobby at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Creates a game.
    #[instrument(skip(self))]
    pub async fn create(&self, name: &str) -> Result<GameDetails> {
        if name.trim().is_empty() {
            bail!("You must give a non-empty name");
        }
        let response = self
            .client
            .post(format!("{}/games", self.base_url))
            .json(&CreateGameRequest {
                name: name.to_string(),
            })
            .send()
            .await
            .context("Failed to reach lobby")?;
        let details = Self::decode(response).await?;
        info!(game = name, "Game created");
        Ok(details)
    }

    /// Fetches the full listing.
    ///
    /// Asks for an empty first page, drains the cursor one entry at a time,
    /// then closes it.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<SessionInfo>> {
        let first: ListingResponse = Self::decode(
            self.client
                .get(format!("{}/games?page_size=0", self.base_url))
                .send()
                .await
                .context("Failed to reach lobby")?,
        )
        .await?;

        if !first.sessions.is_empty() {
            warn!(count = first.sessions.len(), "Lobby returned a non-empty first page");
        }
        let mut sessions = first.sessions;
        let Some(cursor) = first.cursor else {
            debug!("No games in the lobby");
            return Ok(sessions);
        };

        let mut more = true;
        while more {
            let page: CursorPageResponse = Self::decode(
                self.client
                    .get(format!("{}/cursors/{}?n=1", self.base_url, cursor))
                    .send()
                    .await
                    .context("Failed to reach lobby cursor")?,
            )
            .await?;
            sessions.extend(page.sessions);
            more = page.more;
        }

        self.client
            .delete(format!("{}/cursors/{}", self.base_url, cursor))
            .send()
            .await
            .context("Failed to close lobby cursor")?;
        Ok(sessions)
    }

    /// Fetches one game.
    #[instrument(skip(self))]
    pub async fn info(&self, name: &str) -> Result<GameDetails> {
        let response = self
            .client
            .get(format!("{}/games/{}", self.base_url, name))
            .send()
            .await
            .context("Failed to reach lobby")?;
        Self::decode(response).await
    }

    /// Kills a game. Killing an unknown game is not an error.
    #[instrument(skip(self))]
    pub async fn kill(&self, name: &str) -> Result<()> {
        let response = self
            .client
            .delete(format!("{}/games/{}", self.base_url, name))
            .send()
            .await
            .context("Failed to reach lobby")?;
        response.error_for_status().context("Kill refused")?;
        info!(game = name, "Game killed");
        Ok(())
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body: serde_json::Value = response.json().await.unwrap_or_default();
            let message = body["error"].as_str().unwrap_or("no details").to_string();
            bail!("Lobby answered {}: {}", status, message);
        }
        response.json().await.context("Malformed lobby response")
    }
}
