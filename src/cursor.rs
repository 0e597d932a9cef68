//! Resumable enumeration over a snapshot of sessions.

use crate::registry::Shared;
use crate::{LobbyError, LobbyErrorKind, SessionSummary, lock};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Mutex, Weak};
use tracing::{debug, instrument, warn};

/// Identifies a listing cursor.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(transparent)]
pub struct CursorId(u64);

impl CursorId {
    /// Wraps a raw id.
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

/// One page drawn from a cursor.
#[derive(Debug, Clone)]
pub struct CursorPage {
    /// Up to the requested number of sessions, in listing order.
    pub sessions: Vec<SessionSummary>,
    /// Whether items remain after this page.
    pub more: bool,
}

#[derive(Debug)]
struct CursorState {
    remaining: VecDeque<SessionSummary>,
    /// Set by `next`, cleared by every sweep.
    used_since_sweep: bool,
    /// At least one sweep has seen this cursor.
    swept: bool,
    closed: bool,
}

/// The sessions a listing did not return in its first page.
///
/// The snapshot is fixed when the listing is taken. Paging only touches the
/// cursor's own lock, never the registry's.
#[derive(Debug)]
pub struct ListingCursor {
    id: CursorId,
    state: Mutex<CursorState>,
    registry: Weak<Shared>,
}

impl ListingCursor {
    pub(crate) fn new(
        id: CursorId,
        remaining: Vec<SessionSummary>,
        registry: Weak<Shared>,
    ) -> Self {
        Self {
            id,
            state: Mutex::new(CursorState {
                remaining: remaining.into(),
                used_since_sweep: false,
                swept: false,
                closed: false,
            }),
            registry,
        }
    }

    /// Cursor id.
    pub fn id(&self) -> CursorId {
        self.id
    }

    /// Items not yet returned.
    pub fn remaining(&self) -> usize {
        lock(&self.state).remaining.len()
    }

    /// Takes up to `n` items and records the use.
    ///
    /// A drained cursor keeps answering with an empty page and `more = false`
    /// until it is closed or reaped.
    ///
    /// # Errors
    ///
    /// Returns [`LobbyErrorKind::CursorExpired`] once the cursor was closed or
    /// reaped.
    #[instrument(skip(self), fields(cursor = %self.id))]
    pub fn next(&self, n: usize) -> Result<CursorPage, LobbyError> {
        let mut state = lock(&self.state);
        if state.closed {
            warn!("Use of expired cursor");
            return Err(LobbyError::new(LobbyErrorKind::CursorExpired(self.id)));
        }

        state.used_since_sweep = true;
        let take = n.min(state.remaining.len());
        let sessions: Vec<SessionSummary> = state.remaining.drain(..take).collect();
        let more = !state.remaining.is_empty();

        debug!(returned = sessions.len(), more, "Cursor page");
        Ok(CursorPage { sessions, more })
    }

    /// Destroys the cursor. Idempotent.
    #[instrument(skip(self), fields(cursor = %self.id))]
    pub fn close(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.forget_cursor(self.id);
        }
        self.expire();
    }

    pub(crate) fn expire(&self) {
        let mut state = lock(&self.state);
        if !state.closed {
            state.closed = true;
            state.remaining.clear();
            debug!(cursor = %self.id, "Cursor destroyed");
        }
    }

    /// One reaper pass over this cursor. Returns `true` if it must go.
    ///
    /// A cursor survives the first sweep that sees it and any sweep preceded
    /// by a `next` call since the last one.
    pub(crate) fn sweep(&self) -> bool {
        let mut state = lock(&self.state);
        let evict = state.swept && !state.used_since_sweep;
        state.used_since_sweep = false;
        state.swept = true;
        if evict {
            state.closed = true;
            state.remaining.clear();
        }
        evict
    }
}
