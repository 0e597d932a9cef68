//! Per-session fan-out of game events to attached spectators.
//!
//! Broadcasting only enqueues. A dedicated worker drains the queue in order
//! and delivers each event to every active slot; a slot whose delivery fails
//! is retired for good. Slots are never removed, so a cookie stays a valid
//! index for the lifetime of the session.

use crate::{Notification, Peer, lock};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Identifies one spectator slot within a session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(transparent)]
pub struct SpectatorCookie(usize);

impl SpectatorCookie {
    /// Wraps a raw slot index.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// The slot index.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
enum SpectatorSlot {
    Active(Arc<dyn Peer>),
    Retired,
}

type Slots = Arc<Mutex<Vec<SpectatorSlot>>>;

/// Spectator list plus the sending half of its delivery queue.
#[derive(Debug)]
pub struct SpectatorHub {
    game: String,
    slots: Slots,
    queue: Mutex<Option<mpsc::UnboundedSender<Notification>>>,
}

impl SpectatorHub {
    /// Creates a hub and starts its delivery worker.
    ///
    /// The worker stops once the hub is closed and its queue drained, or as
    /// soon as `shutdown` is cancelled. Must be called within a Tokio runtime.
    #[instrument(skip(shutdown))]
    pub fn spawn(game: String, shutdown: CancellationToken) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let slots: Slots = Arc::new(Mutex::new(Vec::new()));
        tokio::spawn(deliver(game.clone(), Arc::clone(&slots), rx, shutdown));
        Self {
            game,
            slots,
            queue: Mutex::new(Some(tx)),
        }
    }

    /// Appends an active slot for `peer`.
    #[instrument(skip(self, peer), fields(game = %self.game, peer = peer.label()))]
    pub fn attach(&self, peer: Arc<dyn Peer>) -> SpectatorCookie {
        let mut slots = lock(&self.slots);
        slots.push(SpectatorSlot::Active(peer));
        let cookie = SpectatorCookie(slots.len() - 1);
        info!(%cookie, "Spectator attached");
        cookie
    }

    /// Retires a slot. Returns `false` if it was unknown or already retired.
    #[instrument(skip(self), fields(game = %self.game))]
    pub fn retire(&self, cookie: SpectatorCookie) -> bool {
        let mut slots = lock(&self.slots);
        match slots.get_mut(cookie.0) {
            Some(slot) if matches!(slot, SpectatorSlot::Active(_)) => {
                *slot = SpectatorSlot::Retired;
                info!(%cookie, "Spectator detached");
                true
            }
            _ => false,
        }
    }

    /// Number of slots still receiving events.
    pub fn active(&self) -> usize {
        lock(&self.slots)
            .iter()
            .filter(|slot| matches!(slot, SpectatorSlot::Active(_)))
            .count()
    }

    /// Queues an event for delivery. Never waits on a spectator.
    #[instrument(skip(self, notification), fields(game = %self.game, event = notification.event()))]
    pub fn broadcast(&self, notification: Notification) {
        match lock(&self.queue).as_ref() {
            Some(tx) => {
                if tx.send(notification).is_err() {
                    debug!("Delivery worker already stopped; event dropped");
                }
            }
            None => debug!("Hub closed; event dropped"),
        }
    }

    /// Stops accepting events. Already-queued events are still delivered.
    #[instrument(skip(self), fields(game = %self.game))]
    pub fn close(&self) {
        if lock(&self.queue).take().is_some() {
            debug!("Spectator queue closed");
        }
    }
}

async fn deliver(
    game: String,
    slots: Slots,
    mut rx: mpsc::UnboundedReceiver<Notification>,
    shutdown: CancellationToken,
) {
    debug!(%game, "Spectator delivery worker running");
    loop {
        let notification = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            next = rx.recv() => match next {
                Some(notification) => notification,
                None => break,
            },
        };
        fan_out(&game, &slots, &notification).await;
    }
    debug!(%game, "Spectator delivery worker stopped");
}

async fn fan_out(game: &str, slots: &Slots, notification: &Notification) {
    let targets: Vec<(usize, Arc<dyn Peer>)> = lock(slots)
        .iter()
        .enumerate()
        .filter_map(|(index, slot)| match slot {
            SpectatorSlot::Active(peer) => Some((index, Arc::clone(peer))),
            SpectatorSlot::Retired => None,
        })
        .collect();
    if targets.is_empty() {
        return;
    }

    let results = join_all(targets.iter().map(|(index, peer)| async move {
        (*index, peer.notify(notification).await)
    }))
    .await;

    let failed: Vec<usize> = results
        .into_iter()
        .filter_map(|(index, result)| match result {
            Ok(()) => None,
            Err(err) => {
                warn!(
                    game,
                    slot = index,
                    error = %err.kind,
                    "Spectator unreachable; retiring slot"
                );
                Some(index)
            }
        })
        .collect();

    if !failed.is_empty() {
        let mut slots = lock(slots);
        for index in failed {
            slots[index] = SpectatorSlot::Retired;
        }
    }
    debug!(game, event = notification.event(), attempted = targets.len(), "Event fanned out");
}
