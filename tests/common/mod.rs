//! Test peers and servers shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use noughts_lobby::{LobbyError, LobbyErrorKind, Notification, Peer};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

/// Forwards every notification to a channel the test reads from.
#[derive(Debug)]
pub struct RecordingPeer {
    label: String,
    tx: mpsc::UnboundedSender<Notification>,
}

impl RecordingPeer {
    pub fn new(label: &str) -> (Arc<Self>, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                label: label.to_string(),
                tx,
            }),
            rx,
        )
    }
}

#[async_trait]
impl Peer for RecordingPeer {
    fn label(&self) -> &str {
        &self.label
    }

    async fn notify(&self, notification: &Notification) -> Result<(), LobbyError> {
        // A dropped receiver just means the test stopped listening.
        let _ = self.tx.send(notification.clone());
        Ok(())
    }
}

/// Always unreachable; counts delivery attempts.
#[derive(Debug, Default)]
pub struct FailingPeer {
    attempts: AtomicUsize,
}

impl FailingPeer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Peer for FailingPeer {
    fn label(&self) -> &str {
        "failing"
    }

    async fn notify(&self, _notification: &Notification) -> Result<(), LobbyError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(LobbyError::new(LobbyErrorKind::PeerUnreachable {
            peer: "failing".to_string(),
            reason: "connection refused".to_string(),
        }))
    }
}

/// Takes `delay` to accept each notification.
#[derive(Debug)]
pub struct SlowPeer {
    delay: Duration,
}

impl SlowPeer {
    pub fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self { delay })
    }
}

#[async_trait]
impl Peer for SlowPeer {
    fn label(&self) -> &str {
        "slow"
    }

    async fn notify(&self, _notification: &Notification) -> Result<(), LobbyError> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

/// Waits for the next notification, failing the test after a second.
pub async fn next_event(rx: &mut mpsc::UnboundedReceiver<Notification>) -> Notification {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("Timed out waiting for notification")
        .expect("Peer channel closed")
}

/// Asserts nothing arrives within a short grace period. A peer that was
/// dropped counts as quiet.
pub async fn assert_quiet(rx: &mut mpsc::UnboundedReceiver<Notification>) {
    let received = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await;
    if let Ok(Some(notification)) = received {
        panic!("Unexpected notification: {:?}", notification);
    }
}

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Bind failed");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });
    format!("http://{}", addr)
}

type Inbox = mpsc::UnboundedSender<Notification>;

async fn accept(State(inbox): State<Inbox>, Json(notification): Json<Notification>) -> StatusCode {
    let _ = inbox.send(notification);
    StatusCode::OK
}

async fn refuse() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn stall() -> StatusCode {
    tokio::time::sleep(Duration::from_secs(5)).await;
    StatusCode::OK
}

/// Callback endpoints: `/ok` records and accepts, `/fail` answers 500 and
/// `/slow` answers after five seconds.
pub async fn callback_server() -> (String, mpsc::UnboundedReceiver<Notification>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let app = Router::new()
        .route("/ok", post(accept))
        .route("/fail", post(refuse))
        .route("/slow", post(stall))
        .with_state(tx);
    (serve(app).await, rx)
}
