//! Tests for notification delivery over HTTP callbacks.

mod common;

use common::{callback_server, next_event};
use noughts_lobby::{Board, HttpPeer, LobbyErrorKind, Notification, Peer};
use std::time::Duration;

fn update() -> Notification {
    Notification::Update {
        game: "callbacks".to_string(),
        board: Board::new(),
    }
}

fn peer(url: String) -> HttpPeer {
    let client = HttpPeer::client(Duration::from_millis(300)).expect("Client build failed");
    HttpPeer::new(client, url)
}

#[tokio::test]
async fn test_accepted_callback_delivers_notification() {
    let (base, mut inbox) = callback_server().await;
    let peer = peer(format!("{}/ok", base));

    peer.notify(&update()).await.expect("Delivery failed");
    assert_eq!(next_event(&mut inbox).await, update());
    assert_eq!(peer.label(), format!("{}/ok", base));
}

#[tokio::test]
async fn test_error_status_is_unreachable() {
    let (base, _inbox) = callback_server().await;
    let url = format!("{}/fail", base);

    let err = peer(url.clone()).notify(&update()).await.unwrap_err();
    match err.kind() {
        LobbyErrorKind::PeerUnreachable { peer, reason } => {
            assert_eq!(peer, &url);
            assert!(reason.contains("500"), "reason: {}", reason);
        }
        other => panic!("Expected PeerUnreachable, got {:?}", other),
    }
}

#[tokio::test]
async fn test_callback_past_timeout_is_unreachable() {
    let (base, _inbox) = callback_server().await;

    let err = peer(format!("{}/slow", base)).notify(&update()).await.unwrap_err();
    assert!(matches!(err.kind(), LobbyErrorKind::PeerUnreachable { .. }));
}

#[tokio::test]
async fn test_refused_connection_is_unreachable() {
    let err = peer("http://127.0.0.1:9/".to_string())
        .notify(&update())
        .await
        .unwrap_err();
    assert!(matches!(err.kind(), LobbyErrorKind::PeerUnreachable { .. }));
}
