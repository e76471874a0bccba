//! End-to-end tests for the WebSocket signaling gateway
//!
//! Each test spawns a real gateway on an ephemeral port and drives it with
//! tokio-tungstenite clients.

use std::time::Duration;

use anyhow::Result;
use integration_tests::{wait_until, TestClient, TestServer};
use serde_json::json;
use signal_core::RoomId;

#[tokio::test]
async fn test_join_delivers_roster_and_notifies_peers() -> Result<()> {
    let server = TestServer::start().await?;

    let mut alice = TestClient::connect(&server).await?;
    let roster = alice.join("r1", "a1", "Alice").await?;
    assert_eq!(roster["type"], "roster-update");
    assert_eq!(roster["roster"][0]["id"], "a1");
    assert_eq!(roster["roster"][0]["name"], "Alice");
    assert_eq!(roster["roster"].as_array().map(Vec::len), Some(1));

    let mut bob = TestClient::connect(&server).await?;
    let roster = bob.join("r1", "b1", "Bob").await?;
    // Roster order matches join order.
    assert_eq!(roster["roster"][0]["id"], "a1");
    assert_eq!(roster["roster"][1]["id"], "b1");

    let joined = alice.recv_json().await?;
    assert_eq!(joined["type"], "user-joined");
    assert_eq!(joined["id"], "b1");
    assert_eq!(joined["name"], "Bob");
    assert_eq!(joined["role"], "listener");

    Ok(())
}

#[tokio::test]
async fn test_targeted_offer_is_forwarded_verbatim() -> Result<()> {
    let server = TestServer::start().await?;

    let mut alice = TestClient::connect(&server).await?;
    alice.join("r1", "a1", "Alice").await?;
    let mut bob = TestClient::connect(&server).await?;
    bob.join("r1", "b1", "Bob").await?;
    alice.recv_json().await?; // user-joined b1

    let offer = json!({
        "type": "offer",
        "targetId": "a1",
        "sdp": "v=0\r\no=- 0 0 IN IP4 127.0.0.1",
        "extra": {"nested": true},
    });
    bob.send_json(&offer).await?;

    // Delivered to the target with every field intact, and to nobody else.
    assert_eq!(alice.recv_json().await?, offer);
    bob.expect_silence(Duration::from_millis(200)).await?;

    Ok(())
}

#[tokio::test]
async fn test_relay_to_absent_target_is_dropped() -> Result<()> {
    let server = TestServer::start().await?;

    let mut alice = TestClient::connect(&server).await?;
    alice.join("r1", "a1", "Alice").await?;
    let mut bob = TestClient::connect(&server).await?;
    bob.join("r1", "b1", "Bob").await?;
    alice.recv_json().await?;

    bob.send_json(&json!({"type": "offer", "targetId": "ghost", "sdp": "v=0"}))
        .await?;

    alice.expect_silence(Duration::from_millis(200)).await?;
    bob.expect_silence(Duration::from_millis(200)).await?;

    Ok(())
}

#[tokio::test]
async fn test_untargeted_candidate_broadcasts_to_other_peers() -> Result<()> {
    let server = TestServer::start().await?;

    let mut alice = TestClient::connect(&server).await?;
    alice.join("r1", "a1", "Alice").await?;
    let mut bob = TestClient::connect(&server).await?;
    bob.join("r1", "b1", "Bob").await?;
    let mut cid = TestClient::connect(&server).await?;
    cid.join("r1", "c1", "Cid").await?;
    alice.recv_json().await?; // user-joined b1
    alice.recv_json().await?; // user-joined c1
    bob.recv_json().await?; // user-joined c1

    let candidate = json!({"type": "candidate", "candidate": "candidate:0 1 UDP"});
    bob.send_json(&candidate).await?;

    assert_eq!(alice.recv_json().await?, candidate);
    assert_eq!(cid.recv_json().await?, candidate);
    bob.expect_silence(Duration::from_millis(200)).await?;

    Ok(())
}

#[tokio::test]
async fn test_status_update_fans_out() -> Result<()> {
    let server = TestServer::start().await?;

    let mut alice = TestClient::connect(&server).await?;
    alice.join("r1", "a1", "Alice").await?;
    let mut bob = TestClient::connect(&server).await?;
    bob.join("r1", "b1", "Bob").await?;
    alice.recv_json().await?;

    bob.send_json(&json!({"type": "status-update", "isMicEnabled": true}))
        .await?;

    let status = alice.recv_json().await?;
    assert_eq!(status["type"], "status-update");
    assert_eq!(status["id"], "b1");
    assert_eq!(status["isMicEnabled"], true);
    assert_eq!(status["isBroadcasting"], false);
    bob.expect_silence(Duration::from_millis(200)).await?;

    Ok(())
}

#[tokio::test]
async fn test_disconnect_notifies_room_and_tears_down_when_empty() -> Result<()> {
    let server = TestServer::start().await?;

    let mut alice = TestClient::connect(&server).await?;
    alice.join("r1", "a1", "Alice").await?;
    let mut bob = TestClient::connect(&server).await?;
    bob.join("r1", "b1", "Bob").await?;
    alice.recv_json().await?;

    bob.close().await?;

    let left = alice.recv_json().await?;
    assert_eq!(left, json!({"type": "user-left", "id": "b1"}));

    // The room survives while a member remains.
    let registry = server.state.registry().clone();
    assert!(registry.contains_room(&RoomId::from("r1")));
    assert_eq!(registry.member_count(&RoomId::from("r1")), Some(1));

    alice.close().await?;
    let torn_down = wait_until(Duration::from_secs(2), || registry.room_count() == 0).await;
    assert!(torn_down, "room not removed after the last member left");

    Ok(())
}

#[tokio::test]
async fn test_stale_connection_close_keeps_reconnected_member() -> Result<()> {
    let server = TestServer::start().await?;

    let mut old = TestClient::connect(&server).await?;
    old.join("r1", "a1", "Alice").await?;
    let mut new = TestClient::connect(&server).await?;
    new.join("r1", "a1", "Alice").await?;

    // The lingering first transport goes away after the reconnect.
    old.close().await?;

    // The reconnected member stays, and no departure is announced for it.
    new.expect_silence(Duration::from_millis(300)).await?;
    let registry = server.state.registry();
    assert!(registry.contains_room(&RoomId::from("r1")));
    assert_eq!(registry.member_count(&RoomId::from("r1")), Some(1));

    Ok(())
}

#[tokio::test]
async fn test_malformed_frames_do_not_break_the_session() -> Result<()> {
    let server = TestServer::start().await?;

    let mut client = TestClient::connect(&server).await?;
    client
        .send_json(&json!({"type": "no-such-message"}))
        .await?;
    client.send_json(&json!({"type": "join"})).await?; // missing required fields

    // The connection is still usable afterwards.
    let roster = client.join("r1", "a1", "Alice").await?;
    assert_eq!(roster["type"], "roster-update");

    Ok(())
}

#[tokio::test]
async fn test_rejoining_switches_rooms() -> Result<()> {
    let server = TestServer::start().await?;

    let mut alice = TestClient::connect(&server).await?;
    alice.join("r1", "a1", "Alice").await?;
    let mut bob = TestClient::connect(&server).await?;
    bob.join("r1", "b1", "Bob").await?;
    alice.recv_json().await?;

    bob.join("r2", "b1", "Bob").await?;

    let left = alice.recv_json().await?;
    assert_eq!(left["type"], "user-left");
    assert_eq!(left["id"], "b1");

    let registry = server.state.registry();
    assert_eq!(registry.member_count(&RoomId::from("r1")), Some(1));
    assert_eq!(registry.member_count(&RoomId::from("r2")), Some(1));

    Ok(())
}

#[tokio::test]
async fn test_unresponsive_connection_is_reaped() -> Result<()> {
    let mut config = integration_tests::test_config();
    config.heartbeat.interval_ms = 100;
    let server = TestServer::start_with_config(config).await?;

    let mut sleeper = TestClient::connect(&server).await?;
    sleeper.join("r1", "sleeper", "Sleeper").await?;

    // Never read again: probes go unanswered and no pong comes back.
    let registry = server.state.registry().clone();
    let reaped = wait_until(Duration::from_secs(2), || registry.room_count() == 0).await;
    assert!(reaped, "silent connection was not reaped");

    drop(sleeper);
    Ok(())
}

#[tokio::test]
async fn test_responsive_connection_survives_many_probe_rounds() -> Result<()> {
    let mut config = integration_tests::test_config();
    config.heartbeat.interval_ms = 100;
    let server = TestServer::start_with_config(config).await?;

    let mut alice = TestClient::connect(&server).await?;
    alice.join("r1", "a1", "Alice").await?;

    // Reading the socket answers probes automatically with pongs.
    alice.expect_silence(Duration::from_millis(600)).await?;

    let registry = server.state.registry();
    assert_eq!(registry.member_count(&RoomId::from("r1")), Some(1));

    Ok(())
}
