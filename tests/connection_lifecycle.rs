//! Integration tests for keepalive, idle timeouts and disconnects.

mod common;

use common::{TestClient, TestServer};
use std::time::Duration;

async fn impatient_server() -> TestServer {
    TestServer::spawn_with(|config| config.limits.idle_timeout_secs = 1)
        .await
        .expect("spawn server")
}

#[tokio::test]
async fn silent_client_is_pinged_then_dropped() {
    let server = impatient_server().await;
    let mut alice = TestClient::registered(&server.address(), "alice")
        .await
        .expect("register alice");

    let ping = alice.recv_timeout(Duration::from_secs(3)).await.unwrap();
    assert_eq!(ping, ":irc.test PING irc.test");

    let echo = alice.recv_timeout(Duration::from_secs(3)).await.unwrap();
    assert_eq!(echo, ":alice!~alice@127.0.0.1 QUIT :Ping timeout (2 seconds)");
    assert_eq!(
        alice.recv().await.unwrap(),
        "ERROR :Closing Link: 127.0.0.1 (Ping timeout (2 seconds))"
    );
    assert!(alice.closed().await);
}

#[tokio::test]
async fn answering_pings_keeps_the_connection() {
    let server = impatient_server().await;
    let mut alice = TestClient::registered(&server.address(), "alice")
        .await
        .expect("register alice");

    for _ in 0..3 {
        let ping = alice.recv_timeout(Duration::from_secs(3)).await.unwrap();
        assert_eq!(ping, ":irc.test PING irc.test");
        alice.send_raw("PONG irc.test").await.unwrap();
    }
}

#[tokio::test]
async fn ping_is_answered_with_pong() {
    let server = TestServer::spawn().await.expect("spawn server");
    let mut alice = TestClient::registered(&server.address(), "alice")
        .await
        .expect("register alice");

    alice.send_raw("PING :are you there").await.unwrap();
    assert_eq!(
        alice.recv().await.unwrap(),
        ":irc.test PONG irc.test :are you there"
    );

    // An unsolicited PONG is accepted silently.
    alice.send_raw("PONG irc.test").await.unwrap();
    alice.expect_silence(Duration::from_millis(200)).await.unwrap();
}

#[tokio::test]
async fn quit_without_reason() {
    let server = TestServer::spawn().await.expect("spawn server");
    let mut alice = TestClient::registered(&server.address(), "alice")
        .await
        .expect("register alice");

    alice.send_raw("QUIT").await.unwrap();
    assert_eq!(alice.recv().await.unwrap(), ":alice!~alice@127.0.0.1 QUIT :Client Quit");
    assert_eq!(
        alice.recv().await.unwrap(),
        "ERROR :Closing Link: 127.0.0.1 (Client Quit)"
    );
    assert!(alice.closed().await);
}

#[tokio::test]
async fn dropped_socket_is_reported_to_peers() {
    let server = TestServer::spawn().await.expect("spawn server");
    let mut alice = TestClient::registered(&server.address(), "alice")
        .await
        .expect("register alice");
    let mut bob = TestClient::registered(&server.address(), "bob")
        .await
        .expect("register bob");

    alice.create("#room").await.unwrap();
    bob.join("#room").await.unwrap();
    alice.recv().await.unwrap(); // bob's JOIN

    drop(bob);
    assert_eq!(alice.recv().await.unwrap(), ":bob!~bob@127.0.0.1 QUIT :EOF");
}

#[tokio::test]
async fn overlong_line_disconnects() {
    let server = TestServer::spawn_with(|config| config.limits.max_line_len = 64)
        .await
        .expect("spawn server");
    let mut alice = TestClient::registered(&server.address(), "alice")
        .await
        .expect("register alice");

    let text = "x".repeat(100);
    alice.privmsg("#nowhere", &text).await.unwrap();
    let lines = alice
        .recv_until(|line| line.starts_with("ERROR "))
        .await
        .unwrap();
    let error = lines.last().unwrap();
    assert!(error.starts_with("ERROR :Closing Link: 127.0.0.1 (Input line too long"), "{error}");
    assert!(alice.closed().await);
}
