//! Integration tests for the registration handshake.

mod common;

use common::{TestClient, TestServer};
use std::time::Duration;

#[tokio::test]
async fn welcome_burst_after_nick_and_user() {
    let server = TestServer::spawn().await.expect("spawn server");
    let mut alice = TestClient::connect(&server.address(), "alice")
        .await
        .expect("connect alice");

    let lines = alice.register().await.expect("register alice");
    assert_eq!(lines.len(), 4, "{lines:?}");
    assert_eq!(lines[0], ":irc.test 001 alice :Welcome to something like IRC, alice");
    assert_eq!(
        lines[1],
        ":irc.test 002 alice :Your host is irc.test, running version relay-test"
    );
    assert!(lines[2].starts_with(":irc.test 003 alice :This server was created "));
    assert_eq!(lines[3], ":irc.test 004 alice irc.test relay-test iw noR oR");
}

#[tokio::test]
async fn user_before_nick_also_registers() {
    let server = TestServer::spawn().await.expect("spawn server");
    let mut client = TestClient::connect(&server.address(), "ignored")
        .await
        .expect("connect");

    client.send_raw("USER eve 0 * :Eve").await.unwrap();
    client.send_raw("NICK eve").await.unwrap();
    let first = client.recv().await.unwrap();
    assert_eq!(first, ":irc.test 001 eve :Welcome to something like IRC, eve");
}

#[tokio::test]
async fn taken_nick_is_rejected_case_insensitively() {
    let server = TestServer::spawn().await.expect("spawn server");
    let _alice = TestClient::registered(&server.address(), "alice")
        .await
        .expect("register alice");

    let mut second = TestClient::connect(&server.address(), "x").await.unwrap();
    second.send_raw("USER second 0 * :Second").await.unwrap();
    second.send_raw("NICK ALICE").await.unwrap();
    assert_eq!(
        second.recv().await.unwrap(),
        ":irc.test 433 * ALICE :Nickname already in use"
    );

    // The username is kept; a free nickname completes registration.
    second.send_raw("NICK alice2").await.unwrap();
    assert_eq!(
        second.recv().await.unwrap(),
        ":irc.test 001 alice2 :Welcome to something like IRC, alice2"
    );
}

#[tokio::test]
async fn handshake_errors_are_answered() {
    let server = TestServer::spawn().await.expect("spawn server");
    let mut client = TestClient::connect(&server.address(), "x").await.unwrap();

    client.send_raw("NICK").await.unwrap();
    assert_eq!(client.recv().await.unwrap(), ":irc.test 431 * :No nickname given");

    client.send_raw("NICK 4chan").await.unwrap();
    assert_eq!(client.recv().await.unwrap(), ":irc.test 432 * 4chan :Bad nickname");

    client.send_raw("USER only two").await.unwrap();
    assert_eq!(
        client.recv().await.unwrap(),
        ":irc.test 461 * USER :Not enough parameters"
    );

    client.send_raw("PRIVMSG #c :early").await.unwrap();
    assert_eq!(
        client.recv().await.unwrap(),
        ":irc.test 451 * :Command not yet available"
    );

    client.send_raw("WHOIS bob").await.unwrap();
    assert_eq!(
        client.recv().await.unwrap(),
        ":irc.test 421 * WHOIS :Unknown command"
    );

    client.send_raw("PING token").await.unwrap();
    assert_eq!(client.recv().await.unwrap(), ":irc.test PONG irc.test token");
}

#[tokio::test]
async fn quit_before_registering() {
    let server = TestServer::spawn().await.expect("spawn server");
    let mut client = TestClient::connect(&server.address(), "x").await.unwrap();

    client.send_raw("USER frank 0 * :Frank").await.unwrap();
    client.send_raw("QUIT :never mind").await.unwrap();
    assert_eq!(
        client.recv().await.unwrap(),
        ":*!~frank@0.0.0.0 QUIT :never mind"
    );
    assert_eq!(
        client.recv().await.unwrap(),
        "ERROR :Closing Link: 127.0.0.1 (Quit: never mind)"
    );
    assert!(client.closed().await);
}

#[tokio::test]
async fn registration_times_out() {
    let server = TestServer::spawn_with(|config| config.limits.registration_timeout_secs = 1)
        .await
        .expect("spawn server");
    let mut client = TestClient::connect(&server.address(), "slow").await.unwrap();
    client.send_raw("NICK slow").await.unwrap();

    let line = client.recv_timeout(Duration::from_secs(5)).await.unwrap();
    assert_eq!(line, "ERROR :Closing Link: 127.0.0.1 (Registration timeout)");
    assert!(client.closed().await);
}
