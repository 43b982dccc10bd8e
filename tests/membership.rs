//! Integration tests for channel membership tracking and chat handling.

mod common;

use common::{TestServer, bridge, config_for, eventually};
use slirc_bridge::host::{Value, events, params, vars};
use slirc_bridge::{Bridge, ConnectionState};
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(3);

async fn joined(bridge: &Bridge) {
    bridge.start().await;
    eventually(WAIT, "Joined", || bridge.state() == ConnectionState::Joined).await;
    // NAMES: Rover + alice
    eventually(WAIT, "NAMES", || bridge.member_count() == 2).await;
}

#[tokio::test]
async fn test_member_join_and_part() {
    let server = TestServer::spawn().await.expect("Failed to spawn test server");
    let (bridge, sink) = bridge(config_for(&server));
    joined(&bridge).await;
    let before = bridge.member_count();

    server.push(":bob!b@host JOIN #test");
    eventually(WAIT, "bob listed", || {
        bridge.member_list(None).iter().any(|m| m == "bob")
    })
    .await;
    assert_eq!(bridge.member_count(), before + 1);
    assert_eq!(bridge.member_list(Some("#test")), vec!["alice", "bob", "Rover"]);
    assert_eq!(sink.variable(vars::MEMBER_COUNT), Some(Value::from(before + 1)));

    server.push(":bob!b@host PART #test :later");
    eventually(WAIT, "bob gone", || bridge.member_count() == before).await;
    assert!(!bridge.member_list(None).iter().any(|m| m == "bob"));
    assert_eq!(sink.variable(vars::MEMBER_COUNT), Some(Value::from(before)));

    assert_eq!(
        sink.parameter_values(params::USER_JOINED).first(),
        Some(&Value::Bool(true))
    );
    eventually(WAIT, "UserLeft pulse reset", || {
        sink.parameter_values(params::USER_LEFT) == vec![Value::Bool(true), Value::Bool(false)]
    })
    .await;

    bridge.stop().await;
}

#[tokio::test]
async fn test_other_channels_and_unknown_names_are_ignored() {
    let server = TestServer::spawn().await.expect("Failed to spawn test server");
    let (bridge, _sink) = bridge(config_for(&server));
    joined(&bridge).await;

    server.push(":bob!b@host JOIN #elsewhere");
    server.push(":carol!c@host JOIN #test");
    eventually(WAIT, "carol listed", || bridge.member_count() == 3).await;
    assert!(!bridge.member_list(None).iter().any(|m| m == "bob"));
    assert!(bridge.member_list(Some("#elsewhere")).is_empty());
    assert_eq!(bridge.member_list(Some("test")).len(), 3);

    bridge.stop().await;
}

#[tokio::test]
async fn test_nick_change_and_quit_update_members() {
    let server = TestServer::spawn().await.expect("Failed to spawn test server");
    let (bridge, _sink) = bridge(config_for(&server));
    joined(&bridge).await;

    server.push(":alice!a@host NICK :alicia");
    eventually(WAIT, "rename", || {
        bridge.member_list(None).iter().any(|m| m == "alicia")
    })
    .await;
    assert!(!bridge.member_list(None).iter().any(|m| m == "alice"));

    server.push(":alicia!a@host QUIT :gone");
    eventually(WAIT, "quit", || bridge.member_count() == 1).await;
    assert_eq!(bridge.member_list(None), vec!["Rover"]);

    bridge.stop().await;
}

#[tokio::test]
async fn test_local_nick_change_is_followed() {
    let server = TestServer::spawn().await.expect("Failed to spawn test server");
    let (bridge, sink) = bridge(config_for(&server));
    joined(&bridge).await;

    bridge.change_nickname("Rex").await.expect("change_nickname");
    eventually(WAIT, "nick confirmed", || bridge.current_nickname() == "Rex").await;
    assert!(bridge.member_list(None).iter().any(|m| m == "Rex"));
    assert_eq!(sink.variable(vars::NICKNAME), Some(Value::from("Rex")));
    assert_eq!(sink.events(events::NICKNAME_CHANGED).len(), 1);

    bridge.stop().await;
}

#[tokio::test]
async fn test_channel_message_publishes_and_pulses() {
    let server = TestServer::spawn().await.expect("Failed to spawn test server");
    let (bridge, sink) = bridge(config_for(&server));
    joined(&bridge).await;

    server.push(":alice!a@host PRIVMSG #test :hello there");
    eventually(WAIT, "chat message", || {
        !sink.events(events::CHAT_MESSAGE).is_empty()
    })
    .await;
    assert_eq!(sink.variable(vars::LAST_MESSAGE), Some(Value::from("hello there")));
    assert_eq!(sink.variable(vars::LAST_SENDER), Some(Value::from("alice")));
    let event = &sink.events(events::CHAT_MESSAGE)[0];
    assert_eq!(event["from"], "alice");
    assert_eq!(event["channel"], "#test");

    eventually(WAIT, "MessageReceived pulse", || {
        sink.parameter_values(params::MESSAGE_RECEIVED) == vec![Value::Bool(true), Value::Bool(false)]
    })
    .await;

    bridge.stop().await;
}

#[tokio::test]
async fn test_command_responder_replies_in_channel() {
    let server = TestServer::spawn().await.expect("Failed to spawn test server");
    let mut config = config_for(&server);
    config.responder.enabled = true;
    let (bridge, _sink) = bridge(config);
    joined(&bridge).await;

    server.push(":alice!a@host PRIVMSG #test :@rover ping and @ROVER version");
    eventually(WAIT, "replies", || {
        server.received_starting_with("PRIVMSG #test :@alice ").len() == 2
    })
    .await;
    let replies = server.received_starting_with("PRIVMSG #test :@alice ");
    assert!(replies.contains(&"PRIVMSG #test :@alice pong".to_string()));
    assert!(replies.iter().any(|r| r.contains(env!("CARGO_PKG_VERSION"))));

    bridge.stop().await;
}

#[tokio::test]
async fn test_responder_is_off_by_default() {
    let server = TestServer::spawn().await.expect("Failed to spawn test server");
    let (bridge, sink) = bridge(config_for(&server));
    joined(&bridge).await;

    server.push(":alice!a@host PRIVMSG #test :@Rover ping");
    eventually(WAIT, "chat message", || {
        !sink.events(events::CHAT_MESSAGE).is_empty()
    })
    .await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(server.received_starting_with("PRIVMSG #test :@alice").is_empty());

    bridge.stop().await;
}

#[tokio::test]
async fn test_leave_and_kick_return_to_connected() {
    let server = TestServer::spawn().await.expect("Failed to spawn test server");
    let (bridge, sink) = bridge(config_for(&server));
    joined(&bridge).await;

    bridge.leave_channel("test", None).await.expect("leave_channel");
    eventually(WAIT, "left", || bridge.state() == ConnectionState::Connected).await;
    assert_eq!(bridge.member_count(), 0);
    assert!(bridge.member_list(None).is_empty());
    assert_eq!(sink.variable(vars::CHANNEL_STATUS), Some(Value::from("NotJoined")));

    bridge.join_channel("test").await.expect("join_channel");
    eventually(WAIT, "rejoined", || bridge.state() == ConnectionState::Joined).await;

    server.push(":op!o@host KICK #test Rover :out");
    eventually(WAIT, "kicked", || bridge.state() == ConnectionState::Connected).await;
    assert_eq!(sink.events(events::LEFT).len(), 2);
    assert_eq!(bridge.channel(), None);

    bridge.stop().await;
}
