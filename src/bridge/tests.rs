use super::*;
use crate::host::{params, vars};
use crate::wire::{MessageKind, TransportError, WireEvent};
use async_trait::async_trait;
use slirc_proto::ctcp::Ctcp;
use slirc_proto::{Command, Response};
use std::sync::atomic::AtomicUsize;
use std::time::Duration;
use tokio::sync::mpsc;

/// Transport whose connections are driven by the test.
#[derive(Default)]
struct FakeTransport {
    calls: AtomicUsize,
    delay: Duration,
    fail: bool,
    /// Hand out handles whose event stream was already taken.
    no_events: bool,
    links: Mutex<Vec<FakeLink>>,
}

struct FakeLink {
    params: ConnectParams,
    events: mpsc::Sender<WireEvent>,
    outbound: mpsc::Receiver<Message>,
}

#[async_trait]
impl Transport for FakeTransport {
    async fn connect(&self, params: ConnectParams) -> Result<WireHandle, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        sleep(self.delay).await;
        if self.fail {
            return Err(TransportError::Io(std::io::Error::other("refused")));
        }
        let (out_tx, out_rx) = mpsc::channel(64);
        let (event_tx, event_rx) = mpsc::channel(64);
        let mut handle = WireHandle::new(out_tx, event_rx, None);
        if self.no_events {
            drop(handle.take_events());
            return Ok(handle);
        }
        self.links.lock().push(FakeLink {
            params,
            events: event_tx,
            outbound: out_rx,
        });
        Ok(handle)
    }
}

impl FakeTransport {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn take_link(&self) -> FakeLink {
        self.links.lock().remove(0)
    }
}

#[derive(Default)]
struct RecordingSink {
    variables: Mutex<Vec<(String, Value)>>,
    events: Mutex<Vec<(String, serde_json::Value)>>,
    parameters: Mutex<Vec<(String, Value)>>,
    /// Variables and events in the order they were published.
    history: Mutex<Vec<String>>,
}

impl RecordingSink {
    fn variable(&self, name: &str) -> Option<Value> {
        self.variables
            .lock()
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    fn event_count(&self, name: &str) -> usize {
        self.events.lock().iter().filter(|(n, _)| n == name).count()
    }

    /// Position of `entry` in the combined history, searching from `after`.
    fn position(&self, entry: &str, after: usize) -> usize {
        let history = self.history.lock();
        history
            .iter()
            .skip(after)
            .position(|e| e == entry)
            .map(|i| i + after)
            .unwrap_or_else(|| panic!("{entry} not recorded after {after}: {history:?}"))
    }

    fn history_len(&self) -> usize {
        self.history.lock().len()
    }
}

impl HostSink for RecordingSink {
    fn set_variable(&self, name: &str, value: Value) {
        self.history.lock().push(format!("{name}={value}"));
        self.variables.lock().push((name.to_string(), value));
    }

    fn emit_event(&self, name: &str, payload: serde_json::Value) {
        self.history.lock().push(format!("event:{name}"));
        self.events.lock().push((name.to_string(), payload));
    }

    fn send_parameter(&self, name: &str, value: Value) {
        self.parameters.lock().push((name.to_string(), value));
    }
}

fn config() -> Config {
    let mut config = Config::default();
    config.server.address = "irc.example.org".into();
    config.server.port = 6667;
    config.identity.nickname = "Rover".into();
    config.identity.channel = "#test".into();
    config.reconnect.delay_ms = 20;
    config.announcer.settle_ms = 10;
    config.announcer.ready_delay_ms = 10;
    config.announcer.pulse_ms = 10;
    config.disconnect.grace_ms = 10;
    config
}

fn bridge_with(config: Config, transport: FakeTransport) -> (Bridge, Arc<FakeTransport>, Arc<RecordingSink>) {
    let transport = Arc::new(transport);
    let sink = Arc::new(RecordingSink::default());
    let bridge = Bridge::new(
        config,
        Collaborators {
            transport: transport.clone(),
            sink: sink.clone(),
            hashing: Arc::new(Sha256Hasher::with_fingerprint("salt", "fingerprint", None)),
            user: Arc::new(StaticUserState::new(Some("usr_1".into()), Some("Alice".into()))),
        },
    );
    (bridge, transport, sink)
}

async fn eventually(what: &str, check: impl Fn() -> bool) {
    for _ in 0..200 {
        if check() {
            return;
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {what}");
}

async fn next_outbound(link: &mut FakeLink, wanted: impl Fn(&Command) -> bool) -> Message {
    loop {
        match timeout(Duration::from_secs(2), link.outbound.recv()).await {
            Ok(Some(out)) if wanted(&out.command) => return out,
            Ok(Some(_)) => continue,
            Ok(None) => panic!("outbound channel closed"),
            Err(_) => panic!("no matching outbound command"),
        }
    }
}

async fn registered(bridge: &Bridge, transport: &FakeTransport) -> FakeLink {
    bridge.connect().await;
    let link = transport.take_link();
    link.events
        .send(WireEvent::Registered { nick: "Rover".into() })
        .await
        .unwrap();
    eventually("registration", || bridge.state().is_registered()).await;
    link
}

#[tokio::test]
async fn connect_is_idempotent_while_connecting() {
    let (bridge, transport, _) = bridge_with(
        config(),
        FakeTransport {
            delay: Duration::from_millis(100),
            ..Default::default()
        },
    );

    tokio::join!(bridge.connect(), bridge.connect());
    assert_eq!(transport.calls(), 1);
    assert_eq!(bridge.state(), ConnectionState::Connecting);

    bridge.connect().await;
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn invalid_config_fails_fast_without_retry() {
    let mut config = config();
    config.server.address.clear();
    config.server.port = 70_000;
    let (bridge, transport, sink) = bridge_with(config, FakeTransport::default());

    bridge.connect().await;
    assert_eq!(bridge.state(), ConnectionState::Error);
    let error = bridge.last_error().unwrap();
    assert!(error.contains("server.address"), "{error}");
    assert!(error.contains("70000"), "{error}");
    assert_eq!(
        sink.variable(vars::CONNECTION_STATUS),
        Some(Value::from("Error"))
    );
    assert_eq!(
        sink.variable(vars::LAST_ERROR_CODE),
        Some(Value::from("config"))
    );

    sleep(Duration::from_millis(80)).await;
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn sends_fail_fast_when_not_connected() {
    let (bridge, _, _) = bridge_with(config(), FakeTransport::default());
    assert!(matches!(
        bridge.send_message("#test", "hi").await,
        Err(BridgeError::NotConnected)
    ));
    assert!(matches!(
        bridge.send_raw("PING x").await,
        Err(BridgeError::NotConnected)
    ));
    assert!(matches!(
        bridge.join_channel("other").await,
        Err(BridgeError::NotConnected)
    ));
}

#[tokio::test]
async fn wire_identity_fields_are_hashes_not_the_nickname() {
    let (bridge, transport, _) = bridge_with(config(), FakeTransport::default());
    bridge.connect().await;
    let link = transport.take_link();

    assert_eq!(link.params.nick, "Rover");
    assert_eq!(link.params.port, 6667);
    assert!(!link.params.username.contains("Rover"));
    assert_eq!(link.params.username.chars().count(), 9);
    assert!(link.params.realname.starts_with(&link.params.username));
}

#[tokio::test]
async fn display_name_is_used_when_no_nickname_is_configured() {
    let mut config = config();
    config.identity.nickname.clear();
    let (bridge, transport, _) = bridge_with(config, FakeTransport::default());
    bridge.connect().await;
    assert_eq!(transport.take_link().params.nick, "Alice");
}

#[tokio::test]
async fn registration_joins_and_announces() {
    let (bridge, transport, sink) = bridge_with(config(), FakeTransport::default());
    let mut link = registered(&bridge, &transport).await;

    let join = next_outbound(&mut link, |c| matches!(c, Command::JOIN(..))).await;
    assert_eq!(join, Message::join("#test"));
    assert_eq!(bridge.state(), ConnectionState::Joining);

    link.events
        .send(WireEvent::Joined {
            channel: "#test".into(),
            nick: "Rover".into(),
        })
        .await
        .unwrap();

    let action = next_outbound(&mut link, |c| matches!(c, Command::PRIVMSG(..))).await;
    let Command::PRIVMSG(target, body) = action.command else {
        unreachable!()
    };
    assert_eq!(target, "#test");
    let text = Ctcp::parse(&body)
        .and_then(|ctcp| ctcp.params)
        .expect("ACTION payload");
    assert_eq!(text.split(';').count(), 11);
    assert_eq!(bridge.state(), ConnectionState::Joined);
    assert_eq!(bridge.member_count(), 1);

    eventually("ready event", || sink.event_count(host_events::READY) == 1).await;
    assert_eq!(sink.event_count(host_events::JOINED), 1);
}

#[tokio::test]
async fn nickname_conflicts_walk_through_alternatives() {
    let (bridge, transport, _) = bridge_with(config(), FakeTransport::default());
    bridge.connect().await;
    let mut link = transport.take_link();

    for expected in ["Rover_", "Rover2"] {
        link.events
            .send(WireEvent::Reply {
                response: Response::ERR_NICKNAMEINUSE,
                params: vec!["*".into(), "Rover".into(), "Nickname is already in use".into()],
            })
            .await
            .unwrap();
        let nick = next_outbound(&mut link, |c| matches!(c, Command::NICK(_))).await;
        assert_eq!(nick, Message::nick(expected));
    }
    assert_eq!(bridge.state(), ConnectionState::Connecting);
}

#[tokio::test]
async fn isupport_updates_limits_for_the_connection() {
    let (bridge, transport, _) = bridge_with(config(), FakeTransport::default());
    let link = registered(&bridge, &transport).await;

    link.events
        .send(WireEvent::Reply {
            response: Response::RPL_ISUPPORT,
            params: vec![
                "Rover".into(),
                "NICKLEN=30".into(),
                "FOO=BAR".into(),
                "TOPICLEN=-5".into(),
                "are supported by this server".into(),
            ],
        })
        .await
        .unwrap();
    eventually("NICKLEN", || bridge.limits().nick_max_len == 30).await;
    assert_eq!(bridge.limits().topic_max_len, 390);
}

#[tokio::test]
async fn membership_follows_join_part_and_names() {
    let (bridge, transport, sink) = bridge_with(config(), FakeTransport::default());
    let link = registered(&bridge, &transport).await;

    let events = [
        WireEvent::Joined {
            channel: "#test".into(),
            nick: "Rover".into(),
        },
        WireEvent::Reply {
            response: Response::RPL_NAMREPLY,
            params: vec!["Rover".into(), "=".into(), "#test".into(), "@carol Rover".into()],
        },
        WireEvent::Reply {
            response: Response::RPL_ENDOFNAMES,
            params: vec!["Rover".into(), "#test".into(), "End of /NAMES list".into()],
        },
    ];
    for event in events {
        link.events.send(event).await.unwrap();
    }
    eventually("names", || bridge.member_count() == 2).await;
    let before = bridge.member_count();

    link.events
        .send(WireEvent::Joined {
            channel: "#test".into(),
            nick: "bob".into(),
        })
        .await
        .unwrap();
    eventually("bob joined", || bridge.member_list(None).contains(&"bob".to_string())).await;
    assert_eq!(bridge.member_list(Some("test")), vec!["bob", "carol", "Rover"]);

    link.events
        .send(WireEvent::Parted {
            channel: "#test".into(),
            nick: "bob".into(),
            reason: None,
        })
        .await
        .unwrap();
    eventually("bob left", || bridge.member_count() == before).await;
    assert!(!bridge.member_list(None).contains(&"bob".to_string()));
    assert_eq!(sink.variable(vars::MEMBER_COUNT), Some(Value::from(before)));

    let pulses = sink.parameters.lock().clone();
    assert!(pulses.contains(&(params::USER_JOINED.to_string(), Value::Bool(true))));
    assert!(pulses.contains(&(params::USER_LEFT.to_string(), Value::Bool(true))));
}

#[tokio::test]
async fn being_kicked_returns_to_connected() {
    let (bridge, transport, sink) = bridge_with(config(), FakeTransport::default());
    let link = registered(&bridge, &transport).await;
    link.events
        .send(WireEvent::Joined {
            channel: "#test".into(),
            nick: "Rover".into(),
        })
        .await
        .unwrap();
    eventually("joined", || bridge.state() == ConnectionState::Joined).await;

    link.events
        .send(WireEvent::Kicked {
            channel: "#test".into(),
            nick: "Rover".into(),
            by: Some("op".into()),
            reason: None,
        })
        .await
        .unwrap();
    eventually("connected", || bridge.state() == ConnectionState::Connected).await;
    assert_eq!(bridge.channel(), None);
    assert_eq!(sink.event_count(host_events::LEFT), 1);
}

#[tokio::test]
async fn channel_messages_are_published_and_answered() {
    let mut config = config();
    config.responder.enabled = true;
    let (bridge, transport, sink) = bridge_with(config, FakeTransport::default());
    let mut link = registered(&bridge, &transport).await;
    link.events
        .send(WireEvent::Joined {
            channel: "#test".into(),
            nick: "Rover".into(),
        })
        .await
        .unwrap();
    eventually("joined", || bridge.state() == ConnectionState::Joined).await;

    link.events
        .send(WireEvent::Message {
            from: "alice".into(),
            target: "#test".into(),
            text: "@rover ping".into(),
            kind: MessageKind::Privmsg,
        })
        .await
        .unwrap();

    let reply = next_outbound(&mut link, |c| matches!(c, Command::PRIVMSG(..))).await;
    assert_eq!(reply, Message::privmsg("#test", "@alice pong"));
    assert_eq!(sink.variable(vars::LAST_SENDER), Some(Value::from("alice")));
    assert_eq!(sink.event_count(host_events::CHAT_MESSAGE), 1);
    eventually("pulse reset", || {
        sink.parameters
            .lock()
            .contains(&(params::MESSAGE_RECEIVED.to_string(), Value::Bool(false)))
    })
    .await;
}

#[tokio::test]
async fn transport_failure_schedules_reconnect_until_stopped() {
    let (bridge, transport, sink) = bridge_with(
        config(),
        FakeTransport {
            fail: true,
            ..Default::default()
        },
    );

    bridge.start().await;
    assert_eq!(bridge.state(), ConnectionState::Error);
    assert_eq!(
        sink.variable(vars::LAST_ERROR_CODE),
        Some(Value::from("transport"))
    );
    eventually("reconnect", || transport.calls() >= 3).await;

    bridge.stop().await;
    let calls = transport.calls();
    sleep(Duration::from_millis(100)).await;
    assert!(transport.calls() <= calls + 1);
    assert_eq!(bridge.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn lost_connection_reconnects() {
    let (bridge, transport, sink) = bridge_with(config(), FakeTransport::default());
    let link = registered(&bridge, &transport).await;

    link.events
        .send(WireEvent::Disconnected {
            reason: Some("Closing link".into()),
        })
        .await
        .unwrap();
    eventually("second attempt", || transport.calls() == 2).await;
    assert_eq!(sink.event_count(host_events::DISCONNECTED), 1);
    assert_eq!(bridge.last_error().as_deref(), Some("Closing link"));
}

#[tokio::test]
async fn transport_error_event_fails_with_code_and_reconnects() {
    let mut config = config();
    config.reconnect.delay_ms = 200;
    let (bridge, transport, sink) = bridge_with(config, FakeTransport::default());
    let link = registered(&bridge, &transport).await;

    link.events
        .send(WireEvent::Error("read failed".into()))
        .await
        .unwrap();
    eventually("error state", || bridge.state() == ConnectionState::Error).await;
    assert_eq!(
        sink.variable(vars::LAST_ERROR_CODE),
        Some(Value::from("transport"))
    );
    assert!(bridge.last_error().unwrap().contains("read failed"));
    eventually("second attempt", || transport.calls() == 2).await;
}

#[tokio::test]
async fn manual_disconnect_quits_and_does_not_reconnect() {
    let (bridge, transport, sink) = bridge_with(config(), FakeTransport::default());
    let mut link = registered(&bridge, &transport).await;

    bridge.disconnect(Some("bye".into())).await;
    let quit = next_outbound(&mut link, |c| matches!(c, Command::QUIT(_))).await;
    assert_eq!(quit, Message::quit_with_message("bye"));
    assert_eq!(bridge.state(), ConnectionState::Disconnected);
    assert_eq!(sink.event_count(host_events::DISCONNECTED), 1);

    sleep(Duration::from_millis(80)).await;
    assert_eq!(transport.calls(), 1);
    assert!(matches!(
        bridge.send_raw("PING x").await,
        Err(BridgeError::NotConnected)
    ));
}

#[tokio::test]
async fn stale_connect_completion_is_discarded() {
    let (bridge, transport, _) = bridge_with(
        config(),
        FakeTransport {
            delay: Duration::from_millis(50),
            ..Default::default()
        },
    );

    let connecting = bridge.clone();
    let attempt = tokio::spawn(async move { connecting.connect().await });
    sleep(Duration::from_millis(10)).await;
    bridge.disconnect(None).await;
    attempt.await.unwrap();

    assert_eq!(bridge.state(), ConnectionState::Disconnected);
    let link = transport.take_link();
    // The handle was closed, so nobody is listening for events any more.
    assert!(link.events.is_closed());
}

#[tokio::test]
async fn raw_lines_are_parsed_before_sending() {
    let (bridge, transport, _) = bridge_with(config(), FakeTransport::default());
    let mut link = registered(&bridge, &transport).await;

    bridge.send_raw("PRIVMSG #test :hello there").await.unwrap();
    let sent = next_outbound(&mut link, |c| matches!(c, Command::PRIVMSG(..))).await;
    assert_eq!(sent, Message::privmsg("#test", "hello there"));

    bridge.send_action("#test", "waves").await.unwrap();
    let sent = next_outbound(&mut link, |c| matches!(c, Command::PRIVMSG(..))).await;
    assert_eq!(sent, Message::privmsg("#test", "\u{1}ACTION waves\u{1}"));
}

#[tokio::test]
async fn manual_disconnect_cancels_pending_reconnect() {
    let mut config = config();
    config.reconnect.delay_ms = 300;
    let (bridge, transport, _) = bridge_with(config, FakeTransport::default());
    let link = registered(&bridge, &transport).await;

    link.events
        .send(WireEvent::Disconnected { reason: None })
        .await
        .unwrap();
    eventually("connection lost", || {
        bridge.state() == ConnectionState::Disconnected
    })
    .await;

    bridge.disconnect(None).await;
    sleep(Duration::from_millis(600)).await;
    assert_eq!(transport.calls(), 1);
    assert_eq!(bridge.state(), ConnectionState::Disconnected);

    // A later connect still works and can schedule reconnects again.
    bridge.connect().await;
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn handle_without_event_stream_is_a_transport_failure() {
    let (bridge, transport, sink) = bridge_with(
        config(),
        FakeTransport {
            no_events: true,
            ..Default::default()
        },
    );

    bridge.connect().await;
    assert_eq!(bridge.state(), ConnectionState::Error);
    let error = bridge.last_error().unwrap();
    assert!(error.contains("event stream"), "{error}");
    assert_eq!(
        sink.variable(vars::LAST_ERROR_CODE),
        Some(Value::from("transport"))
    );

    eventually("retry", || transport.calls() >= 2).await;
    bridge.stop().await;
    assert_eq!(bridge.state(), ConnectionState::Disconnected);
}

async fn joined(bridge: &Bridge, transport: &FakeTransport) -> FakeLink {
    let link = registered(bridge, transport).await;
    link.events
        .send(WireEvent::Joined {
            channel: "#test".into(),
            nick: "Rover".into(),
        })
        .await
        .unwrap();
    eventually("joined", || bridge.state() == ConnectionState::Joined).await;
    link
}

/// Channel teardown is published before connection teardown.
fn assert_channel_then_connection_teardown(sink: &RecordingSink, from: usize) {
    let channel = sink.position("ChannelStatus=NotJoined", from);
    let members = sink.position("MemberCount=0", from);
    let left = sink.position("event:Left", from);
    let state = sink.position("ConnectionStatus=Disconnected", from);
    let disconnected = sink.position("event:Disconnected", from);
    assert!(channel < state && members < state, "channel variables first");
    assert!(left < state, "Left before the state change");
    assert!(state < disconnected, "state before Disconnected");
}

#[tokio::test]
async fn manual_disconnect_tears_down_channel_before_connection() {
    let (bridge, transport, sink) = bridge_with(config(), FakeTransport::default());
    let _link = joined(&bridge, &transport).await;
    let from = sink.history_len();

    bridge.disconnect(None).await;
    assert_channel_then_connection_teardown(&sink, from);
    assert_eq!(bridge.channel(), None);
}

#[tokio::test]
async fn connection_loss_tears_down_channel_before_connection() {
    let mut config = config();
    config.reconnect.enabled = false;
    let (bridge, transport, sink) = bridge_with(config, FakeTransport::default());
    let link = joined(&bridge, &transport).await;
    let from = sink.history_len();

    link.events
        .send(WireEvent::Disconnected {
            reason: Some("Ping timeout".into()),
        })
        .await
        .unwrap();
    eventually("disconnected", || {
        sink.event_count(host_events::DISCONNECTED) == 1
    })
    .await;
    assert_channel_then_connection_teardown(&sink, from);
    assert_eq!(bridge.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn nickserv_without_password_joins_immediately() {
    let mut config = config();
    config.nickserv.enabled = true;
    config.nickserv.password.clear();
    config.nickserv.delay_ms = 5_000;
    let (bridge, transport, _) = bridge_with(config, FakeTransport::default());

    bridge.start().await;
    assert_eq!(transport.calls(), 1);
    assert_eq!(bridge.state(), ConnectionState::Connecting);

    let mut link = transport.take_link();
    link.events
        .send(WireEvent::Registered { nick: "Rover".into() })
        .await
        .unwrap();
    let first = next_outbound(&mut link, |c| {
        matches!(c, Command::JOIN(..) | Command::PRIVMSG(..))
    })
    .await;
    assert_eq!(first, Message::join("#test"));
    assert_eq!(bridge.last_error(), None);
    bridge.stop().await;
}
