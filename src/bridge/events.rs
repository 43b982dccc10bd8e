//! Connection event dispatch.
//!
//! One event loop runs per connection, under the connection's cancellation
//! token. Handlers are synchronous; anything that sends or waits is spawned
//! under the narrowest owning scope.

use super::Inner;
use super::tasks::{spawn_after, spawn_scoped};
use crate::host::{Value, events as host_events, params, vars};
use crate::identity::AnnounceTarget;
use crate::nick::NicknameConflict;
use crate::responder::CommandResponder;
use crate::state::{ConnectionState, normalize_channel};
use crate::telemetry::spans;
use crate::error::BridgeError;
use crate::wire::{MessageKind, TransportError, WireEvent, WireSender};
use serde_json::json;
use slirc_proto::{Message, Response, irc_eq};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span, debug, info, warn};

impl Inner {
    pub(super) fn spawn_event_loop(
        self: &Arc<Self>,
        generation: u64,
        events: mpsc::Receiver<WireEvent>,
        token: CancellationToken,
        span: Span,
    ) {
        let inner = Arc::clone(self);
        tokio::spawn(inner.run_events(generation, events, token).instrument(span));
    }

    async fn run_events(
        self: Arc<Self>,
        generation: u64,
        mut events: mpsc::Receiver<WireEvent>,
        token: CancellationToken,
    ) {
        loop {
            let event = tokio::select! {
                biased;
                _ = token.cancelled() => return,
                event = events.recv() => event,
            };
            match event {
                Some(event) => self.dispatch(generation, event),
                None => {
                    self.on_connection_lost(generation, None, false);
                    return;
                }
            }
        }
    }

    fn dispatch(self: &Arc<Self>, generation: u64, event: WireEvent) {
        match event {
            WireEvent::RawReceived(line) => self.log_traffic("in", &line),
            WireEvent::RawSent(line) => self.log_traffic("out", &line),
            WireEvent::Registered { nick } => self.on_registered(generation, nick),
            WireEvent::Reply { response, params } => match response {
                Response::RPL_ISUPPORT => self.on_isupport(generation, &params),
                Response::RPL_NAMREPLY => self.on_names(&params),
                Response::RPL_ENDOFNAMES => {
                    self.publish_member_count(self.tracker.member_count());
                }
                Response::ERR_NICKNAMEINUSE => self.on_nickname_in_use(generation),
                response if response.is_error() => {
                    debug!(code = response.code(), params = ?params, "Error reply from server");
                }
                _ => {}
            },
            WireEvent::Joined { channel, nick } => {
                if self.is_local(&nick) {
                    self.on_self_joined(generation, &channel);
                } else {
                    self.on_member_joined(&channel, &nick);
                }
            }
            WireEvent::Parted { channel, nick, .. } => {
                if self.is_local(&nick) {
                    self.on_self_left(&channel);
                } else {
                    self.on_member_left(&channel, &nick);
                }
            }
            WireEvent::Kicked {
                channel,
                nick,
                by,
                reason,
            } => {
                if self.is_local(&nick) {
                    info!(channel = %channel, by = ?by, reason = ?reason, "Kicked from channel");
                    self.on_self_left(&channel);
                } else {
                    self.on_member_left(&channel, &nick);
                }
            }
            WireEvent::Quit { nick, .. } => {
                if let Some(count) = self.tracker.member_quit(&nick) {
                    self.publish_member_count(count);
                    self.pulse(params::USER_LEFT);
                }
            }
            WireEvent::NickChanged { old, new } => self.on_nick_changed(&old, &new),
            WireEvent::Message {
                from,
                target,
                text,
                kind,
            } => self.on_message(&from, &target, &text, kind),
            WireEvent::Disconnected { reason } => {
                self.on_connection_lost(generation, reason, false);
            }
            WireEvent::Error(message) => self.on_connection_lost(generation, Some(message), true),
        }
    }

    fn is_local(&self, nick: &str) -> bool {
        irc_eq(&self.session.lock().current_nick, nick)
    }

    fn on_registered(self: &Arc<Self>, generation: u64, nick: String) {
        let channel = Some(self.config.identity.channel.trim())
            .filter(|c| !c.is_empty())
            .map(normalize_channel);

        let (sender, token, nick) = {
            let mut session = self.session.lock();
            if session.generation != generation {
                return;
            }
            if !nick.is_empty() {
                session.current_nick = nick;
            }
            self.set_state(&mut session, ConnectionState::Connected);
            session.last_error = None;
            session.responder = self
                .config
                .responder
                .enabled
                .then(|| CommandResponder::new(&session.current_nick));
            let Some(connection) = &session.connection else {
                return;
            };
            (
                connection.handle.sender(),
                connection.token.clone(),
                session.current_nick.clone(),
            )
        };

        info!(nick = %nick, "Registered");
        self.sink.set_variable(vars::NICKNAME, Value::from(nick.as_str()));
        self.sink.emit_event(
            host_events::CONNECTED,
            json!({ "nick": nick, "server": self.config.server.address }),
        );

        let nickserv = &self.config.nickserv;
        if nickserv.enabled && !nickserv.password.is_empty() {
            let text = match nickserv.account.as_deref().filter(|a| !a.is_empty()) {
                Some(account) => format!("IDENTIFY {account} {}", nickserv.password),
                None => format!("IDENTIFY {}", nickserv.password),
            };
            let identify = Message::privmsg(&nickserv.service, text);
            let inner = Arc::clone(self);
            let delayed_sender = sender.clone();
            spawn_after(&token, nickserv.delay(), async move {
                if !inner.is_current(generation) {
                    return;
                }
                debug!(service = %inner.config.nickserv.service, "Identifying with nickname service");
                if let Err(e) = delayed_sender.send(identify).await {
                    debug!(error = %e, "Identify not delivered");
                    return;
                }
                if let Some(channel) = channel {
                    inner.issue_join(generation, &delayed_sender, channel).await;
                }
            });
        } else if let Some(channel) = channel {
            let inner = Arc::clone(self);
            spawn_scoped(&token, async move {
                inner.issue_join(generation, &sender, channel).await;
            });
        }
    }

    async fn issue_join(&self, generation: u64, sender: &WireSender, channel: String) {
        {
            let mut session = self.session.lock();
            if session.generation != generation || !session.state.is_registered() {
                return;
            }
            self.set_state(&mut session, ConnectionState::Joining);
        }
        self.sink
            .set_variable(vars::CHANNEL_STATUS, Value::from("Joining"));
        info!(channel = %channel, "Joining channel");
        if let Err(e) = sender.send(Message::join(&channel)).await {
            debug!(error = %e, "JOIN not delivered");
        }
    }

    fn on_isupport(&self, generation: u64, params: &[String]) {
        let mut session = self.session.lock();
        if session.generation != generation {
            return;
        }
        session.limits.parse(params, |kind, value| {
            debug!(limit = kind.as_str(), value, "Server limit updated");
        });
    }

    /// `<client> <symbol> <channel> :<names>`
    fn on_names(&self, params: &[String]) {
        let [.., channel, names] = params else {
            return;
        };
        self.tracker.add_names(channel, names.split_whitespace());
    }

    fn on_nickname_in_use(&self, generation: u64) {
        let (candidate, attempt, sender, token) = {
            let mut session = self.session.lock();
            if session.generation != generation {
                return;
            }
            let max_len = session.limits.nick_max_len;
            let base = session.requested_nick.clone();
            let conflict = session
                .conflict
                .get_or_insert_with(|| NicknameConflict::new(base));
            let candidate = conflict.next_candidate(max_len);
            let attempt = conflict.count;
            if !session.state.is_registered() {
                session.current_nick = candidate.clone();
            }
            let Some(connection) = &session.connection else {
                return;
            };
            (
                candidate,
                attempt,
                connection.handle.sender(),
                connection.token.clone(),
            )
        };

        info!(candidate = %candidate, attempt, "Nickname in use, trying alternative");
        send_scoped(&token, sender, Message::nick(candidate));
    }

    fn on_self_joined(self: &Arc<Self>, generation: u64, channel: &str) {
        let (connection_token, nick) = {
            let session = self.session.lock();
            if session.generation != generation {
                return;
            }
            let Some(connection) = &session.connection else {
                return;
            };
            (connection.token.clone(), session.current_nick.clone())
        };

        let channel_token = self.tracker.attach(channel, &nick, &connection_token);
        {
            let mut session = self.session.lock();
            self.set_state(&mut session, ConnectionState::Joined);
        }

        info!(channel = %channel, "Joined channel");
        self.sink.set_variable(vars::CHANNEL_STATUS, Value::from("Joined"));
        self.sink
            .emit_event(host_events::JOINED, json!({ "channel": channel }));
        self.publish_member_count(self.tracker.member_count());

        self.announcer.reset();
        if self.config.announcer.enabled {
            let target: Arc<dyn AnnounceTarget> = Arc::new(ChannelTarget {
                inner: Arc::clone(self),
                generation,
            });
            let announcer = Arc::clone(&self.announcer);
            let timing = self.config.announcer.clone();
            tokio::spawn(
                announcer
                    .run(target, timing, channel_token)
                    .instrument(spans::channel(channel)),
            );
        }
    }

    fn on_self_left(&self, channel: &str) {
        if !self.tracker.is_tracking(channel) {
            return;
        }
        self.tracker.detach();
        {
            let mut session = self.session.lock();
            if matches!(
                session.state,
                ConnectionState::Joining | ConnectionState::Joined
            ) {
                self.set_state(&mut session, ConnectionState::Connected);
            }
        }
        self.publish_channel_left(channel);
    }

    fn on_member_joined(self: &Arc<Self>, channel: &str, nick: &str) {
        let local = self.session.lock().current_nick.clone();
        if let Some(count) = self.tracker.member_joined(channel, nick, &local) {
            debug!(channel = %channel, nick = %nick, count, "Member joined");
            self.publish_member_count(count);
            self.pulse(params::USER_JOINED);
        }
    }

    fn on_member_left(self: &Arc<Self>, channel: &str, nick: &str) {
        let local = self.session.lock().current_nick.clone();
        if let Some(count) = self.tracker.member_left(channel, nick, &local) {
            debug!(channel = %channel, nick = %nick, count, "Member left");
            self.publish_member_count(count);
            self.pulse(params::USER_LEFT);
        }
    }

    fn on_nick_changed(&self, old: &str, new: &str) {
        let is_self = {
            let mut session = self.session.lock();
            if irc_eq(&session.current_nick, old) {
                session.current_nick = new.to_string();
                if session.responder.is_some() {
                    session.responder = Some(CommandResponder::new(new));
                }
                true
            } else {
                false
            }
        };
        self.tracker.member_renamed(old, new);

        if is_self {
            info!(old = %old, new = %new, "Nickname changed");
            self.sink.set_variable(vars::NICKNAME, Value::from(new));
            self.sink.emit_event(
                host_events::NICKNAME_CHANGED,
                json!({ "old": old, "new": new }),
            );
        }
    }

    fn on_message(self: &Arc<Self>, from: &str, target: &str, text: &str, kind: MessageKind) {
        if !self.tracker.is_tracking(target) || self.is_local(from) {
            return;
        }

        self.sink.set_variable(vars::LAST_MESSAGE, Value::from(text));
        self.sink.set_variable(vars::LAST_SENDER, Value::from(from));
        self.sink.emit_event(
            host_events::CHAT_MESSAGE,
            json!({
                "channel": target,
                "from": from,
                "text": text,
                "action": kind == MessageKind::Action,
            }),
        );
        self.pulse(params::MESSAGE_RECEIVED);

        if kind == MessageKind::Notice {
            return;
        }
        let (replies, sender) = {
            let session = self.session.lock();
            let Some(responder) = &session.responder else {
                return;
            };
            let Some(connection) = &session.connection else {
                return;
            };
            (
                responder.respond(from, target, text),
                connection.handle.sender(),
            )
        };
        let Some(token) = self.tracker.token() else {
            return;
        };
        for reply in replies {
            debug!(verb = ?reply.verb, to = %from, "Answering command");
            send_scoped(
                &token,
                sender.clone(),
                Message::privmsg(reply.target, reply.text),
            );
        }
    }

    /// Tear down after the transport reported a closed or failed connection.
    fn on_connection_lost(self: &Arc<Self>, generation: u64, reason: Option<String>, is_error: bool) {
        let connection = {
            let mut session = self.session.lock();
            if session.generation != generation {
                return;
            }
            session.responder = None;
            session.connection.take()
        };

        if let Some(channel) = self.tracker.detach() {
            self.publish_channel_left(&channel);
        }
        if let Some(connection) = connection {
            connection.token.cancel();
            connection.handle.close();
        }
        if self.manual_disconnect.load(Ordering::SeqCst) {
            return;
        }

        {
            let mut session = self.session.lock();
            if is_error {
                let message = reason.clone().unwrap_or_else(|| "connection error".to_string());
                self.fail(&mut session, &BridgeError::from(TransportError::Lost(message)));
            } else {
                warn!(reason = ?reason, "Connection lost");
                self.set_state(&mut session, ConnectionState::Disconnected);
                if let Some(reason) = &reason {
                    self.sink
                        .set_variable(vars::LAST_ERROR, Value::from(reason.as_str()));
                    session.last_error = Some(reason.clone());
                }
            }
        }
        self.sink.emit_event(
            host_events::DISCONNECTED,
            json!({ "manual": false, "reason": reason }),
        );
        self.schedule_reconnect();
    }

    fn is_current(&self, generation: u64) -> bool {
        !self.stopping.load(Ordering::SeqCst) && self.session.lock().generation == generation
    }

    fn publish_member_count(&self, count: usize) {
        self.sink.set_variable(vars::MEMBER_COUNT, Value::from(count));
    }

    /// Raise a pulse parameter and drop it again after the pulse width.
    fn pulse(self: &Arc<Self>, name: &'static str) {
        if self.stopping.load(Ordering::SeqCst) {
            return;
        }
        self.sink.send_parameter(name, Value::Bool(true));
        let inner = Arc::clone(self);
        spawn_after(&self.tasks.root(), self.config.announcer.pulse(), async move {
            if !inner.stopping.load(Ordering::SeqCst) {
                inner.sink.send_parameter(name, Value::Bool(false));
            }
        });
    }
}

fn send_scoped(token: &CancellationToken, sender: WireSender, out: Message) {
    spawn_scoped(token, async move {
        if let Err(e) = sender.send(out).await {
            debug!(error = %e, "Send dropped");
        }
    });
}

/// Announcement target bound to one connection generation.
struct ChannelTarget {
    inner: Arc<Inner>,
    generation: u64,
}

impl AnnounceTarget for ChannelTarget {
    fn target(&self) -> Option<(WireSender, String)> {
        if !self.inner.is_current(self.generation) {
            return None;
        }
        let sender = {
            let session = self.inner.session.lock();
            if session.state != ConnectionState::Joined {
                return None;
            }
            session.connection.as_ref()?.handle.sender()
        };
        let channel = self.inner.tracker.channel()?;
        Some((sender, channel))
    }

    fn ready(&self) {
        let Some((_, channel)) = self.target() else {
            return;
        };
        info!(channel = %channel, "Bridge ready");
        self.inner
            .sink
            .emit_event(host_events::READY, json!({ "channel": channel }));
    }
}
