//! Connection Lifecycle Manager.
//!
//! [`Bridge`] owns the single server connection and drives it through the
//! [`ConnectionState`] machine. Public operations never surface connection
//! failures: they become state transitions and host-visible variables. Only
//! the `send_*` family returns errors, failing fast with
//! [`BridgeError::NotConnected`].
//!
//! Event dispatch lives in [`events`]; owned timers in [`tasks`].

mod events;
mod tasks;

use crate::classify::MessageClass;
use crate::config::validation::warnings;
use crate::config::{Config, validate};
use crate::error::{BridgeError, BridgeResult};
use crate::host::{
    HashingProvider, HostSink, Sha256Hasher, StaticUserState, TracingSink, UserState, Value,
    events as host_events, vars,
};
use crate::identity::{IdentityAnnouncer, PayloadBuilder, PayloadInfo};
use crate::nick::NicknameConflict;
use crate::responder::CommandResponder;
use crate::state::{ChannelTracker, ConnectionState, ServerLimits, normalize_channel};
use crate::telemetry::spans;
use crate::wire::{
    ConnectParams, TcpTransport, Transport, TransportError, WireHandle, WireSender,
};
use parking_lot::Mutex;
use serde_json::json;
use slirc_proto::Message;
use slirc_proto::ctcp::Ctcp;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tasks::TaskScope;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, warn};

/// External collaborators the bridge drives.
#[derive(Clone)]
pub struct Collaborators {
    pub transport: Arc<dyn Transport>,
    pub sink: Arc<dyn HostSink>,
    pub hashing: Arc<dyn HashingProvider>,
    pub user: Arc<dyn UserState>,
}

impl Collaborators {
    /// Standalone defaults: TCP transport, tracing sink, SHA-256 hashing and
    /// user state taken from the `[host]` section.
    pub fn from_config(config: &Config) -> Self {
        Self {
            transport: Arc::new(TcpTransport),
            sink: Arc::new(TracingSink),
            hashing: Arc::new(Sha256Hasher::new(
                config.hashing.salt.clone(),
                config.hashing.external_ip_url.clone(),
            )),
            user: Arc::new(StaticUserState::new(
                config.host.user_id.clone(),
                config.host.display_name.clone(),
            )),
        }
    }
}

/// The live connection owned by the session.
struct Connection {
    handle: WireHandle,
    token: CancellationToken,
}

/// Mutable session state. Guarded by one lock, never held across an await.
#[derive(Default)]
struct Session {
    state: ConnectionState,
    /// Bumped on every connect and disconnect; stale completions compare against it.
    generation: u64,
    limits: ServerLimits,
    conflict: Option<NicknameConflict>,
    connection: Option<Connection>,
    /// Nickname we asked for; the base for conflict resolution.
    requested_nick: String,
    /// Nickname the server knows us by (or the pending candidate before 001).
    current_nick: String,
    responder: Option<CommandResponder>,
    last_error: Option<String>,
}

struct Inner {
    config: Config,
    transport: Arc<dyn Transport>,
    sink: Arc<dyn HostSink>,
    hashing: Arc<dyn HashingProvider>,
    user: Arc<dyn UserState>,
    session: Mutex<Session>,
    tracker: ChannelTracker,
    announcer: Arc<IdentityAnnouncer>,
    tasks: TaskScope,
    stopping: AtomicBool,
    manual_disconnect: AtomicBool,
    reconnect_pending: AtomicBool,
    attempts: AtomicU64,
}

/// Handle to a bridge instance. Cheap to clone.
#[derive(Clone)]
pub struct Bridge {
    inner: Arc<Inner>,
}

impl Bridge {
    pub fn new(config: Config, collaborators: Collaborators) -> Self {
        let builder = PayloadBuilder::new(PayloadInfo::for_host(
            &config.host.app_name,
            &config.host.app_version,
        ));
        let announcer = Arc::new(IdentityAnnouncer::new(
            builder,
            Arc::clone(&collaborators.hashing),
            Arc::clone(&collaborators.user),
        ));
        Self {
            inner: Arc::new(Inner {
                config,
                transport: collaborators.transport,
                sink: collaborators.sink,
                hashing: collaborators.hashing,
                user: collaborators.user,
                session: Mutex::new(Session::default()),
                tracker: ChannelTracker::new(),
                announcer,
                tasks: TaskScope::default(),
                stopping: AtomicBool::new(false),
                manual_disconnect: AtomicBool::new(false),
                reconnect_pending: AtomicBool::new(false),
                attempts: AtomicU64::new(0),
            }),
        }
    }

    /// Bridge with the standalone collaborators.
    pub fn standalone(config: Config) -> Self {
        let collaborators = Collaborators::from_config(&config);
        Self::new(config, collaborators)
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    // === Lifecycle hooks ===

    /// Host start hook: clear the stopping flag and connect.
    pub async fn start(&self) {
        info!("Bridge starting");
        for warning in warnings(&self.inner.config) {
            warn!("{warning}");
        }
        self.inner.stopping.store(false, Ordering::SeqCst);
        self.inner.tasks.renew();
        self.connect().await;
    }

    /// Host stop hook: suppress reconnects, cancel every owned task, disconnect.
    pub async fn stop(&self) {
        info!("Bridge stopping");
        self.inner.stopping.store(true, Ordering::SeqCst);
        self.inner.tasks.cancel_all();
        self.disconnect(None).await;
    }

    /// Start a connection attempt.
    ///
    /// Returns immediately if a connection is active or being established.
    pub async fn connect(&self) {
        Inner::connect(&self.inner).await;
    }

    /// Tear down the connection, sending QUIT with `reason` if registered.
    pub async fn disconnect(&self, reason: Option<String>) {
        self.inner.disconnect(reason).await;
    }

    // === Sending ===

    pub async fn send_raw(&self, line: impl Into<String>) -> BridgeResult {
        let sender = self.inner.registered_sender()?;
        let line = line.into();
        let message = line
            .trim_end_matches(['\r', '\n'])
            .parse::<Message>()
            .map_err(|e| TransportError::InvalidLine(e.to_string()))?;
        sender.send(message).await?;
        Ok(())
    }

    pub async fn send_message(&self, target: &str, text: &str) -> BridgeResult {
        let sender = self.inner.registered_sender()?;
        sender
            .send(Message::privmsg(target, text))
            .await?;
        Ok(())
    }

    /// Send a CTCP ACTION.
    pub async fn send_action(&self, target: &str, text: &str) -> BridgeResult {
        let sender = self.inner.registered_sender()?;
        sender
            .send(Message::privmsg(target, Ctcp::action(text).to_string()))
            .await?;
        Ok(())
    }

    pub async fn send_notice(&self, target: &str, text: &str) -> BridgeResult {
        let sender = self.inner.registered_sender()?;
        sender
            .send(Message::notice(target, text))
            .await?;
        Ok(())
    }

    /// Request a new nickname. The change is tracked once the server confirms it.
    pub async fn change_nickname(&self, nick: &str) -> BridgeResult {
        let sender = self.inner.registered_sender()?;
        {
            let mut session = self.inner.session.lock();
            session.requested_nick = nick.to_string();
            session.conflict = None;
        }
        sender.send(Message::nick(nick)).await?;
        Ok(())
    }

    /// Join `name` (a leading `#` is added if missing).
    pub async fn join_channel(&self, name: &str) -> BridgeResult {
        let sender = self.inner.registered_sender()?;
        let channel = normalize_channel(name);
        {
            let mut session = self.inner.session.lock();
            if session.state == ConnectionState::Connected {
                self.inner.set_state(&mut session, ConnectionState::Joining);
            }
        }
        sender.send(Message::join(channel)).await?;
        Ok(())
    }

    pub async fn leave_channel(&self, name: &str, reason: Option<&str>) -> BridgeResult {
        let sender = self.inner.registered_sender()?;
        let channel = normalize_channel(name);
        let part = match reason {
            Some(reason) => Message::part_with_message(channel, reason),
            None => Message::part(channel),
        };
        sender.send(part).await?;
        Ok(())
    }

    // === Accessors ===

    pub fn state(&self) -> ConnectionState {
        self.inner.session.lock().state
    }

    /// Nickname the server currently knows us by.
    pub fn current_nickname(&self) -> String {
        self.inner.session.lock().current_nick.clone()
    }

    pub fn limits(&self) -> ServerLimits {
        self.inner.session.lock().limits
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.session.lock().last_error.clone()
    }

    /// Name of the tracked channel, if joined.
    pub fn channel(&self) -> Option<String> {
        self.inner.tracker.channel()
    }

    /// Sorted members of `channel` (default: the tracked channel).
    pub fn member_list(&self, channel: Option<&str>) -> Vec<String> {
        self.inner.tracker.member_list(channel)
    }

    pub fn member_count(&self) -> usize {
        self.inner.tracker.member_count()
    }
}

impl Inner {
    async fn connect(self: &Arc<Self>) {
        if self.stopping.load(Ordering::SeqCst) {
            debug!("Connect ignored: bridge is stopping");
            return;
        }

        let (generation, params, token) = {
            let mut session = self.session.lock();
            if session.state.is_active() {
                debug!(state = %session.state, "Connect ignored: connection already active");
                return;
            }
            if let Some(stale) = session.connection.take() {
                debug!("Disposing stale connection");
                stale.token.cancel();
                stale.handle.close();
            }
            session.limits.reset_to_defaults();
            session.conflict = None;
            session.responder = None;
            session.generation += 1;
            let generation = session.generation;
            self.set_state(&mut session, ConnectionState::Connecting);

            if let Err(errors) = validate(&self.config) {
                // Configuration errors are never retried.
                self.fail(&mut session, &BridgeError::from(errors));
                return;
            }

            let nick = self.requested_nickname();
            session.requested_nick = nick.clone();
            session.current_nick = nick.clone();
            let params = self.connect_params(&session.limits, nick);
            (generation, params, self.tasks.connection_scope())
        };

        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        let span = spans::connection(&params.address, params.port, attempt);
        let limit = self.config.server.connect_timeout();

        let result = async {
            info!(nick = %params.nick, tls = params.use_tls, "Connecting");
            match timeout(limit, self.transport.connect(params)).await {
                Ok(Ok(handle)) => Ok(handle),
                Ok(Err(e)) => Err(BridgeError::from(e)),
                Err(_) => Err(BridgeError::from(TransportError::Timeout(
                    u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                ))),
            }
        }
        .instrument(span.clone())
        .await
        .and_then(|mut handle| match handle.take_events() {
            Some(events) => Ok((handle, events)),
            None => {
                handle.close();
                Err(BridgeError::from(TransportError::NoEventStream))
            }
        });

        let (handle, events) = match result {
            Ok(connected) => connected,
            Err(e) => {
                token.cancel();
                {
                    let mut session = self.session.lock();
                    if session.generation != generation {
                        return;
                    }
                    span.in_scope(|| warn!(error = %e, "Connection attempt failed"));
                    self.fail(&mut session, &e);
                }
                if e.is_retryable() {
                    self.schedule_reconnect();
                }
                return;
            }
        };

        {
            let mut session = self.session.lock();
            if session.generation != generation
                || session.state != ConnectionState::Connecting
                || self.stopping.load(Ordering::SeqCst)
            {
                debug!("Discarding connection that completed after cancellation");
                token.cancel();
                handle.close();
                return;
            }
            session.connection = Some(Connection {
                handle,
                token: token.clone(),
            });
        }

        span.in_scope(|| info!("Connection established, registering"));
        self.spawn_event_loop(generation, events, token, span);
    }

    async fn disconnect(self: &Arc<Self>, reason: Option<String>) {
        self.manual_disconnect.store(true, Ordering::SeqCst);
        self.tasks.cancel_reconnect();
        self.reconnect_pending.store(false, Ordering::SeqCst);

        let (connection, was_active, was_registered) = {
            let mut session = self.session.lock();
            // Invalidates in-flight connects and pending delayed tasks.
            session.generation += 1;
            session.responder = None;
            (
                session.connection.take(),
                session.state.is_active(),
                session.state.is_registered(),
            )
        };

        // Channel-scoped handlers first, then connection-scoped ones.
        if let Some(channel) = self.tracker.detach() {
            self.publish_channel_left(&channel);
        }

        if let Some(connection) = connection {
            connection.token.cancel();
            if was_registered {
                let reason = reason.unwrap_or_else(|| self.config.disconnect.quit_message.clone());
                match connection.handle.send(Message::quit_with_message(reason)).await {
                    Ok(()) => sleep(self.config.disconnect.grace()).await,
                    Err(e) => debug!(error = %e, "QUIT not delivered"),
                }
            }
            // Dropping the handle would also abort the I/O task.
            connection.handle.close();
            info!("Disconnected");
        }

        {
            let mut session = self.session.lock();
            self.set_state(&mut session, ConnectionState::Disconnected);
        }
        if was_active {
            self.sink
                .emit_event(host_events::DISCONNECTED, json!({ "manual": true }));
        }
        self.manual_disconnect.store(false, Ordering::SeqCst);
    }

    /// Reconnect after the configured delay unless stopping or already pending.
    fn schedule_reconnect(self: &Arc<Self>) {
        if !self.config.reconnect.enabled
            || self.stopping.load(Ordering::SeqCst)
            || self.manual_disconnect.load(Ordering::SeqCst)
        {
            return;
        }
        if self.reconnect_pending.swap(true, Ordering::SeqCst) {
            debug!("Reconnect already scheduled");
            return;
        }

        let delay = self.config.reconnect.delay();
        info!(delay_ms = delay.as_millis() as u64, "Reconnecting after delay");

        // Cancelled by a manual disconnect or a stop, which clear the pending flag.
        let scope = self.tasks.reconnect_scope();
        let inner = Arc::clone(self);
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = scope.cancelled() => {}
                _ = sleep(delay) => {
                    inner.reconnect_pending.store(false, Ordering::SeqCst);
                    if !scope.is_cancelled() && !inner.stopping.load(Ordering::SeqCst) {
                        Inner::connect(&inner).await;
                    }
                }
            }
        });
    }

    /// Sender for the live, registered connection.
    fn registered_sender(&self) -> Result<WireSender, BridgeError> {
        if self.stopping.load(Ordering::SeqCst) {
            return Err(BridgeError::Stopping);
        }
        let session = self.session.lock();
        match &session.connection {
            Some(connection) if session.state.is_registered() => Ok(connection.handle.sender()),
            _ => Err(BridgeError::NotConnected),
        }
    }

    /// Configured nickname, else the host display name, else the fallback.
    fn requested_nickname(&self) -> String {
        let configured = self.config.identity.nickname.trim();
        if !configured.is_empty() {
            return configured.to_string();
        }
        if let Some(display) = self.user.display_name() {
            let nick: String = display
                .split_whitespace()
                .collect::<Vec<_>>()
                .join("_");
            if !nick.is_empty() {
                return nick;
            }
        }
        self.config.identity.fallback_nickname.clone()
    }

    /// Username and realname are always the machine hash, never the nickname.
    fn connect_params(&self, limits: &ServerLimits, nick: String) -> ConnectParams {
        let machine = self.hashing.machine_hash();
        let server = &self.config.server;
        ConnectParams {
            address: server.address.clone(),
            port: u16::try_from(server.port).unwrap_or_default(),
            use_tls: server.tls,
            password: server.password.clone().filter(|p| !p.is_empty()),
            nick,
            username: truncate(&machine, limits.nick_max_len),
            realname: truncate(&machine, limits.realname_max_len),
        }
    }

    fn set_state(&self, session: &mut Session, next: ConnectionState) {
        if session.state == next {
            return;
        }
        if !session.state.can_transition_to(next) {
            debug!(from = %session.state, to = %next, "Unexpected state transition");
        }
        debug!(from = %session.state, to = %next, "State transition");
        session.state = next;
        self.sink
            .set_variable(vars::CONNECTION_STATUS, Value::from(next.as_str()));
    }

    fn fail(&self, session: &mut Session, error: &BridgeError) {
        let message = error.to_string();
        let code = error.error_code();
        warn!(error = %message, code, "Bridge error");
        self.set_state(session, ConnectionState::Error);
        self.sink
            .set_variable(vars::LAST_ERROR, Value::from(message.as_str()));
        self.sink
            .set_variable(vars::LAST_ERROR_CODE, Value::from(code));
        session.last_error = Some(message);
    }

    fn publish_channel_left(&self, channel: &str) {
        info!(channel = %channel, "Left channel");
        self.sink
            .set_variable(vars::CHANNEL_STATUS, Value::from("NotJoined"));
        self.sink.set_variable(vars::MEMBER_COUNT, Value::from(0usize));
        self.sink
            .emit_event(host_events::LEFT, json!({ "channel": channel }));
    }

    /// Log a raw line under its class target, honoring the logging toggles.
    fn log_traffic(&self, direction: &'static str, line: &str) {
        let class = if direction == "out" && self.announcer.is_own_broadcast(line) {
            MessageClass::System
        } else {
            crate::classify::classify(line)
        };
        let logging = &self.config.logging;
        let enabled = match class {
            MessageClass::Chat => logging.chat,
            MessageClass::System => logging.system,
            MessageClass::Event => logging.events,
        };
        if !enabled {
            return;
        }
        let line = crate::classify::sanitize(line);
        match class {
            MessageClass::Chat => info!(target: "irc::chat", direction, "{line}"),
            MessageClass::System => debug!(target: "irc::system", direction, "{line}"),
            MessageClass::Event => info!(target: "irc::event", direction, "{line}"),
        }
    }
}

/// Truncate to at most `max` characters.
fn truncate(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

#[cfg(test)]
mod tests;
