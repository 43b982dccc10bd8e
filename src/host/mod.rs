//! Host integration seams.
//!
//! The bridge never reaches into its host; everything it needs flows through
//! the narrow traits defined here:
//!
//! - [`HostSink`]: write-only observable variables, discrete events and the
//!   "safe parameter send" used for pulse parameters
//! - [`HashingProvider`]: opaque, stable hashes of identifying inputs
//! - [`UserState`]: the host's current user identifier and display name
//!
//! Default implementations live in [`hashing`], [`sink`] and [`user`].

pub mod hashing;
pub mod sink;
pub mod user;

use async_trait::async_trait;
use std::fmt;

pub use hashing::Sha256Hasher;
pub use sink::TracingSink;
pub use user::StaticUserState;

/// Value of an observable variable or parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Self::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// Names of the observable variables the bridge publishes.
pub mod vars {
    pub const CONNECTION_STATUS: &str = "ConnectionStatus";
    pub const CHANNEL_STATUS: &str = "ChannelStatus";
    pub const LAST_ERROR: &str = "LastError";
    /// Stable code of the last error, e.g. `config`, `timeout`, `transport`.
    pub const LAST_ERROR_CODE: &str = "LastErrorCode";
    pub const MEMBER_COUNT: &str = "MemberCount";
    pub const NICKNAME: &str = "Nickname";
    pub const LAST_MESSAGE: &str = "LastMessage";
    pub const LAST_SENDER: &str = "LastSender";
}

/// Names of the discrete events the bridge fires.
pub mod events {
    pub const CONNECTED: &str = "Connected";
    pub const DISCONNECTED: &str = "Disconnected";
    pub const JOINED: &str = "Joined";
    pub const LEFT: &str = "Left";
    pub const READY: &str = "Ready";
    pub const CHAT_MESSAGE: &str = "ChatMessage";
    pub const NICKNAME_CHANGED: &str = "NicknameChanged";
}

/// Names of the pulse parameters the bridge sends.
pub mod params {
    pub const MESSAGE_RECEIVED: &str = "MessageReceived";
    pub const USER_JOINED: &str = "UserJoined";
    pub const USER_LEFT: &str = "UserLeft";
}

/// Write-only observer surface exposed by the host.
///
/// All methods are fire-and-forget and must not block.
pub trait HostSink: Send + Sync {
    /// Update an observable variable.
    fn set_variable(&self, name: &str, value: Value);

    /// Fire a discrete event with a structured payload.
    fn emit_event(&self, name: &str, payload: serde_json::Value);

    /// Send a parameter to the host transport.
    ///
    /// Silently does nothing if the transport is unavailable.
    fn send_parameter(&self, name: &str, value: Value);
}

/// Produces stable opaque hashes of identifying inputs.
#[async_trait]
pub trait HashingProvider: Send + Sync {
    /// Hash an arbitrary identifier.
    fn hash(&self, input: &str) -> String;

    /// Hash of this machine's fingerprint.
    fn machine_hash(&self) -> String;

    /// Hash of the current external IP address, empty if unknown.
    async fn external_ip_hash(&self) -> String;
}

/// The host's view of the current user. Both values may be absent before login.
pub trait UserState: Send + Sync {
    fn user_id(&self) -> Option<String>;
    fn display_name(&self) -> Option<String>;
}
