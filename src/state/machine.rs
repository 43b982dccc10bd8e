//! Connection state machine.
//!
//! ```text
//! ┌──────────────┐ connect ┌────────────┐ 001 ┌───────────┐ JOIN ┌─────────┐ self JOIN ┌────────┐
//! │ Disconnected ├────────►│ Connecting ├────►│ Connected ├─────►│ Joining ├──────────►│ Joined │
//! └──────────────┘         └────────────┘     └───────────┘      └─────────┘           └────────┘
//!        ▲                  any non-terminal state ──► Error ───────┘ (reconnect)
//!        └──────────────────── disconnect / connection lost ─────────────────────────────────┘
//! ```
//!
//! Exactly one state is active. Transitions are published to the host but
//! never trigger further transitions themselves.

use std::fmt;

/// The bridge's connection state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Joining,
    Joined,
    Error,
}

impl ConnectionState {
    /// A connection exists or is being established.
    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Self::Connecting | Self::Connected | Self::Joining | Self::Joined
        )
    }

    /// Registration completed and the connection can carry commands.
    #[inline]
    pub fn is_registered(&self) -> bool {
        matches!(self, Self::Connected | Self::Joining | Self::Joined)
    }

    /// Whether `next` is a legal transition from this state.
    pub fn can_transition_to(&self, next: ConnectionState) -> bool {
        use ConnectionState::*;
        match (self, next) {
            (a, b) if *a == b => true,
            (_, Error | Disconnected) => true,
            (Disconnected | Error, Connecting) => true,
            (Connecting, Connected) => true,
            (Connected, Joining) => true,
            (Connected | Joining, Joined) => true,
            (Joining | Joined, Connected) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting",
            Self::Connected => "Connected",
            Self::Joining => "Joining",
            Self::Joined => "Joined",
            Self::Error => "Error",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
