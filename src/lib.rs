//! slirc-bridge - resilient IRC bridge
//!
//! A long-lived client connection that keeps a session registered, negotiates
//! its nickname, tracks one channel's membership, classifies and logs protocol
//! traffic and periodically broadcasts a self-describing identity payload.
//!
//! The entry point is [`Bridge`]; host integrations plug in through the
//! traits in [`host`] and the transport seam in [`wire`].

pub mod bridge;
pub mod classify;
pub mod config;
pub mod error;
pub mod host;
pub mod identity;
pub mod nick;
pub mod responder;
pub mod state;
pub mod telemetry;
pub mod wire;

pub use bridge::{Bridge, Collaborators};
pub use config::Config;
pub use error::{BridgeError, BridgeResult};
pub use state::ConnectionState;
