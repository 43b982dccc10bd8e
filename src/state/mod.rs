//! Session state owned by the bridge.
//!
//! - [`machine`]: the connection state machine
//! - [`limits`]: server limits negotiated via ISUPPORT
//! - [`channel`]: the tracked channel and its members

pub mod channel;
pub mod limits;
pub mod machine;

pub use channel::{ChannelAttachment, ChannelTracker, normalize_channel};
pub use limits::{LimitKind, ServerLimits};
pub use machine::ConnectionState;
