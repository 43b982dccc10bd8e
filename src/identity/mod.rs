//! Identity broadcasting.
//!
//! - [`payload`]: the `;`-delimited identity record
//! - [`snapshot`]: hashed identifiers and change detection
//! - [`announcer`]: the periodic change-driven broadcaster

pub mod announcer;
pub mod payload;
pub mod snapshot;

pub use announcer::{AnnounceOutcome, AnnounceTarget, IdentityAnnouncer};
pub use payload::{PAYLOAD_FIELD_COUNT, PayloadBuilder, PayloadInfo};
pub use snapshot::IdentitySnapshot;
