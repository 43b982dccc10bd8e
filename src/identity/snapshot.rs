//! Hashed identity snapshot and change detection.

use crate::host::{HashingProvider, UserState};

/// The hashed identifiers describing this client instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentitySnapshot {
    pub user_id_hash: String,
    pub username_hash: String,
    pub machine_hash: String,
    pub external_ip_hash: String,
}

impl IdentitySnapshot {
    /// Capture the current identity from the collaborators.
    ///
    /// Absent user state (before the host has logged in) hashes to an empty
    /// field rather than failing.
    pub async fn capture(hashing: &dyn HashingProvider, user: &dyn UserState) -> Self {
        let user_id_hash = user
            .user_id()
            .map(|id| hashing.hash(&id))
            .unwrap_or_default();
        let username_hash = user
            .display_name()
            .map(|name| hashing.hash(&name))
            .unwrap_or_default();

        Self {
            user_id_hash,
            username_hash,
            machine_hash: hashing.machine_hash(),
            external_ip_hash: hashing.external_ip_hash().await,
        }
    }

    /// True if any field differs from `previous`, or nothing was sent yet.
    pub fn changed_since(&self, previous: Option<&IdentitySnapshot>) -> bool {
        previous.is_none_or(|prev| prev != self)
    }
}
