//! Channel and membership tracking.
//!
//! At most one channel is tracked at a time. Joining yields a
//! [`ChannelAttachment`]: per-channel events are only applied while the
//! attachment is live, and channel-scoped background tasks run under its
//! cancellation token. The attachment is released exactly once, on part,
//! kick or connection teardown.

use parking_lot::Mutex;
use slirc_proto::{irc_eq, irc_to_lower};
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Membership prefixes stripped from NAMES entries.
const MEMBER_PREFIXES: &[char] = &['~', '&', '@', '%', '+'];

/// Normalize a channel name, adding a leading `#` when no channel prefix is present.
pub fn normalize_channel(name: &str) -> String {
    let name = name.trim();
    if name.starts_with(['#', '&', '!', '+']) {
        name.to_string()
    } else {
        format!("#{name}")
    }
}

/// RFC 1459 folding, so `[Rover]` and `{rover}` share a key.
fn fold(name: &str) -> String {
    irc_to_lower(name)
}

/// Live subscription to one channel's events.
#[derive(Debug)]
pub struct ChannelAttachment {
    name: String,
    token: CancellationToken,
    released: bool,
}

impl ChannelAttachment {
    fn new(name: String, parent: &CancellationToken) -> Self {
        Self {
            name,
            token: parent.child_token(),
            released: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Token cancelled when the attachment is released.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_live(&self) -> bool {
        !self.released && !self.token.is_cancelled()
    }

    /// Release the attachment, cancelling channel-scoped tasks.
    pub fn detach(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.token.cancel();
        }
    }
}

impl Drop for ChannelAttachment {
    fn drop(&mut self) {
        if !self.released {
            debug!(channel = %self.name, "Channel attachment dropped without detach");
            self.release();
        }
    }
}

#[derive(Debug)]
struct TrackedChannel {
    attachment: ChannelAttachment,
    /// Folded nickname -> nickname as last seen.
    members: BTreeMap<String, String>,
}

/// Tracks the joined channel and its member set.
#[derive(Debug, Default)]
pub struct ChannelTracker {
    inner: Mutex<Option<TrackedChannel>>,
}

impl ChannelTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `channel`, replacing any previous attachment.
    ///
    /// Returns the channel-scoped cancellation token.
    pub fn attach(
        &self,
        channel: &str,
        local_nick: &str,
        parent: &CancellationToken,
    ) -> CancellationToken {
        let attachment = ChannelAttachment::new(channel.to_string(), parent);
        let token = attachment.token();
        let mut members = BTreeMap::new();
        members.insert(fold(local_nick), local_nick.to_string());

        let previous = self.inner.lock().replace(TrackedChannel {
            attachment,
            members,
        });
        if let Some(previous) = previous {
            previous.attachment.detach();
        }
        token
    }

    /// Stop tracking. Returns the name of the released channel, if any.
    pub fn detach(&self) -> Option<String> {
        let tracked = self.inner.lock().take()?;
        let name = tracked.attachment.name().to_string();
        tracked.attachment.detach();
        Some(name)
    }

    /// Name of the tracked channel.
    pub fn channel(&self) -> Option<String> {
        self.inner
            .lock()
            .as_ref()
            .map(|t| t.attachment.name().to_string())
    }

    /// Cancellation token of the live attachment.
    pub fn token(&self) -> Option<CancellationToken> {
        self.inner
            .lock()
            .as_ref()
            .filter(|t| t.attachment.is_live())
            .map(|t| t.attachment.token())
    }

    /// Whether `channel` is the tracked, live channel.
    pub fn is_tracking(&self, channel: &str) -> bool {
        self.inner
            .lock()
            .as_ref()
            .is_some_and(|t| t.attachment.is_live() && irc_eq(t.attachment.name(), channel))
    }

    /// Record another user joining. Returns the new member count.
    ///
    /// Events for other channels and for the local client are ignored.
    pub fn member_joined(&self, channel: &str, nick: &str, local_nick: &str) -> Option<usize> {
        if irc_eq(nick, local_nick) {
            return None;
        }
        self.with_channel(channel, |members| {
            members.insert(fold(nick), nick.to_string());
        })
    }

    /// Record another user leaving. Returns the new member count.
    pub fn member_left(&self, channel: &str, nick: &str, local_nick: &str) -> Option<usize> {
        if irc_eq(nick, local_nick) {
            return None;
        }
        self.with_channel(channel, |members| {
            members.remove(&fold(nick));
        })
    }

    /// Record a user quitting the network. Returns the new count if they were a member.
    pub fn member_quit(&self, nick: &str) -> Option<usize> {
        let mut guard = self.inner.lock();
        let tracked = guard.as_mut().filter(|t| t.attachment.is_live())?;
        tracked
            .members
            .remove(&fold(nick))
            .map(|_| tracked.members.len())
    }

    /// Rename a member. Returns true if they were tracked.
    pub fn member_renamed(&self, old: &str, new: &str) -> bool {
        let mut guard = self.inner.lock();
        let Some(tracked) = guard.as_mut().filter(|t| t.attachment.is_live()) else {
            return false;
        };
        if tracked.members.remove(&fold(old)).is_some() {
            tracked.members.insert(fold(new), new.to_string());
            true
        } else {
            false
        }
    }

    /// Merge a RPL_NAMREPLY (353) entry list.
    pub fn add_names<'a>(&self, channel: &str, names: impl IntoIterator<Item = &'a str>) {
        self.with_channel(channel, |members| {
            for entry in names {
                let nick = entry.trim_start_matches(MEMBER_PREFIXES);
                // userhost-in-names
                let nick = nick.split_once('!').map(|(n, _)| n).unwrap_or(nick);
                if !nick.is_empty() {
                    members.insert(fold(nick), nick.to_string());
                }
            }
        });
    }

    /// Current member count, zero when nothing is tracked.
    pub fn member_count(&self) -> usize {
        self.inner
            .lock()
            .as_ref()
            .map(|t| t.members.len())
            .unwrap_or(0)
    }

    /// Members of `channel` (default: the tracked channel), sorted case-insensitively.
    ///
    /// Empty if nothing is tracked or the name does not match.
    pub fn member_list(&self, channel: Option<&str>) -> Vec<String> {
        let guard = self.inner.lock();
        let Some(tracked) = guard.as_ref() else {
            return Vec::new();
        };
        if let Some(requested) = channel
            && !irc_eq(&normalize_channel(requested), tracked.attachment.name())
        {
            return Vec::new();
        }
        // BTreeMap keys are folded, so values come out case-insensitively sorted.
        tracked.members.values().cloned().collect()
    }

    fn with_channel<F>(&self, channel: &str, f: F) -> Option<usize>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let mut guard = self.inner.lock();
        let tracked = guard.as_mut().filter(|t| {
            t.attachment.is_live() && irc_eq(t.attachment.name(), channel)
        })?;
        f(&mut tracked.members);
        Some(tracked.members.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> (ChannelTracker, CancellationToken) {
        let root = CancellationToken::new();
        let tracker = ChannelTracker::new();
        tracker.attach("#test", "Rover", &root);
        (tracker, root)
    }

    #[test]
    fn join_then_leave_restores_count() {
        let (tracker, _root) = tracker();
        let before = tracker.member_count();

        assert_eq!(tracker.member_joined("#test", "bob", "Rover"), Some(before + 1));
        assert!(tracker.member_list(None).contains(&"bob".to_string()));

        assert_eq!(tracker.member_left("#test", "bob", "Rover"), Some(before));
        assert!(!tracker.member_list(None).contains(&"bob".to_string()));
    }

    #[test]
    fn self_events_are_ignored() {
        let (tracker, _root) = tracker();
        assert_eq!(tracker.member_joined("#test", "rover", "Rover"), None);
        assert_eq!(tracker.member_left("#test", "Rover", "Rover"), None);
        assert_eq!(tracker.member_count(), 1);
    }

    #[test]
    fn members_compare_with_rfc1459_casemap() {
        let (tracker, _root) = tracker();
        let before = tracker.member_count();
        assert_eq!(tracker.member_joined("#TEST", "[bob]", "Rover"), Some(before + 1));
        assert_eq!(tracker.member_left("#test", "{BOB}", "Rover"), Some(before));
        assert_eq!(tracker.member_joined("#test", "ROVER", "rover"), None);
    }

    #[test]
    fn other_channels_are_ignored() {
        let (tracker, _root) = tracker();
        assert_eq!(tracker.member_joined("#other", "bob", "Rover"), None);
        assert_eq!(tracker.member_count(), 1);
    }

    #[test]
    fn member_list_is_sorted_case_insensitively() {
        let (tracker, _root) = tracker();
        tracker.add_names("#TEST", ["@zed", "+alice", "Bob", "carol!c@h"]);
        assert_eq!(
            tracker.member_list(Some("test")),
            vec!["alice", "Bob", "carol", "Rover", "zed"]
        );
        assert!(tracker.member_list(Some("#elsewhere")).is_empty());
    }

    #[test]
    fn detach_cancels_channel_token_and_clears_state() {
        let root = CancellationToken::new();
        let tracker = ChannelTracker::new();
        let token = tracker.attach("#test", "Rover", &root);

        assert_eq!(tracker.detach().as_deref(), Some("#test"));
        assert!(token.is_cancelled());
        assert!(tracker.member_list(None).is_empty());
        assert_eq!(tracker.member_count(), 0);
        assert_eq!(tracker.member_joined("#test", "bob", "Rover"), None);
        assert_eq!(tracker.detach(), None);
    }

    #[test]
    fn parent_cancellation_stops_event_application() {
        let (tracker, root) = tracker();
        root.cancel();
        assert!(!tracker.is_tracking("#test"));
        assert_eq!(tracker.member_joined("#test", "bob", "Rover"), None);
    }

    #[test]
    fn quit_and_rename_update_members() {
        let (tracker, _root) = tracker();
        tracker.member_joined("#test", "bob", "Rover");
        assert!(tracker.member_renamed("bob", "robert"));
        assert!(tracker.member_list(None).contains(&"robert".to_string()));
        assert_eq!(tracker.member_quit("robert"), Some(1));
        assert_eq!(tracker.member_quit("nobody"), None);
    }

    #[test]
    fn normalize_adds_hash_prefix() {
        assert_eq!(normalize_channel("test"), "#test");
        assert_eq!(normalize_channel("#test"), "#test");
        assert_eq!(normalize_channel("&local"), "&local");
    }
}
