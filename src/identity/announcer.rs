//! Identity announcer.
//!
//! After joining, and on every interval thereafter, the current
//! [`IdentitySnapshot`] is compared with the last one broadcast. A payload is
//! sent as a CTCP ACTION to the tracked channel only when something changed
//! (or nothing was sent yet). Shortly after the first successful broadcast
//! the announcer fires the ready signal.

use super::payload::PayloadBuilder;
use super::snapshot::IdentitySnapshot;
use crate::config::AnnouncerConfig;
use crate::host::{HashingProvider, UserState};
use crate::wire::{TransportError, WireSender};
use parking_lot::Mutex;
use slirc_proto::Message;
use slirc_proto::ctcp::Ctcp;
use std::sync::Arc;
use tokio::time::{Instant, interval_at, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Result of one change check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnounceOutcome {
    /// A payload was sent; `first` is true for the first broadcast in this channel.
    Sent { first: bool },
    Unchanged,
}

/// Where announcements go.
///
/// Implementations re-validate liveness on every call, so a disconnect that
/// races with a pending tick is observed before anything is sent.
pub trait AnnounceTarget: Send + Sync {
    /// Sender and channel for the current live attachment.
    fn target(&self) -> Option<(WireSender, String)>;

    /// The bridge has announced itself.
    fn ready(&self);
}

/// Owns the last-broadcast snapshot.
pub struct IdentityAnnouncer {
    builder: PayloadBuilder,
    hashing: Arc<dyn HashingProvider>,
    user: Arc<dyn UserState>,
    last: Mutex<Option<IdentitySnapshot>>,
    last_payload: Mutex<Option<String>>,
}

impl IdentityAnnouncer {
    pub fn new(
        builder: PayloadBuilder,
        hashing: Arc<dyn HashingProvider>,
        user: Arc<dyn UserState>,
    ) -> Self {
        Self {
            builder,
            hashing,
            user,
            last: Mutex::new(None),
            last_payload: Mutex::new(None),
        }
    }

    /// Forget the last broadcast so the next check always sends.
    pub fn reset(&self) {
        *self.last.lock() = None;
    }

    /// The last snapshot broadcast, if any.
    pub fn last_snapshot(&self) -> Option<IdentitySnapshot> {
        self.last.lock().clone()
    }

    /// Whether `raw_line` carries the bridge's own most recent payload.
    pub fn is_own_broadcast(&self, raw_line: &str) -> bool {
        self.last_payload
            .lock()
            .as_deref()
            .is_some_and(|payload| raw_line.contains(payload))
    }

    /// Compare the current identity with the last broadcast and send if changed.
    pub async fn check(
        &self,
        sender: &WireSender,
        channel: &str,
    ) -> Result<AnnounceOutcome, TransportError> {
        let snapshot = IdentitySnapshot::capture(self.hashing.as_ref(), self.user.as_ref()).await;
        let previous = self.last_snapshot();
        if !snapshot.changed_since(previous.as_ref()) {
            return Ok(AnnounceOutcome::Unchanged);
        }

        let payload = self.builder.build(
            &snapshot.external_ip_hash,
            &snapshot.machine_hash,
            &snapshot.user_id_hash,
            &snapshot.username_hash,
        );
        // Record before sending so the echoed RawSent line is recognized.
        *self.last_payload.lock() = Some(payload.clone());
        sender
            .send(Message::privmsg(channel, Ctcp::action(&payload).to_string()))
            .await?;

        let first = previous.is_none();
        *self.last.lock() = Some(snapshot);
        if first {
            info!(channel = %channel, "Identity announced");
        } else {
            debug!(channel = %channel, "Identity changed, re-announced");
        }
        Ok(AnnounceOutcome::Sent { first })
    }

    /// Run the announce loop until `token` is cancelled or the target goes away.
    pub async fn run(
        self: Arc<Self>,
        target: Arc<dyn AnnounceTarget>,
        timing: AnnouncerConfig,
        token: CancellationToken,
    ) {
        tokio::select! {
            _ = token.cancelled() => return,
            _ = sleep(timing.settle()) => {}
        }

        let period = timing.interval();
        let mut ticks = interval_at(Instant::now() + period, period);

        loop {
            let Some((sender, channel)) = target.target() else {
                debug!("Announce target gone, stopping announcer");
                return;
            };

            match self.check(&sender, &channel).await {
                Ok(AnnounceOutcome::Sent { first: true }) => {
                    let target = Arc::clone(&target);
                    let token = token.clone();
                    let delay = timing.ready_delay();
                    tokio::spawn(async move {
                        tokio::select! {
                            _ = token.cancelled() => {}
                            _ = sleep(delay) => target.ready(),
                        }
                    });
                }
                Ok(_) => {}
                Err(e) => warn!(channel = %channel, error = %e, "Identity announcement failed"),
            }

            tokio::select! {
                _ = token.cancelled() => return,
                _ = ticks.tick() => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::StaticUserState;
    use crate::identity::payload::PayloadInfo;
    use async_trait::async_trait;
    use slirc_proto::Command;
    use slirc_proto::ctcp::CtcpKind;
    use tokio::sync::mpsc;

    struct FixedHasher {
        ip: Mutex<String>,
    }

    #[async_trait]
    impl HashingProvider for FixedHasher {
        fn hash(&self, input: &str) -> String {
            format!("h({input})")
        }

        fn machine_hash(&self) -> String {
            "machine".into()
        }

        async fn external_ip_hash(&self) -> String {
            self.ip.lock().clone()
        }
    }

    fn announcer(hasher: Arc<FixedHasher>) -> IdentityAnnouncer {
        IdentityAnnouncer::new(
            PayloadBuilder::new(PayloadInfo::for_host("Host", "1.0")),
            hasher,
            Arc::new(StaticUserState::new(Some("uid".into()), Some("alice".into()))),
        )
    }

    fn sender() -> (WireSender, mpsc::Receiver<Message>) {
        let (tx, rx) = mpsc::channel(8);
        let (_etx, erx) = mpsc::channel(1);
        let handle = crate::wire::WireHandle::new(tx, erx, None);
        (handle.sender(), rx)
    }

    #[tokio::test]
    async fn sends_once_until_identity_changes() {
        let hasher = Arc::new(FixedHasher {
            ip: Mutex::new("ip1".into()),
        });
        let announcer = announcer(Arc::clone(&hasher));
        let (sender, mut rx) = sender();

        assert_eq!(
            announcer.check(&sender, "#test").await.unwrap(),
            AnnounceOutcome::Sent { first: true }
        );
        let Some(Message {
            command: Command::PRIVMSG(target, body),
            ..
        }) = rx.recv().await
        else {
            panic!("expected a PRIVMSG");
        };
        assert_eq!(target, "#test");
        let action = Ctcp::parse(&body).expect("CTCP body");
        assert_eq!(action.kind, CtcpKind::Action);
        let text = action.params.unwrap_or_default();
        let fields: Vec<&str> = text.split(';').collect();
        assert_eq!(fields.len(), 11);
        assert_eq!(fields[7], "ip1");
        assert_eq!(fields[9], "h(uid)");
        assert_eq!(fields[10], "h(alice)");
        assert!(announcer.is_own_broadcast(&format!("PRIVMSG #test :\u{1}ACTION {text}\u{1}")));

        assert_eq!(
            announcer.check(&sender, "#test").await.unwrap(),
            AnnounceOutcome::Unchanged
        );

        *hasher.ip.lock() = "ip2".into();
        assert_eq!(
            announcer.check(&sender, "#test").await.unwrap(),
            AnnounceOutcome::Sent { first: false }
        );
    }

    #[tokio::test]
    async fn reset_forces_a_new_first_broadcast() {
        let hasher = Arc::new(FixedHasher {
            ip: Mutex::new("ip".into()),
        });
        let announcer = announcer(hasher);
        let (sender, _rx) = sender();

        announcer.check(&sender, "#test").await.unwrap();
        announcer.reset();
        assert_eq!(
            announcer.check(&sender, "#test").await.unwrap(),
            AnnounceOutcome::Sent { first: true }
        );
    }
}
