//! Negotiated server limits (RPL_ISUPPORT / 005).
//!
//! Limits are reset to the RFC defaults at the start of every connection
//! attempt so that a previous server's advertisement never leaks into a new
//! session.

use tracing::trace;

/// Default maximum nickname length (RFC 1459).
pub const DEFAULT_NICK_MAX_LEN: usize = 9;
/// Default maximum channel name length (RFC 2812).
pub const DEFAULT_CHANNEL_MAX_LEN: usize = 200;
/// Default maximum topic length.
pub const DEFAULT_TOPIC_MAX_LEN: usize = 390;
/// Default maximum real name length.
pub const DEFAULT_REALNAME_MAX_LEN: usize = 512;

/// A single limit that can be advertised through ISUPPORT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    Nick,
    Channel,
    Topic,
    RealName,
}

impl LimitKind {
    /// Map an ISUPPORT key to the limit it controls.
    fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_uppercase().as_str() {
            "NICKLEN" => Some(Self::Nick),
            "CHANNELLEN" => Some(Self::Channel),
            "TOPICLEN" => Some(Self::Topic),
            "REALNAMELEN" => Some(Self::RealName),
            _ => None,
        }
    }

    /// The ISUPPORT token name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nick => "NICKLEN",
            Self::Channel => "CHANNELLEN",
            Self::Topic => "TOPICLEN",
            Self::RealName => "REALNAMELEN",
        }
    }
}

/// Protocol limits negotiated with the current server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerLimits {
    pub nick_max_len: usize,
    pub channel_max_len: usize,
    pub topic_max_len: usize,
    pub realname_max_len: usize,
}

impl Default for ServerLimits {
    fn default() -> Self {
        Self {
            nick_max_len: DEFAULT_NICK_MAX_LEN,
            channel_max_len: DEFAULT_CHANNEL_MAX_LEN,
            topic_max_len: DEFAULT_TOPIC_MAX_LEN,
            realname_max_len: DEFAULT_REALNAME_MAX_LEN,
        }
    }
}

impl ServerLimits {
    /// Restore the built-in defaults.
    pub fn reset_to_defaults(&mut self) {
        *self = Self::default();
    }

    fn set(&mut self, kind: LimitKind, value: usize) {
        match kind {
            LimitKind::Nick => self.nick_max_len = value,
            LimitKind::Channel => self.channel_max_len = value,
            LimitKind::Topic => self.topic_max_len = value,
            LimitKind::RealName => self.realname_max_len = value,
        }
    }

    /// Apply the parameters of an RPL_ISUPPORT reply.
    ///
    /// Each parameter may itself contain several space-separated tokens.
    /// Tokens are split on the first `=`; only recognized keys with a
    /// positive integer value are applied. Everything else (the target
    /// nickname, the trailing "are supported by this server" text, unknown
    /// capabilities, malformed values) is ignored.
    ///
    /// `on_change` is invoked once per applied limit.
    pub fn parse<S, F>(&mut self, params: &[S], mut on_change: F)
    where
        S: AsRef<str>,
        F: FnMut(LimitKind, usize),
    {
        for token in params.iter().flat_map(|p| p.as_ref().split_whitespace()) {
            let Some((key, value)) = token.split_once('=') else {
                continue;
            };
            let Some(kind) = LimitKind::from_key(key) else {
                continue;
            };
            match value.parse::<i64>() {
                Ok(n) if n > 0 => {
                    let n = n as usize;
                    self.set(kind, n);
                    on_change(kind, n);
                }
                _ => trace!(token = %token, "Ignoring malformed ISUPPORT limit"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_rfc_values() {
        let limits = ServerLimits::default();
        assert_eq!(limits.nick_max_len, 9);
        assert_eq!(limits.channel_max_len, 200);
        assert_eq!(limits.topic_max_len, 390);
        assert_eq!(limits.realname_max_len, 512);
    }

    #[test]
    fn parse_only_updates_recognized_keys() {
        let mut limits = ServerLimits::default();
        let mut changes = Vec::new();
        limits.parse(&["NICKLEN=30", "FOO=BAR", "CHANMODES=abc"], |k, v| {
            changes.push((k, v))
        });

        assert_eq!(limits.nick_max_len, 30);
        assert_eq!(limits.channel_max_len, DEFAULT_CHANNEL_MAX_LEN);
        assert_eq!(limits.topic_max_len, DEFAULT_TOPIC_MAX_LEN);
        assert_eq!(limits.realname_max_len, DEFAULT_REALNAME_MAX_LEN);
        assert_eq!(changes, vec![(LimitKind::Nick, 30)]);
    }

    #[test]
    fn parse_rejects_non_positive_values() {
        let mut limits = ServerLimits::default();
        limits.parse(&["TOPICLEN=-5"], |_, _| panic!("no change expected"));
        assert_eq!(limits.topic_max_len, DEFAULT_TOPIC_MAX_LEN);

        limits.parse(&["TOPICLEN=0", "TOPICLEN=abc", "TOPICLEN="], |_, _| {
            panic!("no change expected")
        });
        assert_eq!(limits.topic_max_len, DEFAULT_TOPIC_MAX_LEN);
    }

    #[test]
    fn parse_handles_full_reply_parameters() {
        let mut limits = ServerLimits::default();
        limits.parse(
            &[
                "Rover",
                "CHANNELLEN=64 TOPICLEN=307 EXCEPTS",
                "REALNAMELEN=128",
                "are supported by this server",
            ],
            |_, _| {},
        );
        assert_eq!(limits.channel_max_len, 64);
        assert_eq!(limits.topic_max_len, 307);
        assert_eq!(limits.realname_max_len, 128);
        assert_eq!(limits.nick_max_len, DEFAULT_NICK_MAX_LEN);
    }

    #[test]
    fn parse_accepts_values_smaller_than_defaults() {
        let mut limits = ServerLimits::default();
        limits.parse(&["NICKLEN=5"], |_, _| {});
        assert_eq!(limits.nick_max_len, 5);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut limits = ServerLimits::default();
        limits.parse(
            &["NICKLEN=30 CHANNELLEN=50 TOPICLEN=100 REALNAMELEN=64"],
            |_, _| {},
        );
        assert_ne!(limits, ServerLimits::default());

        limits.reset_to_defaults();
        assert_eq!(limits, ServerLimits::default());
    }
}
