//! `@<nick> <verb>` command replies.
//!
//! Recognizes `ping`, `time` and `version` addressed to the local nickname
//! (case-insensitive). Every verb present in a message produces its own reply.

use chrono::{Local, SecondsFormat};
use regex::{Regex, RegexBuilder};

/// A recognized command verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Ping,
    Time,
    Version,
}

impl Verb {
    const ALL: [Verb; 3] = [Verb::Ping, Verb::Time, Verb::Version];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::Time => "time",
            Self::Version => "version",
        }
    }
}

/// A reply to send back to the originating channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub verb: Verb,
    pub target: String,
    pub text: String,
}

/// Matches commands addressed to one nickname.
#[derive(Debug, Clone)]
pub struct CommandResponder {
    patterns: Vec<(Verb, Regex)>,
    version: String,
}

impl CommandResponder {
    /// Build matchers for `nick`.
    pub fn new(nick: &str) -> Self {
        let patterns = Verb::ALL
            .iter()
            .filter_map(|verb| {
                let pattern = format!(r"@{}\s+{}\b", regex::escape(nick), verb.as_str());
                RegexBuilder::new(&pattern)
                    .case_insensitive(true)
                    .build()
                    .ok()
                    .map(|re| (*verb, re))
            })
            .collect();
        Self {
            patterns,
            version: version_string(),
        }
    }

    /// Verbs present in `text`, in declaration order.
    pub fn matches(&self, text: &str) -> Vec<Verb> {
        self.patterns
            .iter()
            .filter(|(_, re)| re.is_match(text))
            .map(|(verb, _)| *verb)
            .collect()
    }

    /// Replies for a message from `sender` in `channel`.
    pub fn respond(&self, sender: &str, channel: &str, text: &str) -> Vec<Reply> {
        self.matches(text)
            .into_iter()
            .map(|verb| Reply {
                verb,
                target: channel.to_string(),
                text: format!("@{sender} {}", self.answer(verb)),
            })
            .collect()
    }

    fn answer(&self, verb: Verb) -> String {
        match verb {
            Verb::Ping => "pong".to_string(),
            Verb::Time => Local::now().to_rfc3339_opts(SecondsFormat::Secs, false),
            Verb::Version => self.version.clone(),
        }
    }
}

/// Human-readable version line.
pub fn version_string() -> String {
    format!(
        "{} v{} ({} {})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        crate::wire::PROTOCOL_LIB_NAME,
        crate::wire::PROTOCOL_LIB_VERSION
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_is_answered_with_pong() {
        let responder = CommandResponder::new("Rover");
        let replies = responder.respond("alice", "#test", "@rover ping");
        assert_eq!(
            replies,
            vec![Reply {
                verb: Verb::Ping,
                target: "#test".into(),
                text: "@alice pong".into(),
            }]
        );
    }

    #[test]
    fn multiple_verbs_all_fire() {
        let responder = CommandResponder::new("Rover");
        let verbs = responder.matches("@Rover version and @ROVER   time please");
        assert_eq!(verbs, vec![Verb::Time, Verb::Version]);
    }

    #[test]
    fn requires_word_boundary_and_address() {
        let responder = CommandResponder::new("Rover");
        assert!(responder.matches("@Rover pingpong").is_empty());
        assert!(responder.matches("Rover ping").is_empty());
        assert!(responder.matches("@Roverx ping").is_empty());
        assert!(responder.matches("@Other ping").is_empty());
    }

    #[test]
    fn nick_is_matched_literally() {
        let responder = CommandResponder::new("[bot]|x");
        assert_eq!(responder.matches("@[bot]|x ping"), vec![Verb::Ping]);
        assert!(responder.matches("@b ping").is_empty());
    }

    #[test]
    fn time_reply_is_iso8601_with_offset() {
        let responder = CommandResponder::new("Rover");
        let replies = responder.respond("alice", "#test", "@Rover time");
        let stamp = replies[0].text.strip_prefix("@alice ").unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok(), "{stamp}");
    }

    #[test]
    fn version_reply_names_the_crate() {
        let responder = CommandResponder::new("Rover");
        let replies = responder.respond("alice", "#test", "@Rover version");
        assert!(replies[0].text.contains(env!("CARGO_PKG_VERSION")));
    }
}
