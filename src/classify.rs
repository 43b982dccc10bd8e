//! Raw line classification for selective traffic logging.
//!
//! Lines are bucketed into chat, system and event traffic so each bucket can
//! be toggled independently in the logging configuration.

use std::fmt;

/// Traffic bucket of a raw protocol line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageClass {
    /// PRIVMSG / NOTICE between users.
    Chat,
    /// Numerics, keepalives and anything unrecognized.
    System,
    /// Membership and channel state changes.
    Event,
}

impl fmt::Display for MessageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Chat => "chat",
            Self::System => "system",
            Self::Event => "event",
        };
        f.write_str(name)
    }
}

/// Commands that describe membership or channel state changes.
const EVENT_COMMANDS: &[&str] = &[
    "JOIN", "PART", "QUIT", "NICK", "MODE", "TOPIC", "KICK", "INVITE", "WHOIS", "WHOWAS",
];

/// CTCP actions with more fields than this are treated as identity broadcasts.
const BROADCAST_FIELD_THRESHOLD: usize = 5;

/// Classify a raw protocol line.
pub fn classify(raw: &str) -> MessageClass {
    let mut tokens = raw.split_whitespace();
    let first = tokens.next();
    let command = match first {
        Some(prefix) if prefix.starts_with(':') => tokens.next(),
        other => other,
    };
    let Some(command) = command else {
        return MessageClass::System;
    };

    if is_numeric(command) {
        return MessageClass::System;
    }

    let command = command.to_ascii_uppercase();
    match command.as_str() {
        "PRIVMSG" | "NOTICE" => {
            if is_broadcast_action(raw) {
                MessageClass::System
            } else {
                MessageClass::Chat
            }
        }
        c if EVENT_COMMANDS.contains(&c) => MessageClass::Event,
        _ => MessageClass::System,
    }
}

/// True for numeric replies 1..=999.
fn is_numeric(command: &str) -> bool {
    command.len() <= 3
        && command.bytes().all(|b| b.is_ascii_digit())
        && matches!(command.parse::<u16>(), Ok(1..=999))
}

/// Detect a CTCP ACTION payload with more than five `;`-separated fields.
fn is_broadcast_action(raw: &str) -> bool {
    let Some(start) = raw.find(" :") else {
        return false;
    };
    let text = &raw[start + 2..];
    let Some(body) = text.strip_prefix("\u{1}ACTION ") else {
        return false;
    };
    let body = body.trim_end_matches(['\u{1}', '\r', '\n']);
    body.split(';').count() > BROADCAST_FIELD_THRESHOLD
}

/// Escape control characters so a raw line can be logged on a single line.
///
/// Only SOH, NUL, CR and LF are rewritten; everything else is untouched.
pub fn sanitize(line: &str) -> String {
    if !line.contains(['\u{1}', '\0', '\r', '\n']) {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len() + 8);
    for c in line.chars() {
        match c {
            '\u{1}' => out.push_str("\\x01"),
            '\0' => out.push_str("\\x00"),
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numerics_are_system() {
        assert_eq!(classify(":server 001 nick :Welcome"), MessageClass::System);
        assert_eq!(classify(":server 366 nick #c :End"), MessageClass::System);
        assert_eq!(classify(":server 999 nick :x"), MessageClass::System);
    }

    #[test]
    fn chat_commands_are_chat() {
        assert_eq!(
            classify(":alice!u@h PRIVMSG #chan :hello"),
            MessageClass::Chat
        );
        assert_eq!(classify("NOTICE #chan :heads up"), MessageClass::Chat);
        assert_eq!(
            classify(":alice!u@h PRIVMSG #chan :\u{1}ACTION waves\u{1}"),
            MessageClass::Chat
        );
    }

    #[test]
    fn membership_commands_are_events() {
        assert_eq!(classify(":alice!u@h JOIN #chan"), MessageClass::Event);
        assert_eq!(classify(":alice!u@h PART #chan :bye"), MessageClass::Event);
        assert_eq!(classify(":alice!u@h NICK bob"), MessageClass::Event);
        assert_eq!(classify("JOIN #chan"), MessageClass::Event);
        assert_eq!(classify(":op!u@h kick #chan bob"), MessageClass::Event);
    }

    #[test]
    fn identity_broadcast_is_hidden_as_system() {
        let line = ":bot!u@h PRIVMSG #chan :\u{1}ACTION 1;a;b;c;d;e\u{1}";
        assert_eq!(classify(line), MessageClass::System);

        let five = ":bot!u@h PRIVMSG #chan :\u{1}ACTION 1;a;b;c;d\u{1}";
        assert_eq!(classify(five), MessageClass::Chat);
    }

    #[test]
    fn everything_else_is_system() {
        assert_eq!(classify("PING :irc.example.org"), MessageClass::System);
        assert_eq!(classify(":irc PONG irc :token"), MessageClass::System);
        assert_eq!(classify(""), MessageClass::System);
        assert_eq!(classify(":prefix-only"), MessageClass::System);
        assert_eq!(classify(":server 0000 x"), MessageClass::System);
    }

    #[test]
    fn sanitize_escapes_control_characters() {
        assert_eq!(
            sanitize("PRIVMSG #c :\u{1}ACTION hi\u{1}\r\n"),
            "PRIVMSG #c :\\x01ACTION hi\\x01\\r\\n"
        );
        assert_eq!(sanitize("a\0b"), "a\\x00b");
    }

    #[test]
    fn sanitize_leaves_clean_input_unchanged() {
        let clean = ":alice!u@h PRIVMSG #chan :hello \\ world";
        assert_eq!(sanitize(clean), clean);
    }
}
