//! Message parsing implementation.
//!
//! This module implements `FromStr` for `Message` using the nom-based parser.

use std::borrow::Cow;
use std::str::FromStr;

use crate::error::{MessageParseError, ProtocolError};

use super::nom_parser::ParsedMessage;
use super::tags::unescape_tag_value;
use super::types::{Message, Tag};

/// Intern common tag keys to avoid allocations.
///
/// IRCv3 messages frequently use the same tag keys. By returning
/// `Cow::Borrowed` for known keys, we avoid heap allocations.
#[inline]
fn intern_tag_key(key: &str) -> Cow<'static, str> {
    match key {
        // Core IRCv3 tags
        "msgid" => Cow::Borrowed("msgid"),
        "time" => Cow::Borrowed("time"),
        "batch" => Cow::Borrowed("batch"),
        "account" => Cow::Borrowed("account"),
        "label" => Cow::Borrowed("label"),

        // Capability tags
        "echo-message" => Cow::Borrowed("echo-message"),
        "message-tags" => Cow::Borrowed("message-tags"),

        // Typing indicators
        "+typing" => Cow::Borrowed("+typing"),
        "+draft/typing" => Cow::Borrowed("+draft/typing"),

        // Reply tags
        "+draft/reply" => Cow::Borrowed("+draft/reply"),
        "+draft/react" => Cow::Borrowed("+draft/react"),

        // Other common tags
        _ => Cow::Owned(key.to_owned()),
    }
}

/// Parse a raw tags string into a vector of `Tag` structs.
///
/// The input should be the tags portion without the leading `@`.
fn parse_tags_string(tags_str: &str) -> Vec<Tag> {
    tags_str
        .split(';')
        .filter(|s| !s.is_empty())
        .map(|tag| {
            let mut iter = tag.splitn(2, '=');
            let key = iter.next().unwrap_or("");
            let value = iter.next().map(unescape_tag_value);

            let interned_key = if key.is_empty() {
                Cow::Owned(String::new())
            } else {
                intern_tag_key(key)
            };

            Tag(interned_key, value)
        })
        .collect()
}

impl FromStr for Message {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Message, Self::Err> {
        if s.is_empty() {
            return Err(ProtocolError::InvalidMessage {
                string: s.to_owned(),
                cause: MessageParseError::EmptyMessage,
            });
        }

        // Use the nom parser
        let parsed = ParsedMessage::parse(s).map_err(|parse_err| {
            // Convert detailed parse error to appropriate message parse error
            let cause = MessageParseError::ParseContext {
                position: parse_err.position,
                context: format!("Parse error: {:?}", parse_err.kind),
                source: None,
                source_message: None,
            };

            ProtocolError::InvalidMessage {
                string: s.to_owned(),
                cause,
            }
        })?;

        // Convert parsed tags to owned Tag structs
        let tags = parsed.tags.map(parse_tags_string);

        // Build the owned Message
        Message::with_tags(tags, parsed.prefix, parsed.command, parsed.params.to_vec()).map_err(
            |cause| ProtocolError::InvalidMessage {
                string: s.to_owned(),
                cause,
            },
        )
    }
}
