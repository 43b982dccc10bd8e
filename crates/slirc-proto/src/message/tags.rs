//! IRCv3 message tag escaping utilities.

use std::fmt::{Result as FmtResult, Write};
use std::io::{self, Write as IoWrite};

/// Escape a tag value for serialization.
///
/// Escapes special characters according to the IRCv3 message-tags spec.
pub fn escape_tag_value(f: &mut dyn Write, value: &str) -> FmtResult {
    for c in value.chars() {
        match c {
            ';' => f.write_str("\\:")?,
            ' ' => f.write_str("\\s")?,
            '\\' => f.write_str("\\\\")?,
            '\r' => f.write_str("\\r")?,
            '\n' => f.write_str("\\n")?,
            c => f.write_char(c)?,
        }
    }
    Ok(())
}

/// Escape a tag value directly to an `io::Write` implementor.
///
/// This is the zero-copy version that avoids intermediate string allocation.
/// Used by the [`IrcEncode`](crate::encode::IrcEncode) trait.
pub fn escape_tag_value_to_writer<W: IoWrite>(w: &mut W, value: &str) -> io::Result<usize> {
    let mut written = 0;
    for c in value.chars() {
        written += match c {
            ';' => w.write(b"\\:")?,
            ' ' => w.write(b"\\s")?,
            '\\' => w.write(b"\\\\")?,
            '\r' => w.write(b"\\r")?,
            '\n' => w.write(b"\\n")?,
            c => {
                let mut buf = [0u8; 4];
                w.write(c.encode_utf8(&mut buf).as_bytes())?
            }
        };
    }
    Ok(written)
}

/// Unescape a tag value from wire format.
///
/// Reverses the escaping applied by [`escape_tag_value`].
pub fn unescape_tag_value(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut iter = value.chars();
    while let Some(c) = iter.next() {
        let r = if c == '\\' {
            match iter.next() {
                Some(':') => ';',
                Some('s') => ' ',
                Some('\\') => '\\',
                Some('r') => '\r',
                Some('n') => '\n',
                Some(c) => c,
                None => break,
            }
        } else {
            c
        };
        unescaped.push(r);
    }
    unescaped
}
