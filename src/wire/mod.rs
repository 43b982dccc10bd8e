//! Protocol transport seam.
//!
//! The bridge drives the server connection through [`Transport`], which
//! yields a [`WireHandle`]: an outbound [`Message`] sender plus a stream of
//! [`WireEvent`]s. Socket I/O, line framing and command parsing live behind
//! this seam; [`TcpTransport`] is the tokio implementation.

pub mod stream;
pub mod tcp;

use async_trait::async_trait;
use slirc_proto::{Message, Response};
use std::fmt::Write;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

pub use tcp::TcpTransport;

/// Name reported for the protocol layer in identity payloads.
pub const PROTOCOL_LIB_NAME: &str = "slirc-proto";
/// Version reported for the protocol layer; tracks `crates/slirc-proto`.
pub const PROTOCOL_LIB_VERSION: &str = "1.3.0";

/// Transport-level failures.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("tls error: {0}")]
    Tls(String),
    #[error("invalid server name: {0}")]
    InvalidServerName(String),
    #[error("connect timed out after {0} ms")]
    Timeout(u64),
    #[error("invalid line: {0}")]
    InvalidLine(String),
    #[error("transport returned no event stream")]
    NoEventStream,
    #[error("connection lost: {0}")]
    Lost(String),
    #[error("connection closed")]
    Closed,
}

/// Serialize `message` without the trailing CRLF.
///
/// Parameters carrying CR, LF or NUL are rejected instead of being written.
pub fn encode(message: &Message) -> Result<String, TransportError> {
    let mut line = String::new();
    write!(line, "{message}").map_err(|_| {
        TransportError::InvalidLine(format!("{:?}", message.command))
    })?;
    line.truncate(line.trim_end_matches(['\r', '\n']).len());
    Ok(line)
}

/// Registration parameters for one connection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectParams {
    pub address: String,
    pub port: u16,
    pub use_tls: bool,
    pub password: Option<String>,
    pub nick: String,
    pub username: String,
    pub realname: String,
}

/// Kind of an inbound chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Privmsg,
    Notice,
    Action,
}

/// Events produced by a live connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireEvent {
    RawReceived(String),
    RawSent(String),
    /// RPL_WELCOME received; `nick` is the nickname the server accepted.
    Registered { nick: String },
    /// Any other numeric reply (params include the target).
    Reply { response: Response, params: Vec<String> },
    Joined { channel: String, nick: String },
    Parted {
        channel: String,
        nick: String,
        reason: Option<String>,
    },
    Kicked {
        channel: String,
        nick: String,
        by: Option<String>,
        reason: Option<String>,
    },
    Quit { nick: String, reason: Option<String> },
    NickChanged { old: String, new: String },
    Message {
        from: String,
        target: String,
        text: String,
        kind: MessageKind,
    },
    /// The connection closed.
    Disconnected { reason: Option<String> },
    /// Fatal transport failure; a `Disconnected` does not follow.
    Error(String),
}

/// Cloneable outbound sender for a connection.
#[derive(Debug, Clone)]
pub struct WireSender {
    tx: mpsc::Sender<Message>,
}

impl WireSender {
    /// Queue `message`, rejecting it up front if it cannot be encoded.
    pub async fn send(&self, message: Message) -> Result<(), TransportError> {
        encode(&message)?;
        self.tx.send(message).await.map_err(|_| TransportError::Closed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Owner of one live connection.
///
/// Dropping the handle aborts the connection's I/O task.
#[derive(Debug)]
pub struct WireHandle {
    sender: WireSender,
    events: Option<mpsc::Receiver<WireEvent>>,
    io_task: Option<AbortHandle>,
}

impl WireHandle {
    pub fn new(
        tx: mpsc::Sender<Message>,
        events: mpsc::Receiver<WireEvent>,
        io_task: Option<AbortHandle>,
    ) -> Self {
        Self {
            sender: WireSender { tx },
            events: Some(events),
            io_task,
        }
    }

    pub fn sender(&self) -> WireSender {
        self.sender.clone()
    }

    pub async fn send(&self, message: Message) -> Result<(), TransportError> {
        self.sender.send(message).await
    }

    /// Take the event stream. Returns `None` once taken.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<WireEvent>> {
        self.events.take()
    }

    /// Tear down the connection.
    pub fn close(mut self) {
        if let Some(task) = self.io_task.take() {
            task.abort();
        }
    }
}

impl Drop for WireHandle {
    fn drop(&mut self) {
        if let Some(task) = self.io_task.take() {
            task.abort();
        }
    }
}

/// Establishes protocol connections.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Connect and begin registration (PASS/NICK/USER).
    async fn connect(&self, params: ConnectParams) -> Result<WireHandle, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use slirc_proto::Command;
    use slirc_proto::ctcp::Ctcp;

    #[test]
    fn encode_strips_line_terminator() {
        let quit = Message::quit_with_message("Bridge shutting down");
        assert_eq!(encode(&quit).unwrap(), "QUIT :Bridge shutting down");
        assert_eq!(encode(&Message::join("#test")).unwrap(), "JOIN #test");
    }

    #[test]
    fn encode_formats_actions() {
        let action = Message::privmsg("#c", Ctcp::action("waves").to_string());
        assert_eq!(encode(&action).unwrap(), "PRIVMSG #c :\u{1}ACTION waves\u{1}");
    }

    #[test]
    fn encode_rejects_embedded_line_breaks() {
        let smuggled = Message::from(Command::PRIVMSG("#c".into(), "hi\r\nQUIT".into()));
        assert!(matches!(encode(&smuggled), Err(TransportError::InvalidLine(_))));
    }

    #[tokio::test]
    async fn sender_rejects_unencodable_messages() {
        let (tx, mut rx) = mpsc::channel(1);
        let (_etx, erx) = mpsc::channel(1);
        let handle = WireHandle::new(tx, erx, None);
        let smuggled = Message::nick("a\nb");
        assert!(handle.send(smuggled).await.is_err());
        assert!(rx.try_recv().is_err());
    }
}
