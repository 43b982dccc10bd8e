//! tokio TCP/TLS [`Transport`].

use super::stream::{IrcStream, upgrade_to_tls};
use super::{
    ConnectParams, MessageKind, Transport, TransportError, WireEvent, WireHandle, encode,
};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use slirc_proto::ctcp::{Ctcp, CtcpKind};
use slirc_proto::{Command, Message, Response};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::{Framed, LinesCodec, LinesCodecError};
use tracing::{debug, info, trace};

/// Maximum accepted line length, including IRCv3 tags.
const MAX_LINE_LEN: usize = 8191 + 512;
const OUTBOUND_QUEUE: usize = 64;
const EVENT_QUEUE: usize = 256;

/// Plain or TLS connections over TCP.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpTransport;

#[async_trait]
impl Transport for TcpTransport {
    async fn connect(&self, params: ConnectParams) -> Result<WireHandle, TransportError> {
        info!(server = %params.address, port = params.port, tls = params.use_tls, "Opening connection");

        let tcp_stream = TcpStream::connect((params.address.as_str(), params.port)).await?;
        let stream = if params.use_tls {
            upgrade_to_tls(tcp_stream, &params.address).await?
        } else {
            IrcStream::Plain(tcp_stream)
        };
        debug!(tls = stream.is_tls(), "Transport established");

        let framed = Framed::new(stream, LinesCodec::new_with_max_length(MAX_LINE_LEN));
        let (out_tx, out_rx) = mpsc::channel(OUTBOUND_QUEUE);
        let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE);

        let task = tokio::spawn(run_connection(framed, params, out_rx, event_tx));
        Ok(WireHandle::new(out_tx, event_rx, Some(task.abort_handle())))
    }
}

type Lines = Framed<IrcStream, LinesCodec>;

/// PASS (when set), NICK and USER, in that order.
fn registration(params: &ConnectParams) -> Vec<Message> {
    let mut messages = Vec::with_capacity(3);
    if let Some(password) = params.password.as_deref().filter(|p| !p.is_empty()) {
        messages.push(Message::from(Command::PASS(password.to_string())));
    }
    messages.push(Message::nick(params.nick.as_str()));
    messages.push(Message::user(
        params.username.as_str(),
        params.realname.as_str(),
    ));
    messages
}

/// Drive one connection until it closes.
async fn run_connection(
    mut framed: Lines,
    params: ConnectParams,
    mut out_rx: mpsc::Receiver<Message>,
    events: mpsc::Sender<WireEvent>,
) {
    for message in registration(&params) {
        if let Err(e) = write_message(&mut framed, &events, &message).await {
            let _ = events.send(WireEvent::Error(e.to_string())).await;
            return;
        }
    }

    let mut server_error: Option<String> = None;

    loop {
        tokio::select! {
            line = framed.next() => {
                match line {
                    Some(Ok(line)) => {
                        if let Some(reason) = handle_line(&mut framed, &events, &line).await {
                            server_error = Some(reason);
                        }
                    }
                    Some(Err(e)) => {
                        debug!(error = %e, "Read failed");
                        let _ = events.send(WireEvent::Error(e.to_string())).await;
                        return;
                    }
                    None => break,
                }
            }
            out = out_rx.recv() => {
                let Some(message) = out else { break };
                match write_message(&mut framed, &events, &message).await {
                    Ok(()) => {}
                    Err(TransportError::InvalidLine(e)) => debug!(error = %e, "Dropping unencodable message"),
                    Err(e) => {
                        let _ = events.send(WireEvent::Error(e.to_string())).await;
                        return;
                    }
                }
            }
        }
    }

    let _ = events
        .send(WireEvent::Disconnected {
            reason: server_error,
        })
        .await;
}

async fn write_message(
    framed: &mut Lines,
    events: &mpsc::Sender<WireEvent>,
    message: &Message,
) -> Result<(), TransportError> {
    let line = encode(message)?;
    framed.send(line.as_str()).await.map_err(|e| match e {
        LinesCodecError::Io(io) => TransportError::Io(io),
        other => TransportError::Io(std::io::Error::other(other.to_string())),
    })?;
    let _ = events.send(WireEvent::RawSent(line)).await;
    Ok(())
}

/// Translate one inbound line. Returns the text of a server `ERROR`.
async fn handle_line(
    framed: &mut Lines,
    events: &mpsc::Sender<WireEvent>,
    line: &str,
) -> Option<String> {
    let _ = events.send(WireEvent::RawReceived(line.to_string())).await;

    let msg = match line.parse::<Message>() {
        Ok(m) => m,
        Err(e) => {
            trace!(line = %line, error = %e, "Skipping unparseable line");
            return None;
        }
    };

    match &msg.command {
        Command::PING(server, _) => {
            if let Err(e) = write_message(framed, events, &Message::pong(server.as_str())).await {
                debug!(error = %e, "Failed to answer PING");
            }
            None
        }
        Command::ERROR(reason) => Some(reason.clone()),
        _ => {
            if let Some(event) = translate(&msg) {
                let _ = events.send(event).await;
            }
            None
        }
    }
}

/// Map a parsed message to a [`WireEvent`].
pub(crate) fn translate(msg: &Message) -> Option<WireEvent> {
    let nick = || msg.source_nickname().unwrap_or_default().to_string();
    match &msg.command {
        Command::Response(Response::RPL_WELCOME, params) => Some(WireEvent::Registered {
            nick: params.first().cloned().unwrap_or_default(),
        }),
        Command::Response(response, params) => Some(WireEvent::Reply {
            response: *response,
            params: params.clone(),
        }),
        Command::JOIN(channel, _, _) => Some(WireEvent::Joined {
            channel: channel.clone(),
            nick: nick(),
        }),
        Command::PART(channel, reason) => Some(WireEvent::Parted {
            channel: channel.clone(),
            nick: nick(),
            reason: reason.clone(),
        }),
        Command::KICK(channel, target, reason) => Some(WireEvent::Kicked {
            channel: channel.clone(),
            nick: target.clone(),
            by: msg.source_nickname().map(str::to_string),
            reason: reason.clone(),
        }),
        Command::QUIT(reason) => Some(WireEvent::Quit {
            nick: nick(),
            reason: reason.clone(),
        }),
        Command::NICK(new) => Some(WireEvent::NickChanged {
            old: nick(),
            new: new.clone(),
        }),
        Command::PRIVMSG(target, text) => chat(nick(), target, text, MessageKind::Privmsg),
        Command::NOTICE(target, text) => chat(nick(), target, text, MessageKind::Notice),
        _ => None,
    }
}

/// Chat text, with CTCP ACTION unwrapped and other CTCP requests dropped.
fn chat(from: String, target: &str, text: &str, plain: MessageKind) -> Option<WireEvent> {
    let (kind, text) = match Ctcp::parse(text) {
        Some(Ctcp {
            kind: CtcpKind::Action,
            params,
        }) => (MessageKind::Action, params.unwrap_or_default()),
        Some(_) => return None,
        None => (plain, text),
    };
    Some(WireEvent::Message {
        from,
        target: target.to_string(),
        text: text.to_string(),
        kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(line: &str) -> Option<WireEvent> {
        translate(&line.parse().unwrap())
    }

    #[test]
    fn welcome_is_registration() {
        assert_eq!(
            event(":irc 001 Rover :Welcome"),
            Some(WireEvent::Registered {
                nick: "Rover".into()
            })
        );
    }

    #[test]
    fn numerics_become_named_replies() {
        assert_eq!(
            event(":irc 433 * Rover :Nickname is already in use"),
            Some(WireEvent::Reply {
                response: Response::ERR_NICKNAMEINUSE,
                params: vec!["*".into(), "Rover".into(), "Nickname is already in use".into()],
            })
        );
        assert!(matches!(
            event(":irc 005 Rover NICKLEN=30 :are supported"),
            Some(WireEvent::Reply {
                response: Response::RPL_ISUPPORT,
                ..
            })
        ));
    }

    #[test]
    fn registration_sends_pass_nick_user() {
        let params = ConnectParams {
            address: "irc.example.org".into(),
            port: 6667,
            use_tls: false,
            password: Some("secret".into()),
            nick: "Rover".into(),
            username: "abc123".into(),
            realname: "abc123def".into(),
        };
        let lines: Vec<String> = registration(&params)
            .iter()
            .map(|m| encode(m).unwrap())
            .collect();
        assert_eq!(
            lines,
            vec!["PASS secret", "NICK Rover", "USER abc123 0 * :abc123def"]
        );
    }

    #[test]
    fn membership_commands_translate() {
        assert_eq!(
            event(":bob!b@h JOIN :#test"),
            Some(WireEvent::Joined {
                channel: "#test".into(),
                nick: "bob".into()
            })
        );
        assert_eq!(
            event(":op!o@h KICK #test bob :spam"),
            Some(WireEvent::Kicked {
                channel: "#test".into(),
                nick: "bob".into(),
                by: Some("op".into()),
                reason: Some("spam".into()),
            })
        );
        assert_eq!(
            event(":bob!b@h NICK robert"),
            Some(WireEvent::NickChanged {
                old: "bob".into(),
                new: "robert".into()
            })
        );
    }

    #[test]
    fn actions_are_unwrapped_and_other_ctcp_dropped() {
        assert_eq!(
            event(":bob!b@h PRIVMSG #test :\u{1}ACTION waves\u{1}"),
            Some(WireEvent::Message {
                from: "bob".into(),
                target: "#test".into(),
                text: "waves".into(),
                kind: MessageKind::Action,
            })
        );
        assert_eq!(event(":bob!b@h PRIVMSG Rover :\u{1}VERSION\u{1}"), None);
        assert!(matches!(
            event(":bob!b@h NOTICE #test :hi"),
            Some(WireEvent::Message {
                kind: MessageKind::Notice,
                ..
            })
        ));
    }
}
