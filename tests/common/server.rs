//! Scripted in-process IRC server.
//!
//! Speaks just enough of the protocol to register a client, answer JOIN with
//! the usual echo + NAMES burst, and record everything the client sends.
//! Tests inject server-originated lines with [`TestServer::push`].

use parking_lot::Mutex;
use slirc_proto::irc_eq;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

const SERVER_NAME: &str = "test.server";
const DROP_SENTINEL: &str = "\0drop";

#[derive(Default)]
struct Shared {
    connections: AtomicUsize,
    received: Mutex<Vec<String>>,
    reserved_nicks: Mutex<Vec<String>>,
    /// Extra members listed in every NAMES reply.
    members: Mutex<Vec<String>>,
}

/// A running test server.
pub struct TestServer {
    addr: SocketAddr,
    shared: Arc<Shared>,
    push: broadcast::Sender<String>,
    task: JoinHandle<()>,
}

impl TestServer {
    /// Listen on an ephemeral localhost port.
    pub async fn spawn() -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shared = Arc::new(Shared::default());
        shared.members.lock().push("@alice".to_string());
        let (push, _) = broadcast::channel(64);

        let task = {
            let shared = Arc::clone(&shared);
            let push = push.clone();
            tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    shared.connections.fetch_add(1, Ordering::SeqCst);
                    tokio::spawn(serve(stream, Arc::clone(&shared), push.subscribe()));
                }
            })
        };

        Ok(Self {
            addr,
            shared,
            push,
            task,
        })
    }

    pub fn port(&self) -> u32 {
        u32::from(self.addr.port())
    }

    /// Number of connections accepted so far.
    pub fn connection_count(&self) -> usize {
        self.shared.connections.load(Ordering::SeqCst)
    }

    /// Every line received from clients, in order.
    pub fn received(&self) -> Vec<String> {
        self.shared.received.lock().clone()
    }

    /// Received lines starting with `prefix`.
    pub fn received_starting_with(&self, prefix: &str) -> Vec<String> {
        self.received()
            .into_iter()
            .filter(|l| l.starts_with(prefix))
            .collect()
    }

    /// Reject `nick` with 433 during registration.
    pub fn reserve_nick(&self, nick: &str) {
        self.shared.reserved_nicks.lock().push(nick.to_string());
    }

    /// Send a raw line to every connected client.
    pub fn push(&self, line: &str) {
        let _ = self.push.send(line.to_string());
    }

    /// Close every client connection without an ERROR.
    pub fn drop_clients(&self) {
        let _ = self.push.send(DROP_SENTINEL.to_string());
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

struct Client {
    nick: Option<String>,
    user_seen: bool,
    registered: bool,
}

async fn serve(stream: TcpStream, shared: Arc<Shared>, mut push: broadcast::Receiver<String>) {
    let (read, mut write) = stream.into_split();
    let mut lines = BufReader::new(read).lines();
    let mut client = Client {
        nick: None,
        user_seen: false,
        registered: false,
    };

    loop {
        let replies = tokio::select! {
            line = lines.next_line() => {
                let Ok(Some(line)) = line else { return };
                shared.received.lock().push(line.clone());
                match respond(&mut client, &shared, &line) {
                    Some(replies) => replies,
                    None => {
                        let _ = write.write_all(b"ERROR :Closing link\r\n").await;
                        return;
                    }
                }
            }
            pushed = push.recv() => {
                let Ok(pushed) = pushed else { return };
                if pushed == DROP_SENTINEL {
                    return;
                }
                vec![pushed]
            }
        };

        for reply in replies {
            if write
                .write_all(format!("{reply}\r\n").as_bytes())
                .await
                .is_err()
            {
                return;
            }
        }
    }
}

/// Replies to one client line. `None` closes the connection.
fn respond(client: &mut Client, shared: &Shared, line: &str) -> Option<Vec<String>> {
    let mut parts = line.splitn(2, ' ');
    let command = parts.next().unwrap_or_default().to_ascii_uppercase();
    let rest = parts.next().unwrap_or_default();
    let mut replies = Vec::new();

    match command.as_str() {
        "NICK" => {
            let nick = rest.trim_start_matches(':').to_string();
            let reserved = shared
                .reserved_nicks
                .lock()
                .iter()
                .any(|r| irc_eq(r, &nick));
            if reserved {
                let current = client.nick.as_deref().unwrap_or("*");
                replies.push(format!(
                    ":{SERVER_NAME} 433 {current} {nick} :Nickname is already in use"
                ));
            } else if client.registered {
                let old = client.nick.replace(nick.clone()).unwrap_or_default();
                replies.push(format!(":{old}!u@host NICK :{nick}"));
            } else {
                client.nick = Some(nick);
            }
        }
        "USER" => client.user_seen = true,
        "JOIN" => {
            let nick = client.nick.clone().unwrap_or_default();
            let channel = rest.split_whitespace().next().unwrap_or_default();
            let mut names = vec![nick.clone()];
            names.extend(shared.members.lock().iter().cloned());
            replies.push(format!(":{nick}!u@host JOIN {channel}"));
            replies.push(format!(
                ":{SERVER_NAME} 353 {nick} = {channel} :{}",
                names.join(" ")
            ));
            replies.push(format!(
                ":{SERVER_NAME} 366 {nick} {channel} :End of /NAMES list."
            ));
        }
        "PART" => {
            let nick = client.nick.clone().unwrap_or_default();
            let channel = rest.split_whitespace().next().unwrap_or_default();
            replies.push(format!(":{nick}!u@host PART {channel}"));
        }
        "PING" => replies.push(format!(":{SERVER_NAME} PONG {SERVER_NAME} {rest}")),
        "QUIT" => return None,
        _ => {}
    }

    if !client.registered && client.user_seen {
        if let Some(nick) = client.nick.clone() {
            client.registered = true;
            replies.push(format!(":{SERVER_NAME} 001 {nick} :Welcome to the test network {nick}"));
            replies.push(format!(
                ":{SERVER_NAME} 005 {nick} NICKLEN=30 CHANNELLEN=50 FOO=BAR :are supported by this server"
            ));
        }
    }

    Some(replies)
}

/// Poll `check` every 10 ms until it holds or `limit` elapses.
pub async fn eventually(limit: Duration, what: &str, mut check: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out after {limit:?} waiting for {what}");
}
