//! Integration test common infrastructure.
//!
//! Provides a scripted in-process IRC server, a recording host sink and
//! helpers for building bridges against them.

pub mod server;
pub mod sink;

#[allow(unused_imports)]
pub use server::{TestServer, eventually};
#[allow(unused_imports)]
pub use sink::RecordingSink;

use slirc_bridge::host::{Sha256Hasher, StaticUserState};
use slirc_bridge::wire::TcpTransport;
use slirc_bridge::{Bridge, Collaborators, Config};
use std::sync::Arc;

/// Configuration pointing at `server` as `Rover` in `#test`, with short timers.
#[allow(dead_code)]
pub fn config_for(server: &TestServer) -> Config {
    let mut config = Config::default();
    config.server.address = "127.0.0.1".to_string();
    config.server.port = server.port();
    config.server.connect_timeout_ms = 2_000;
    config.identity.nickname = "Rover".to_string();
    config.identity.channel = "#test".to_string();
    config.reconnect.delay_ms = 50;
    config.announcer.ready_delay_ms = 100;
    config.announcer.pulse_ms = 20;
    config.disconnect.grace_ms = 50;
    config
}

/// Bridge over real TCP with a recording sink.
#[allow(dead_code)]
pub fn bridge(config: Config) -> (Bridge, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let bridge = Bridge::new(
        config,
        Collaborators {
            transport: Arc::new(TcpTransport),
            sink: sink.clone(),
            hashing: Arc::new(Sha256Hasher::with_fingerprint("test-salt", "test-machine", None)),
            user: Arc::new(StaticUserState::new(
                Some("usr_test".to_string()),
                Some("Alice".to_string()),
            )),
        },
    );
    (bridge, sink)
}
