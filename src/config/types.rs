//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Bridge configuration.
///
/// Every section has defaults, so a minimal file only needs
/// `[server] address`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server connection settings.
    pub server: ServerConfig,
    /// Nickname and target channel.
    pub identity: IdentityConfig,
    /// Automatic reconnection.
    pub reconnect: ReconnectConfig,
    /// Nickname service authentication.
    pub nickserv: NickServConfig,
    /// Traffic logging toggles.
    pub logging: LoggingConfig,
    /// Identity announcement timing.
    pub announcer: AnnouncerConfig,
    /// `@nick verb` command replies.
    pub responder: ResponderConfig,
    /// Host application descriptors and user state.
    pub host: HostConfig,
    /// Identity hashing inputs.
    pub hashing: HashingConfig,
    /// Quit behavior.
    pub disconnect: DisconnectConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Server connection configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server hostname (e.g., "irc.libera.chat").
    pub address: String,
    /// Server port, validated to 1..=65535.
    pub port: u32,
    /// Connect with TLS.
    pub tls: bool,
    /// Server password (PASS), if any.
    pub password: Option<String>,
    /// Bound on TCP connect + TLS handshake.
    pub connect_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            port: default_port(),
            tls: false,
            password: None,
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl ServerConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// Nickname and channel configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Requested nickname. Empty means "use the host display name".
    pub nickname: String,
    /// Channel joined after registration. Empty means "don't join".
    pub channel: String,
    /// Nickname used when neither a nickname nor a display name is available.
    pub fallback_nickname: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            nickname: String::new(),
            channel: String::new(),
            fallback_nickname: default_fallback_nickname(),
        }
    }
}

/// Reconnection policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    pub enabled: bool,
    /// Fixed delay before each reconnect attempt.
    pub delay_ms: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            delay_ms: default_reconnect_delay_ms(),
        }
    }
}

impl ReconnectConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Nickname service (NickServ) authentication.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NickServConfig {
    pub enabled: bool,
    /// Service nickname to message.
    pub service: String,
    /// Account name; when empty only the password is sent.
    pub account: Option<String>,
    pub password: String,
    /// Delay after registration before identifying.
    pub delay_ms: u64,
}

impl Default for NickServConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            service: default_nickserv_service(),
            account: None,
            password: String::new(),
            delay_ms: default_nickserv_delay_ms(),
        }
    }
}

impl NickServConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Traffic logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    /// Log PRIVMSG / NOTICE traffic.
    pub chat: bool,
    /// Log numerics, keepalives and other system traffic.
    pub system: bool,
    /// Log membership and channel events.
    pub events: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            chat: true,
            system: false,
            events: true,
        }
    }
}

/// Identity announcement timing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnnouncerConfig {
    pub enabled: bool,
    /// Interval between change checks.
    pub interval_secs: u64,
    /// Delay after joining before the first broadcast.
    pub settle_ms: u64,
    /// Delay after the first broadcast before the ready signal.
    pub ready_delay_ms: u64,
    /// Length of pulse parameters.
    pub pulse_ms: u64,
}

impl Default for AnnouncerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            interval_secs: default_announce_interval_secs(),
            settle_ms: default_announce_settle_ms(),
            ready_delay_ms: default_ready_delay_ms(),
            pulse_ms: default_pulse_ms(),
        }
    }
}

impl AnnouncerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn ready_delay(&self) -> Duration {
        Duration::from_millis(self.ready_delay_ms)
    }

    pub fn pulse(&self) -> Duration {
        Duration::from_millis(self.pulse_ms)
    }
}

/// Command responder toggle.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResponderConfig {
    pub enabled: bool,
}

/// Host application descriptors.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub app_name: String,
    pub app_version: String,
    /// Display name reported by the host before it provides one at runtime.
    pub display_name: Option<String>,
    /// User identifier reported by the host before it provides one at runtime.
    pub user_id: Option<String>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            app_name: default_host_app_name(),
            app_version: default_host_app_version(),
            display_name: None,
            user_id: None,
        }
    }
}

/// Identity hashing configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HashingConfig {
    /// Salt mixed into every hash.
    pub salt: String,
    /// Plain-text "what is my IP" endpoint; unset disables the lookup.
    pub external_ip_url: Option<String>,
}

/// Quit behavior.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisconnectConfig {
    /// Time allowed for the QUIT to flush before the connection is dropped.
    pub grace_ms: u64,
    /// Default QUIT reason.
    pub quit_message: String,
}

impl Default for DisconnectConfig {
    fn default() -> Self {
        Self {
            grace_ms: default_quit_grace_ms(),
            quit_message: default_quit_message(),
        }
    }
}

impl DisconnectConfig {
    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn minimal_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
[server]
address = "irc.example.org"
"#,
        )
        .unwrap();

        assert_eq!(config.server.address, "irc.example.org");
        assert_eq!(config.server.port, 6667);
        assert!(!config.server.tls);
        assert!(config.reconnect.enabled);
        assert_eq!(config.reconnect.delay_ms, 5_000);
        assert_eq!(config.identity.fallback_nickname, "SlircUser");
        assert_eq!(config.announcer.interval_secs, 60);
        assert_eq!(config.disconnect.grace_ms, 500);
        assert!(!config.responder.enabled);
        assert!(!config.nickserv.enabled);
    }

    #[test]
    fn full_config_parses() {
        let config: Config = toml::from_str(
            r##"
[server]
address = "irc.example.org"
port = 6697
tls = true
password = "hunter2"

[identity]
nickname = "Rover"
channel = "#test"

[reconnect]
enabled = false
delay_ms = 100

[nickserv]
enabled = true
password = "secret"

[logging]
chat = false
system = true

[responder]
enabled = true

[host]
app_name = "Host"
display_name = "Alice"

[hashing]
salt = "pepper"
external_ip_url = "https://api.ipify.org"
"##,
        )
        .unwrap();

        assert_eq!(config.server.port, 6697);
        assert!(config.server.tls);
        assert_eq!(config.identity.channel, "#test");
        assert!(!config.reconnect.enabled);
        assert_eq!(config.nickserv.service, "NickServ");
        assert!(config.logging.system);
        assert!(config.responder.enabled);
        assert_eq!(config.host.display_name.as_deref(), Some("Alice"));
        assert_eq!(config.hashing.salt, "pepper");
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\naddress = \"irc.example.org\"\nport = 7000").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.port, 7000);
    }

    #[test]
    fn load_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\naddress = ").unwrap();
        assert!(matches!(Config::load(file.path()), Err(ConfigError::Parse(_))));
    }
}
