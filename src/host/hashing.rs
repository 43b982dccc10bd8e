//! SHA-256 backed [`HashingProvider`].

use super::HashingProvider;
use async_trait::async_trait;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// How long a looked-up external address is reused.
const EXTERNAL_IP_TTL: Duration = Duration::from_secs(300);
const EXTERNAL_IP_TIMEOUT: Duration = Duration::from_secs(5);

const MACHINE_ID_PATHS: &[&str] = &["/etc/machine-id", "/var/lib/dbus/machine-id"];

/// Hashes `salt || input` with SHA-256 and renders lowercase hex.
pub struct Sha256Hasher {
    salt: String,
    machine_fingerprint: String,
    external_ip_url: Option<String>,
    http: reqwest::Client,
    external_ip: Mutex<Option<(Instant, String)>>,
}

impl Sha256Hasher {
    /// Create a hasher using the local machine fingerprint.
    pub fn new(salt: impl Into<String>, external_ip_url: Option<String>) -> Self {
        Self::with_fingerprint(salt, machine_fingerprint(), external_ip_url)
    }

    /// Create a hasher with an explicit machine fingerprint.
    pub fn with_fingerprint(
        salt: impl Into<String>,
        machine_fingerprint: impl Into<String>,
        external_ip_url: Option<String>,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(EXTERNAL_IP_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            salt: salt.into(),
            machine_fingerprint: machine_fingerprint.into(),
            external_ip_url: external_ip_url.filter(|u| !u.is_empty()),
            http,
            external_ip: Mutex::new(None),
        }
    }

    async fn lookup_external_ip(&self, url: &str) -> Option<String> {
        let response = match self.http.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(url = %url, error = %e, "External address lookup failed");
                return None;
            }
        };
        match response.error_for_status() {
            Ok(r) => r.text().await.ok().map(|t| t.trim().to_string()),
            Err(e) => {
                warn!(url = %url, error = %e, "External address lookup rejected");
                None
            }
        }
    }
}

#[async_trait]
impl HashingProvider for Sha256Hasher {
    fn hash(&self, input: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.salt.as_bytes());
        hasher.update(input.as_bytes());
        hasher
            .finalize()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }

    fn machine_hash(&self) -> String {
        self.hash(&self.machine_fingerprint)
    }

    async fn external_ip_hash(&self) -> String {
        let Some(url) = self.external_ip_url.as_deref() else {
            return String::new();
        };

        let cached = self.external_ip.lock().clone();
        if let Some((at, ip)) = &cached
            && at.elapsed() < EXTERNAL_IP_TTL
        {
            return self.hash(ip);
        }

        match self.lookup_external_ip(url).await {
            Some(ip) if !ip.is_empty() => {
                debug!("External address refreshed");
                let hashed = self.hash(&ip);
                *self.external_ip.lock() = Some((Instant::now(), ip));
                hashed
            }
            // Keep using a stale address rather than flapping to empty.
            _ => cached.map(|(_, ip)| self.hash(&ip)).unwrap_or_default(),
        }
    }
}

/// Best-effort stable machine fingerprint.
pub fn machine_fingerprint() -> String {
    for path in MACHINE_ID_PATHS {
        if let Ok(id) = std::fs::read_to_string(path) {
            let id = id.trim();
            if !id.is_empty() {
                return id.to_string();
            }
        }
    }
    std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .unwrap_or_else(|_| "unknown-machine".to_string())
}
