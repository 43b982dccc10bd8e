//! Logging setup and span constructors.

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over the configured filter.
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

/// Standardized span constructors for bridge observability.
pub mod spans {
    use tracing::{Span, info_span};

    /// Span covering one connection attempt.
    pub fn connection(server: &str, port: u16, attempt: u64) -> Span {
        info_span!("connection", server = %server, port = port, attempt = attempt)
    }

    /// Span covering the lifetime of a channel attachment.
    pub fn channel(name: &str) -> Span {
        info_span!("channel", name = %name)
    }
}
