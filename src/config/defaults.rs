//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}

// =============================================================================
// Server Defaults
// =============================================================================

pub fn default_port() -> u32 {
    6667
}

pub fn default_connect_timeout_ms() -> u64 {
    10_000
}

// =============================================================================
// Identity Defaults
// =============================================================================

pub fn default_fallback_nickname() -> String {
    "SlircUser".to_string()
}

// =============================================================================
// Reconnect Defaults
// =============================================================================

pub fn default_reconnect_delay_ms() -> u64 {
    5_000
}

// =============================================================================
// Nickname Service Defaults
// =============================================================================

pub fn default_nickserv_service() -> String {
    "NickServ".to_string()
}

pub fn default_nickserv_delay_ms() -> u64 {
    2_000
}

// =============================================================================
// Logging Defaults
// =============================================================================

pub fn default_log_filter() -> String {
    "info".to_string()
}

// =============================================================================
// Announcer Defaults
// =============================================================================

pub fn default_announce_interval_secs() -> u64 {
    60
}

pub fn default_announce_settle_ms() -> u64 {
    500
}

pub fn default_ready_delay_ms() -> u64 {
    1_000
}

pub fn default_pulse_ms() -> u64 {
    250
}

// =============================================================================
// Host Defaults
// =============================================================================

pub fn default_host_app_name() -> String {
    "standalone".to_string()
}

pub fn default_host_app_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

// =============================================================================
// Disconnect Defaults
// =============================================================================

pub fn default_quit_grace_ms() -> u64 {
    500
}

pub fn default_quit_message() -> String {
    "Bridge shutting down".to_string()
}
