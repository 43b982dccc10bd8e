//! Configuration validation.
//!
//! Runs at startup and again at the beginning of every connection attempt,
//! so a bad address or port fails fast before any network I/O. Incomplete
//! optional sections (NickServ without a password) are only warned about.

use super::Config;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("server.address is required")]
    MissingServerAddress,
    #[error("server.port must be between 1 and 65535, got {0}")]
    InvalidPort(u32),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.address.trim().is_empty() {
        errors.push(ValidationError::MissingServerAddress);
    }
    if !(1..=65535).contains(&config.server.port) {
        errors.push(ValidationError::InvalidPort(config.server.port));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Non-fatal problems worth logging at startup.
pub fn warnings(config: &Config) -> Vec<&'static str> {
    let mut warnings = Vec::new();
    if config.nickserv.enabled && config.nickserv.password.is_empty() {
        warnings.push("nickserv is enabled without a password, identification is skipped");
    }
    warnings
}

/// Render validation errors as a single status line.
pub fn describe(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
