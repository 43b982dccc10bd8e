//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Config struct definitions, one per TOML section
//! - [`defaults`]: serde default value functions
//! - [`validation`]: checks run at startup and on every connect

mod defaults;
mod types;
pub mod validation;

pub use types::{
    AnnouncerConfig, Config, ConfigError, DisconnectConfig, HashingConfig, HostConfig,
    IdentityConfig, LoggingConfig, NickServConfig, ReconnectConfig, ResponderConfig,
    ServerConfig,
};
pub use validation::{ValidationError, validate};
