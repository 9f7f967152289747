//! Shared configuration types for Unmonitarr
//!
//! This crate provides the environment-driven configuration primitives used by
//! the daemon and the catalog clients: connection settings for each *arr
//! service, process-wide flags, and small helpers for reading typed values
//! from the environment.

mod arr;
mod error;

pub use arr::ArrConfig;
pub use error::{ConfigError, ConfigResult};

use std::env;

/// Process-wide settings shared by every component
#[derive(Debug, Clone)]
pub struct CommonConfig {
    /// Intercept mutating catalog calls and only log them
    pub dry_run: bool,

    /// Log level (from LOG_LEVEL, lowercased)
    pub log_level: String,

    /// Display timezone reported at startup (all scheduling is done in UTC)
    pub timezone: String,
}

impl CommonConfig {
    /// Load common configuration from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            dry_run: parse_bool_env("DRY_RUN", true),
            log_level: get_env_or_default("LOG_LEVEL", "info").to_lowercase(),
            timezone: get_env_or_default("TZ", "UTC"),
        })
    }
}

/// Helper function to get a required environment variable
pub fn get_required_env(name: &str) -> ConfigResult<String> {
    env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

/// Helper function to get an optional environment variable with a default
pub fn get_env_or_default(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Helper function to parse an environment variable into a specific type
pub fn parse_env<T>(name: &str, default: T) -> ConfigResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val
            .trim()
            .parse()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("{}", e))),
        Err(_) => Ok(default),
    }
}

/// Read a boolean flag; `1`, `true`, `yes` and `on` are true, anything else is false
pub fn parse_bool_env(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(val) => parse_bool(&val),
        Err(_) => default,
    }
}

/// Interpret a flag value the way every boolean setting does
pub fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
