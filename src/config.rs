//! Server configuration parsed from environment variables.
//!
//! Recognized variables:
//! - `HOST`: bind address, default `127.0.0.1`
//! - `PORT`: bind port, default `8000`
//! - `WS_CLIENT_BUFFER`: per-session outbound queue capacity, default `256`

use std::str::FromStr;

use crate::message::ErrorCode;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_CLIENT_BUFFER: usize = 256;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
    #[error("WS_CLIENT_BUFFER must be at least 1")]
    ZeroBuffer,
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Invalid { .. } => "E_CONFIG_INVALID",
            Self::ZeroBuffer => "E_CONFIG_ZERO_BUFFER",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub client_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: DEFAULT_HOST.to_owned(), port: DEFAULT_PORT, client_buffer: DEFAULT_CLIENT_BUFFER }
    }
}

impl ServerConfig {
    /// Build config from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup. Unset keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be parsed or the buffer is zero.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("HOST")
            .map(|h| h.trim().to_owned())
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_owned());
        let port = parse_var(&lookup, "PORT", DEFAULT_PORT)?;
        let client_buffer = parse_var(&lookup, "WS_CLIENT_BUFFER", DEFAULT_CLIENT_BUFFER)?;

        if client_buffer == 0 {
            return Err(ConfigError::ZeroBuffer);
        }

        Ok(Self { host, port, client_buffer })
    }

    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { var, value: raw }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
