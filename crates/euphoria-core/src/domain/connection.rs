//! Connection settings for the local device-control endpoint.
//!
//! The user points Euphoria at the intiface-style server running on their
//! machine by host and port.  Defaults match that server's stock listener
//! (`localhost:12345`).

use std::net::Ipv6Addr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Default device-control host.
pub const DEFAULT_DEVICE_HOST: &str = "localhost";

/// Default device-control port.
pub const DEFAULT_DEVICE_PORT: u16 = 12345;

/// Validation failures for [`ConnectionSettings`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConnectionError {
    /// The host was empty or whitespace only.
    #[error("host must not be empty")]
    EmptyHost,

    /// The host contained whitespace, a scheme, or a path.
    #[error("invalid host '{0}': expected a bare hostname or IP address")]
    InvalidHost(String),

    /// Port 0 cannot be connected to.
    #[error("port must be between 1 and 65535")]
    InvalidPort,

    /// The host/port pair did not form a valid WebSocket URL.
    #[error("could not build device URL from '{0}'")]
    InvalidUrl(String),
}

/// User-editable target for the local device-control endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    DEFAULT_DEVICE_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_DEVICE_PORT
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ConnectionSettings {
    /// Replaces the host after validating it.
    ///
    /// # Errors
    ///
    /// [`ConnectionError::EmptyHost`] or [`ConnectionError::InvalidHost`].
    pub fn set_host(&mut self, host: &str) -> Result<(), ConnectionError> {
        let host = host.trim();
        validate_host(host)?;
        self.host = host.to_string();
        Ok(())
    }

    /// Replaces the port.
    ///
    /// # Errors
    ///
    /// [`ConnectionError::InvalidPort`] for port 0.
    pub fn set_port(&mut self, port: u16) -> Result<(), ConnectionError> {
        if port == 0 {
            return Err(ConnectionError::InvalidPort);
        }
        self.port = port;
        Ok(())
    }

    /// Checks both fields, e.g. after loading them from disk.
    pub fn validate(&self) -> Result<(), ConnectionError> {
        validate_host(&self.host)?;
        if self.port == 0 {
            return Err(ConnectionError::InvalidPort);
        }
        Ok(())
    }

    /// Builds the `ws://host:port` URL of the device endpoint.
    ///
    /// Bare IPv6 literals are wrapped in brackets.
    ///
    /// # Errors
    ///
    /// Any validation error, or [`ConnectionError::InvalidUrl`] when the
    /// result does not parse.
    pub fn device_url(&self) -> Result<Url, ConnectionError> {
        self.validate()?;
        let host = if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        let raw = format!("ws://{host}:{}", self.port);
        Url::parse(&raw).map_err(|_| ConnectionError::InvalidUrl(raw))
    }
}

fn validate_host(host: &str) -> Result<(), ConnectionError> {
    if host.trim().is_empty() {
        return Err(ConnectionError::EmptyHost);
    }
    if host.chars().any(char::is_whitespace) || host.contains("://") || host.contains('/') {
        return Err(ConnectionError::InvalidHost(host.to_string()));
    }
    // A colon is only valid inside an IPv6 literal; `name:port` is not a host.
    if host.contains(':') {
        let literal = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);
        if literal.parse::<Ipv6Addr>().is_err() {
            return Err(ConnectionError::InvalidHost(host.to_string()));
        }
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
