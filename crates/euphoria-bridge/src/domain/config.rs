//! Bridge configuration types.
//!
//! [`BridgeConfig`] is the single source of truth for all relay runtime
//! settings.  `main.rs` builds it from the persisted settings plus CLI
//! overrides; tests build it directly with local addresses.

use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default device-control endpoint (intiface-style server on this machine).
pub const DEFAULT_DEVICE_URL: &str = "ws://localhost:12345";

/// Default backend relay endpoint.
pub const DEFAULT_BACKEND_URL: &str = "ws://localhost:4000/api/connect";

/// Rejected relay configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BridgeConfigError {
    /// A relay endpoint must be a `ws://` or `wss://` URL.
    #[error("{which} URL must use ws or wss, got '{url}'")]
    NotWebSocket { which: &'static str, url: String },
}

/// All runtime configuration for the relay bridge.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// WebSocket URL of the local device-control server.
    pub device_url: Url,

    /// WebSocket URL of the backend relay.
    pub backend_url: Url,

    /// `name=value` session cookie sent on the backend handshake.
    ///
    /// The backend only accepts relay connections from logged-in users; it
    /// identifies the user from this cookie.
    pub session_cookie: Option<String>,

    /// Upper bound on each endpoint's TCP + WebSocket handshake.
    pub connect_timeout: Duration,

    /// When set, a failed or finished session is retried after this delay
    /// until shutdown.  When `None`, the bridge runs one session and returns.
    pub reconnect_delay: Option<Duration>,
}

impl BridgeConfig {
    /// Builds a config with default timeouts after checking both schemes.
    ///
    /// # Errors
    ///
    /// [`BridgeConfigError::NotWebSocket`] if either URL is not `ws`/`wss`.
    pub fn new(device_url: Url, backend_url: Url) -> Result<Self, BridgeConfigError> {
        check_ws("device", &device_url)?;
        check_ws("backend", &backend_url)?;
        Ok(Self {
            device_url,
            backend_url,
            ..Self::default()
        })
    }
}

fn check_ws(which: &'static str, url: &Url) -> Result<(), BridgeConfigError> {
    match url.scheme() {
        "ws" | "wss" => Ok(()),
        _ => Err(BridgeConfigError::NotWebSocket {
            which,
            url: url.to_string(),
        }),
    }
}

impl Default for BridgeConfig {
    /// Returns a `BridgeConfig` suitable for local development.
    ///
    /// | Field           | Default                            |
    /// |-----------------|------------------------------------|
    /// | device_url      | `ws://localhost:12345/`            |
    /// | backend_url     | `ws://localhost:4000/api/connect`  |
    /// | session_cookie  | none                               |
    /// | connect_timeout | 10 seconds                         |
    /// | reconnect_delay | none (single session)              |
    fn default() -> Self {
        Self {
            // The `.expect()` calls here are safe because these are
            // compile-time-known valid URL strings.
            device_url: Url::parse(DEFAULT_DEVICE_URL).expect("valid default device URL"),
            backend_url: Url::parse(DEFAULT_BACKEND_URL).expect("valid default backend URL"),
            session_cookie: None,
            connect_timeout: Duration::from_secs(10),
            reconnect_delay: None,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
