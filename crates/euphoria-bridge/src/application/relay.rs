//! Core relay logic.
//!
//! The bridge is a passthrough: a data frame read on one side is written to
//! the other side *unmodified*.  Text stays text, binary stays binary, and the
//! payload bytes are never inspected.  This module holds the pure decision
//! of what to do with each frame so it can be unit tested without sockets.
//!
//! # Control frames
//!
//! ```text
//! Text / Binary  → Forward (verbatim)
//! Ping / Pong    → Ignore  (per-hop; tungstenite answers pings itself)
//! Close          → Close   (ends the session; both sides are torn down)
//! raw Frame      → Ignore
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use thiserror::Error;
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};

use crate::domain::{Endpoint, RelayDirection};

// ── Error type ────────────────────────────────────────────────────────────────

/// Errors that prevent a relay session from being established.
///
/// Failures *during* a session are not errors: they end the session and are
/// reported through [`crate::domain::SessionEnd`].
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The endpoint URL could not be turned into a WebSocket handshake request.
    #[error("{endpoint} URL '{url}' is not a valid WebSocket request: {source}")]
    InvalidRequest {
        endpoint: Endpoint,
        url: String,
        #[source]
        source: WsError,
    },

    /// The stored session cookie contains bytes not allowed in an HTTP header.
    #[error("session cookie is not a valid HTTP header value")]
    InvalidCookie,

    /// TCP connect or WebSocket handshake failed.
    #[error("failed to connect to {endpoint} at {url}: {source}")]
    Connect {
        endpoint: Endpoint,
        url: String,
        #[source]
        source: WsError,
    },

    /// The handshake did not complete within the configured timeout.
    #[error("timed out after {timeout:?} connecting to {endpoint} at {url}")]
    ConnectTimeout {
        endpoint: Endpoint,
        url: String,
        timeout: Duration,
    },
}

impl BridgeError {
    /// The side this error belongs to, if any.
    pub fn endpoint(&self) -> Option<Endpoint> {
        match self {
            BridgeError::InvalidRequest { endpoint, .. }
            | BridgeError::Connect { endpoint, .. }
            | BridgeError::ConnectTimeout { endpoint, .. } => Some(*endpoint),
            BridgeError::InvalidCookie => Some(Endpoint::Backend),
        }
    }
}

// ── Frame routing ─────────────────────────────────────────────────────────────

/// What the bridge does with one incoming frame.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayAction {
    /// Write this frame, unchanged, to the other side.
    Forward(WsMessage),
    /// The sending side is closing; tear the session down.
    Close,
    /// Nothing to relay.
    Ignore,
}

/// Decides what to do with a frame read from either side.
///
/// # Example
///
/// ```rust
/// use euphoria_bridge::application::{route_frame, RelayAction};
/// use tokio_tungstenite::tungstenite::Message;
///
/// let msg = Message::Text("{\"Ok\":{\"Id\":1}}".to_string());
/// assert_eq!(route_frame(msg.clone()), RelayAction::Forward(msg));
/// ```
pub fn route_frame(msg: WsMessage) -> RelayAction {
    match msg {
        WsMessage::Text(_) | WsMessage::Binary(_) => RelayAction::Forward(msg),
        WsMessage::Ping(_) | WsMessage::Pong(_) => RelayAction::Ignore,
        WsMessage::Close(_) => RelayAction::Close,
        WsMessage::Frame(_) => RelayAction::Ignore,
    }
}

// ── Counters ──────────────────────────────────────────────────────────────────

/// Per-direction count of relayed frames.
///
/// Shared between the two pumps of a session and readable from outside while
/// the session runs, so the counters are atomics rather than plain integers.
#[derive(Debug, Default)]
pub struct RelayStats {
    device_to_backend: AtomicU64,
    backend_to_device: AtomicU64,
}

impl RelayStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one forwarded frame.
    pub fn record(&self, direction: RelayDirection) {
        self.counter(direction).fetch_add(1, Ordering::Relaxed);
    }

    /// Frames forwarded so far in `direction`.
    pub fn count(&self, direction: RelayDirection) -> u64 {
        self.counter(direction).load(Ordering::Relaxed)
    }

    fn counter(&self, direction: RelayDirection) -> &AtomicU64 {
        match direction {
            RelayDirection::DeviceToBackend => &self.device_to_backend,
            RelayDirection::BackendToDevice => &self.backend_to_device,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
