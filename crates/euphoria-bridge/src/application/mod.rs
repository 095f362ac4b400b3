//! Application layer for euphoria-bridge.
//!
//! The application layer knows *what* to do with a frame or a session status,
//! but delegates *how* to talk to the network to the infrastructure layer.
//!
//! # Responsibilities
//!
//! - Deciding, per incoming WebSocket frame, whether it is relayed, ignored,
//!   or ends the session ([`route_frame`])
//! - Counting relayed frames ([`RelayStats`])
//! - Turning a session status into one of the two header variants and
//!   rendering the settings view
//! - Defining the error types for relay and backend failures
//!
//! # What does NOT belong here?
//!
//! - Opening sockets or HTTP connections (that is infrastructure)
//! - Tokio task spawning

pub mod relay;
pub mod views;

pub use relay::{route_frame, BridgeError, RelayAction, RelayStats};
pub use views::{log_in, render_settings, resolve_header, ApiError, HeaderView, SessionApi};
