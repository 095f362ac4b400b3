//! Domain layer for euphoria-bridge.
//!
//! The domain layer contains plain types that have no dependencies on I/O,
//! networking, or async runtimes.
//!
//! # What belongs in the domain layer?
//!
//! - Relay configuration ([`BridgeConfig`])
//! - Names for the two sides of the relay and for how a session ended
//!
//! # What does NOT belong here?
//!
//! - Any `tokio`, `TcpStream`, or `WebSocket` types
//! - File I/O or environment variable reading

pub mod config;
pub mod session;

pub use config::{BridgeConfig, BridgeConfigError};
pub use session::{Endpoint, RelayDirection, SessionEnd, SessionReport};
