//! Infrastructure layer for euphoria-bridge.
//!
//! The infrastructure layer handles all I/O: opening the two relay WebSocket
//! connections, pumping frames between them, and calling the backend's HTTP
//! session endpoints.
//!
//! # Responsibilities
//!
//! - WebSocket client handshakes, with a timeout and the session cookie
//! - Running the two forwarding directions of a relay session concurrently
//! - Tearing both sockets down together when either side goes away
//! - The reconnect loop and the graceful shutdown signal
//! - `GET /me` / `POST /login` over HTTP
//!
//! # What does NOT belong here?
//!
//! - Deciding what to do with a frame (that is the application layer)
//! - Configuration parsing (that is done in `main.rs`)

pub mod api_client;
pub mod bridge;
pub mod endpoint;

// Re-export the primary entry points so `main.rs` can call them concisely.
pub use api_client::HttpSessionApi;
pub use bridge::{run_bridge, BridgeSession};
