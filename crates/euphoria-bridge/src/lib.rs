//! euphoria-bridge library crate.
//!
//! This crate relays WebSocket messages between a local device-control server
//! (intiface-style) and the Euphoria backend, and talks to the backend's
//! session endpoints on behalf of the `euphoria` command-line tool.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Device-control server (ws://localhost:12345)
//!         ↕
//! [euphoria-bridge]
//!   ├── domain/           Pure types: BridgeConfig, Endpoint, SessionReport
//!   ├── application/      Frame routing, header/settings views, SessionApi seam
//!   └── infrastructure/
//!         ├── endpoint/   WebSocket client handshake (tokio-tungstenite)
//!         ├── bridge/     BridgeSession: two sockets, two pumps, joint teardown
//!         └── api_client/ GET /me, POST /login (reqwest)
//!         ↕
//! Euphoria backend (ws://localhost:4000/api/connect)
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O and no async.
//! - `application` depends on `domain` and `euphoria-core`; it is pure apart
//!   from the async `SessionApi` trait it declares.
//! - `infrastructure` depends on all other layers plus `tokio`, `tungstenite`
//!   and `reqwest`.

/// Domain layer: configuration and session value types (no I/O).
pub mod domain;

/// Application layer: relay routing decisions and views.
pub mod application;

/// Infrastructure layer: WebSocket endpoints, the relay session, HTTP client.
pub mod infrastructure;
