//! # euphoria-core
//!
//! Shared library for the Euphoria relay containing the domain entities
//! (logged-in user, connection settings, trigger words, OAuth link) and the
//! TOML persistence for the user's settings.
//!
//! This crate has zero dependencies on network sockets or async runtimes.
//!
//! # Architecture overview (for beginners)
//!
//! Euphoria pairs a local device-control server (an intiface-style WebSocket
//! service running on the user's machine) with a remote backend.  The
//! `euphoria-bridge` crate relays messages between the two.  This crate is
//! the foundation both sides of that program agree on:
//!
//! - **`domain`** – Plain data types and their validation rules.  The web
//!   client kept these in a client-side store; here they are ordinary structs
//!   and enums with `serde` support.
//!
//! - **`storage`** – Reads and writes the settings document as TOML in the
//!   platform configuration directory.

pub mod domain;
pub mod storage;

// Re-export the most-used types at the crate root so callers can write
// `euphoria_core::TriggerWords` instead of `euphoria_core::domain::trigger::TriggerWords`.
pub use domain::connection::{ConnectionError, ConnectionSettings};
pub use domain::endpoints::{BackendSettings, EndpointError, OAuthSettings};
pub use domain::trigger::{TriggerError, TriggerMatcher, TriggerWords};
pub use domain::user::{User, UserStatus};
pub use storage::config::{ConfigError, Settings};
