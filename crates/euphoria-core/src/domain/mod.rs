//! Domain entities shared by every Euphoria component.
//!
//! Nothing in this module performs I/O.  Validation happens at construction
//! or mutation time so that a value of one of these types is always usable.

pub mod connection;
pub mod endpoints;
pub mod trigger;
pub mod user;
