//! Value types describing a relay session.

use std::fmt;

use uuid::Uuid;

/// One side of the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// The local device-control server.
    Device,
    /// The Euphoria backend relay.
    Backend,
}

impl Endpoint {
    /// The opposite side: where this side's messages are forwarded to.
    pub fn peer(self) -> Endpoint {
        match self {
            Endpoint::Device => Endpoint::Backend,
            Endpoint::Backend => Endpoint::Device,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Device => f.write_str("device"),
            Endpoint::Backend => f.write_str("backend"),
        }
    }
}

/// Direction in which a frame travels through the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelayDirection {
    DeviceToBackend,
    BackendToDevice,
}

impl RelayDirection {
    /// Side the frame was read from.
    pub fn source(self) -> Endpoint {
        match self {
            RelayDirection::DeviceToBackend => Endpoint::Device,
            RelayDirection::BackendToDevice => Endpoint::Backend,
        }
    }

    /// Side the frame is written to.
    pub fn target(self) -> Endpoint {
        self.source().peer()
    }
}

impl fmt::Display for RelayDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.source(), self.target())
    }
}

/// Why a session stopped relaying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// This side sent a Close frame or its stream ended.
    Closed(Endpoint),
    /// Reading from or writing to this side failed.
    Failed(Endpoint),
    /// The process is shutting down.
    Shutdown,
}

impl fmt::Display for SessionEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEnd::Closed(side) => write!(f, "{side} closed"),
            SessionEnd::Failed(side) => write!(f, "{side} failed"),
            SessionEnd::Shutdown => f.write_str("shutdown requested"),
        }
    }
}

/// Summary returned when a session has been torn down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub id: Uuid,
    pub ended_by: SessionEnd,
    /// Frames forwarded from the device to the backend.
    pub device_to_backend: u64,
    /// Frames forwarded from the backend to the device.
    pub backend_to_device: u64,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
