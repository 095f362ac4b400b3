//! The relay session: two sockets, two pumps, one teardown.
//!
//! This module is responsible for:
//!
//! 1. Connecting to the device-control server and the backend concurrently.
//! 2. Running two forwarding directions at the same time:
//!    - **Device → Backend**: every data frame read from the device socket is
//!      written, unmodified, to the backend socket.
//!    - **Backend → Device**: the mirror image.
//! 3. Ending the session as soon as either side closes or fails, or the
//!    shutdown flag is cleared, and then closing *both* sockets.
//! 4. Optionally reconnecting after a delay ([`run_bridge`]).
//!
//! # Partial failure
//!
//! A session is all-or-nothing.  If only one side connects, it is closed
//! again before the error is returned, and once running, the loss of either
//! side closes the other.  A frame arriving on the surviving side after its
//! peer is gone is therefore never written anywhere; it is dropped together
//! with the socket instead of producing a send error.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use futures_util::sink::Sink;
use futures_util::stream::Stream;
use futures_util::{SinkExt, StreamExt};
use tokio::time::{sleep, timeout};
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::{route_frame, BridgeError, RelayAction, RelayStats};
use crate::domain::{BridgeConfig, Endpoint, RelayDirection, SessionEnd, SessionReport};
use crate::infrastructure::endpoint::{connect_endpoint, WsStream};

/// How often the shutdown flag is polled.
const SHUTDOWN_POLL: Duration = Duration::from_millis(200);

/// Upper bound on sending a Close frame during teardown.
const CLOSE_GRACE: Duration = Duration::from_secs(2);

// ── Session ───────────────────────────────────────────────────────────────────

/// Two live WebSocket connections that relay to each other.
pub struct BridgeSession {
    id: Uuid,
    device: WsStream,
    backend: WsStream,
    stats: Arc<RelayStats>,
}

impl BridgeSession {
    /// Connects both endpoints concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first side's [`BridgeError`] if either connection fails.
    /// A side that did connect is closed before returning, so a failed
    /// `open` never leaves a socket behind.
    pub async fn open(config: &BridgeConfig) -> Result<Self, BridgeError> {
        let id = Uuid::new_v4();

        let (device, backend) = tokio::join!(
            connect_endpoint(
                Endpoint::Device,
                &config.device_url,
                None,
                config.connect_timeout,
            ),
            connect_endpoint(
                Endpoint::Backend,
                &config.backend_url,
                config.session_cookie.as_deref(),
                config.connect_timeout,
            ),
        );

        match (device, backend) {
            (Ok(device), Ok(backend)) => {
                info!(
                    "session {id}: connected device={} backend={}",
                    config.device_url, config.backend_url
                );
                Ok(Self {
                    id,
                    device,
                    backend,
                    stats: Arc::new(RelayStats::new()),
                })
            }
            (Ok(mut live), Err(e)) | (Err(e), Ok(mut live)) => {
                warn!("session {id}: {e}; closing the side that did connect");
                let _ = timeout(CLOSE_GRACE, live.close(None)).await;
                Err(e)
            }
            (Err(device_err), Err(backend_err)) => {
                debug!("session {id}: backend also failed: {backend_err}");
                Err(device_err)
            }
        }
    }

    /// Relays frames in both directions until one side goes away or
    /// `running` is cleared, then closes both sockets.
    pub async fn run(self, running: Arc<AtomicBool>) -> SessionReport {
        let BridgeSession {
            id,
            device,
            backend,
            stats,
        } = self;

        // Split each socket so that reading from one side and writing to the
        // other can happen at the same time in both directions.
        let (mut device_tx, mut device_rx) = device.split();
        let (mut backend_tx, mut backend_rx) = backend.split();

        // `select!` finishes with the first branch to complete and drops the
        // other futures, which releases their borrows of the socket halves.
        let ended_by = tokio::select! {
            end = pump(&mut device_rx, &mut backend_tx, RelayDirection::DeviceToBackend, &stats, id) => end,
            end = pump(&mut backend_rx, &mut device_tx, RelayDirection::BackendToDevice, &stats, id) => end,
            _ = wait_for_shutdown(&running) => SessionEnd::Shutdown,
        };

        info!("session {id}: ending ({ended_by}); closing both sides");

        tokio::join!(
            close_quietly(&mut device_tx, Endpoint::Device, id),
            close_quietly(&mut backend_tx, Endpoint::Backend, id),
        );

        let report = SessionReport {
            id,
            ended_by,
            device_to_backend: stats.count(RelayDirection::DeviceToBackend),
            backend_to_device: stats.count(RelayDirection::BackendToDevice),
        };
        info!(
            "session {id}: closed; relayed {} device→backend, {} backend→device",
            report.device_to_backend, report.backend_to_device
        );
        report
    }
}

/// Forwards frames from `source` to `target` until one of them ends.
///
/// Returns which side ended the session and how.
async fn pump<R, W>(
    source: &mut R,
    target: &mut W,
    direction: RelayDirection,
    stats: &RelayStats,
    id: Uuid,
) -> SessionEnd
where
    R: Stream<Item = Result<WsMessage, WsError>> + Unpin,
    W: Sink<WsMessage, Error = WsError> + Unpin,
{
    loop {
        let msg = match source.next().await {
            Some(Ok(msg)) => msg,
            Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed | WsError::Protocol(_))) => {
                debug!("session {id}: {} socket closed", direction.source());
                return SessionEnd::Closed(direction.source());
            }
            Some(Err(e)) => {
                warn!("session {id}: read from {} failed: {e}", direction.source());
                return SessionEnd::Failed(direction.source());
            }
            None => {
                debug!("session {id}: {} stream ended", direction.source());
                return SessionEnd::Closed(direction.source());
            }
        };

        match route_frame(msg) {
            RelayAction::Forward(frame) => {
                if let Err(e) = target.send(frame).await {
                    debug!("session {id}: write to {} failed: {e}", direction.target());
                    return SessionEnd::Failed(direction.target());
                }
                stats.record(direction);
            }
            RelayAction::Close => {
                debug!("session {id}: Close frame from {}", direction.source());
                return SessionEnd::Closed(direction.source());
            }
            RelayAction::Ignore => {}
        }
    }
}

/// Sends a Close frame and flushes, ignoring errors from an already-dead socket.
async fn close_quietly<W>(sink: &mut W, endpoint: Endpoint, id: Uuid)
where
    W: Sink<WsMessage, Error = WsError> + Unpin,
{
    match timeout(CLOSE_GRACE, sink.close()).await {
        Ok(Ok(())) => debug!("session {id}: {endpoint} closed"),
        Ok(Err(e)) => debug!("session {id}: {endpoint} close: {e}"),
        Err(_) => debug!("session {id}: {endpoint} close timed out"),
    }
}

/// Resolves once `running` has been cleared.
async fn wait_for_shutdown(running: &AtomicBool) {
    while running.load(Ordering::Relaxed) {
        sleep(SHUTDOWN_POLL).await;
    }
}

// ── Runner ────────────────────────────────────────────────────────────────────

/// Runs relay sessions until `running` is cleared.
///
/// With `config.reconnect_delay == None` this runs a single session: it
/// returns `Ok(())` when the session ends and an error if it cannot be opened.
/// With a delay configured, open failures and session ends are both followed
/// by a wait and a fresh session.
///
/// # Errors
///
/// Only in single-session mode, when [`BridgeSession::open`] fails.
pub async fn run_bridge(config: BridgeConfig, running: Arc<AtomicBool>) -> anyhow::Result<()> {
    loop {
        if !running.load(Ordering::Relaxed) {
            info!("shutdown flag set; not starting a new session");
            break;
        }

        match BridgeSession::open(&config).await {
            Ok(session) => {
                let report = session.run(Arc::clone(&running)).await;
                if report.ended_by == SessionEnd::Shutdown {
                    break;
                }
            }
            Err(e) if config.reconnect_delay.is_none() => {
                return Err(e).context("failed to open relay session");
            }
            Err(e) => warn!("failed to open relay session: {e}"),
        }

        let Some(delay) = config.reconnect_delay else {
            break;
        };
        info!("reconnecting in {delay:?}");
        tokio::select! {
            _ = sleep(delay) => {}
            _ = wait_for_shutdown(&running) => {}
        }
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
