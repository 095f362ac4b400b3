//! WebSocket client connections to the two relay endpoints.
//!
//! Both sides of the relay are *servers*: the bridge dials out to each of
//! them.  The device-control server is typically plain `ws://` on localhost;
//! the backend may be `wss://`, which tokio-tungstenite handles through
//! rustls when the URL scheme asks for it.
//!
//! # Portability note
//!
//! Only `tokio::net` and tokio-tungstenite APIs are used, so this works the
//! same on Windows, Linux, and macOS.

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{header::COOKIE, HeaderValue};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::debug;
use url::Url;

use crate::application::BridgeError;
use crate::domain::Endpoint;

/// A connected relay endpoint.
pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Opens a WebSocket connection to `url`.
///
/// When `cookie` is given it is sent as the `Cookie` header of the HTTP
/// upgrade request.  The whole TCP connect + handshake must finish within
/// `connect_timeout`.
///
/// # Errors
///
/// - [`BridgeError::InvalidRequest`] if `url` cannot form a handshake request
/// - [`BridgeError::InvalidCookie`] if the cookie is not a valid header value
/// - [`BridgeError::Connect`] if the connection or handshake fails
/// - [`BridgeError::ConnectTimeout`] if it takes longer than `connect_timeout`
pub async fn connect_endpoint(
    endpoint: Endpoint,
    url: &Url,
    cookie: Option<&str>,
    connect_timeout: Duration,
) -> Result<WsStream, BridgeError> {
    let mut request =
        url.as_str()
            .into_client_request()
            .map_err(|source| BridgeError::InvalidRequest {
                endpoint,
                url: url.to_string(),
                source,
            })?;

    if let Some(cookie) = cookie {
        let value = HeaderValue::from_str(cookie).map_err(|_| BridgeError::InvalidCookie)?;
        request.headers_mut().insert(COOKIE, value);
    }

    debug!("connecting to {endpoint} at {url}");

    match timeout(connect_timeout, connect_async(request)).await {
        Ok(Ok((stream, response))) => {
            debug!(
                "{endpoint} handshake complete (HTTP {})",
                response.status().as_u16()
            );
            Ok(stream)
        }
        Ok(Err(source)) => Err(BridgeError::Connect {
            endpoint,
            url: url.to_string(),
            source,
        }),
        Err(_) => Err(BridgeError::ConnectTimeout {
            endpoint,
            url: url.to_string(),
            timeout: connect_timeout,
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
