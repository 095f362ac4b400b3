//! HTTP client for the backend session endpoints.
//!
//! | Call                     | Result                                   |
//! |--------------------------|------------------------------------------|
//! | `GET  {base}/me`         | [`UserStatus`] JSON                      |
//! | `POST {base}/login?code` | `Set-Cookie` with the backend session id |
//!
//! The session cookie from [`BackendSettings::session_cookie`] is attached to
//! every request; the backend keys its session store on it.

use std::time::Duration;

use async_trait::async_trait;
use euphoria_core::{BackendSettings, UserStatus};
use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::{Client, RequestBuilder, StatusCode};
use tracing::debug;

use crate::application::{ApiError, SessionApi};

/// Request timeout for the session endpoints.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// [`SessionApi`] over HTTP with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpSessionApi {
    client: Client,
    backend: BackendSettings,
}

impl HttpSessionApi {
    /// Creates a client for the backend described by `backend`.
    ///
    /// # Errors
    ///
    /// [`ApiError::Transport`] if the HTTP client cannot be built (e.g. the
    /// TLS backend fails to initialise).
    pub fn new(backend: BackendSettings) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self { client, backend })
    }

    fn with_cookie(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.backend.session_cookie {
            Some(cookie) => request.header(COOKIE, cookie),
            None => request,
        }
    }
}

#[async_trait]
impl SessionApi for HttpSessionApi {
    async fn me(&self) -> Result<UserStatus, ApiError> {
        let url = self.backend.endpoint("me")?;
        debug!("GET {url}");

        let response = self
            .with_cookie(self.client.get(url))
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }
        response
            .json::<UserStatus>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn login(&self, code: &str) -> Result<String, ApiError> {
        let url = self.backend.endpoint("login")?;
        debug!("POST {url}");

        let response = self
            .with_cookie(self.client.post(url).query(&[("code", code)]))
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        match response.status() {
            StatusCode::BAD_REQUEST => return Err(ApiError::BadCode),
            status if !status.is_success() => return Err(ApiError::Status(status.as_u16())),
            _ => {}
        }

        response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(cookie_pair)
            .ok_or(ApiError::MissingCookie)
    }
}

/// Extracts the `name=value` part of a `Set-Cookie` header value.
///
/// ```rust
/// use euphoria_bridge::infrastructure::api_client::cookie_pair;
///
/// assert_eq!(
///     cookie_pair("id=abc123; Path=/; HttpOnly").as_deref(),
///     Some("id=abc123")
/// );
/// assert_eq!(cookie_pair("; Path=/"), None);
/// ```
pub fn cookie_pair(set_cookie: &str) -> Option<String> {
    let pair = set_cookie.split(';').next()?.trim();
    let (name, _value) = pair.split_once('=')?;
    if name.trim().is_empty() {
        return None;
    }
    Some(pair.to_string())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serves exactly one HTTP request with `response` and hands back the raw
    /// request head so tests can inspect path, query and headers.
    async fn serve_once(response: String) -> (BackendSettings, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
            String::from_utf8_lossy(&buf).into_owned()
        });
        let backend = BackendSettings {
            api_base_url: format!("http://{addr}/api/"),
            session_cookie: None,
        };
        (backend, handle)
    }

    fn http_response(status_line: &str, extra_headers: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status_line}\r\n{extra_headers}Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    #[test]
    fn test_cookie_pair_rejects_missing_equals() {
        assert_eq!(cookie_pair("garbage"), None);
    }

    #[test]
    fn test_cookie_pair_keeps_value_with_equals_signs() {
        assert_eq!(cookie_pair("id=a=b==; Secure").as_deref(), Some("id=a=b=="));
    }

    #[tokio::test]
    async fn test_me_parses_logged_in_user() {
        // Arrange
        let body = r#"{"status":"LoggedIn","user":{"id":"1","username":"kit","avatar":null}}"#;
        let (backend, server) =
            serve_once(http_response("200 OK", "Content-Type: application/json\r\n", body)).await;
        let api = HttpSessionApi::new(backend).unwrap();

        // Act
        let status = api.me().await.unwrap();

        // Assert
        assert_eq!(status.user().map(|u| u.username.as_str()), Some("kit"));
        let request = server.await.unwrap();
        assert!(request.starts_with("GET /api/me "), "request was: {request}");
    }

    #[tokio::test]
    async fn test_me_sends_stored_cookie() {
        let (mut backend, server) = serve_once(http_response(
            "200 OK",
            "Content-Type: application/json\r\n",
            r#"{"status":"LoggedOut"}"#,
        ))
        .await;
        backend.session_cookie = Some("id=xyz".to_string());
        let api = HttpSessionApi::new(backend).unwrap();

        assert_eq!(api.me().await.unwrap(), UserStatus::LoggedOut);

        let request = server.await.unwrap().to_ascii_lowercase();
        assert!(request.contains("cookie: id=xyz"), "request was: {request}");
    }

    #[tokio::test]
    async fn test_me_server_error_is_status_error() {
        let (backend, _server) =
            serve_once(http_response("500 Internal Server Error", "", "")).await;
        let api = HttpSessionApi::new(backend).unwrap();

        let err = api.me().await.unwrap_err();

        assert!(matches!(err, ApiError::Status(500)));
    }

    #[tokio::test]
    async fn test_me_bad_json_is_decode_error() {
        let (backend, _server) = serve_once(http_response(
            "200 OK",
            "Content-Type: application/json\r\n",
            "{not json",
        ))
        .await;
        let api = HttpSessionApi::new(backend).unwrap();

        assert!(matches!(api.me().await, Err(ApiError::Decode(_))));
    }

    #[tokio::test]
    async fn test_login_returns_session_cookie_and_sends_code() {
        // Arrange
        let (backend, server) = serve_once(http_response(
            "200 OK",
            "Set-Cookie: id=sess42; Path=/; HttpOnly\r\n",
            "",
        ))
        .await;
        let api = HttpSessionApi::new(backend).unwrap();

        // Act
        let cookie = api.login("oauth-code").await.unwrap();

        // Assert
        assert_eq!(cookie, "id=sess42");
        let request = server.await.unwrap();
        assert!(
            request.starts_with("POST /api/login?code=oauth-code "),
            "request was: {request}"
        );
    }

    #[tokio::test]
    async fn test_login_bad_request_is_bad_code() {
        let (backend, _server) =
            serve_once(http_response("400 Bad Request", "", "Invalid auth code passed")).await;
        let api = HttpSessionApi::new(backend).unwrap();

        assert!(matches!(api.login("nope").await, Err(ApiError::BadCode)));
    }

    #[tokio::test]
    async fn test_login_without_cookie_is_missing_cookie() {
        // The backend answers 200 but creates no session when the code
        // exchange yielded no user.
        let (backend, _server) = serve_once(http_response("200 OK", "", "")).await;
        let api = HttpSessionApi::new(backend).unwrap();

        assert!(matches!(api.login("x").await, Err(ApiError::MissingCookie)));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let api = HttpSessionApi::new(BackendSettings {
            api_base_url: format!("http://{addr}/api/"),
            session_cookie: None,
        })
        .unwrap();

        assert!(matches!(api.me().await, Err(ApiError::Transport(_))));
    }
}
