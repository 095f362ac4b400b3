//! Header and settings views.
//!
//! The web client rendered one of two headers depending on the session:
//! a guest header with a "Log in with Discord" link, or a member header
//! with the user's name and avatar.  [`HeaderView`] is that choice as data;
//! the CLI prints its [`HeaderView::render`] output.
//!
//! The session status comes from the backend through the [`SessionApi`]
//! seam, which the infrastructure layer implements over HTTP and tests
//! replace with an in-memory double.

use std::fmt::Write as _;

use async_trait::async_trait;
use euphoria_core::{
    BackendSettings, EndpointError, OAuthSettings, Settings, TriggerWords, UserStatus,
};
use thiserror::Error;
use tracing::warn;

// ── Session API seam ──────────────────────────────────────────────────────────

/// Failures talking to the backend session endpoints.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The configured base URL cannot produce an endpoint URL.
    #[error("bad backend URL: {0}")]
    Url(#[from] EndpointError),

    /// The request never got an HTTP response (DNS, refused, TLS, timeout).
    #[error("backend request failed: {0}")]
    Transport(String),

    /// The backend rejected the OAuth code (`400` from `POST /login`).
    #[error("invalid auth code")]
    BadCode,

    /// Any other non-success status.
    #[error("backend returned HTTP {0}")]
    Status(u16),

    /// The response body was not the expected JSON.
    #[error("unexpected response body: {0}")]
    Decode(String),

    /// `POST /login` succeeded but no session cookie was issued.
    #[error("backend did not issue a session cookie")]
    MissingCookie,
}

/// Access to the backend's session endpoints.
#[async_trait]
pub trait SessionApi: Send + Sync {
    /// `GET /me`: who is logged in, if anyone.
    async fn me(&self) -> Result<UserStatus, ApiError>;

    /// `POST /login?code=`: exchanges an OAuth code for a session and
    /// returns the session cookie (`name=value`).
    async fn login(&self, code: &str) -> Result<String, ApiError>;
}

// ── Header ────────────────────────────────────────────────────────────────────

/// The two mutually exclusive header variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderView {
    /// Nobody is logged in; offer the Discord login link.
    Guest { login_url: String },
    /// A user is logged in.
    Member {
        username: String,
        avatar_url: Option<String>,
    },
}

impl HeaderView {
    /// Picks the header variant for `status`.
    pub fn from_status(status: &UserStatus, oauth: &OAuthSettings) -> Self {
        match status {
            UserStatus::LoggedIn(user) => HeaderView::Member {
                username: user.username.clone(),
                avatar_url: user.avatar_url(),
            },
            UserStatus::LoggedOut => HeaderView::Guest {
                login_url: oauth.authorize_url(),
            },
        }
    }

    pub fn is_member(&self) -> bool {
        matches!(self, HeaderView::Member { .. })
    }

    /// Text rendering for the terminal.
    pub fn render(&self) -> String {
        match self {
            HeaderView::Guest { login_url } => {
                format!("Euphoria · not logged in\nLog in with Discord: {login_url}")
            }
            HeaderView::Member {
                username,
                avatar_url,
            } => {
                let mut out = format!("Euphoria · logged in as {username}");
                if let Some(url) = avatar_url {
                    let _ = write!(out, "\nAvatar: {url}");
                }
                out
            }
        }
    }
}

/// Asks the backend who is logged in and picks the header.
///
/// An unreachable or misbehaving backend is shown as a guest header, exactly
/// as if no session existed; the error is logged.
pub async fn resolve_header<A>(api: &A, oauth: &OAuthSettings) -> HeaderView
where
    A: SessionApi + ?Sized,
{
    let status = match api.me().await {
        Ok(status) => status,
        Err(e) => {
            warn!("could not fetch session status: {e}");
            UserStatus::LoggedOut
        }
    };
    HeaderView::from_status(&status, oauth)
}

/// Exchanges an OAuth `code` for a backend session and stores the cookie in
/// `backend`.
///
/// On failure the previously stored cookie, if any, is left in place.
///
/// # Errors
///
/// Whatever [`SessionApi::login`] returns; [`ApiError::BadCode`] when the
/// backend rejects the code.
pub async fn log_in<A>(api: &A, code: &str, backend: &mut BackendSettings) -> Result<(), ApiError>
where
    A: SessionApi + ?Sized,
{
    let cookie = api.login(code).await?;
    backend.session_cookie = Some(cookie);
    Ok(())
}

// ── Settings ──────────────────────────────────────────────────────────────────

/// Renders the Connection and Trigger words sections of the settings view.
pub fn render_settings(settings: &Settings) -> String {
    let mut out = String::from("Settings\n\nConnection\n");
    let _ = writeln!(out, "  Host: {}", settings.connection.host);
    let _ = writeln!(out, "  Port: {}", settings.connection.port);

    let _ = writeln!(
        out,
        "\nTrigger words ({})",
        settings.trigger_words.mode_name()
    );
    match &settings.trigger_words {
        TriggerWords::List { words } if words.is_empty() => out.push_str("  (none)\n"),
        TriggerWords::List { words } => {
            for word in words {
                let _ = writeln!(out, "  - {word}");
            }
        }
        TriggerWords::Regex { pattern } => {
            let _ = writeln!(out, "  /{pattern}/");
        }
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
