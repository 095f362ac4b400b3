//! Remote endpoints: the Euphoria backend and Discord's authorization page.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::{form_urlencoded, Url};

/// Discord's OAuth2 authorization page.
pub const DISCORD_AUTHORIZE_URL: &str = "https://discord.com/api/oauth2/authorize";

/// Errors building a backend URL.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EndpointError {
    #[error("invalid backend base URL '{0}'")]
    InvalidBaseUrl(String),

    #[error("backend base URL must use http or https, got '{0}'")]
    UnsupportedScheme(String),
}

/// Where the Euphoria backend lives, plus the session cookie it issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Base of the REST API, e.g. `http://localhost:4000/api/`.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// `name=value` cookie obtained from `POST /login`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_cookie: Option<String>,
}

fn default_api_base_url() -> String {
    "http://localhost:4000/api/".to_string()
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            session_cookie: None,
        }
    }
}

impl BackendSettings {
    /// Resolves `path` relative to the API base.
    ///
    /// The base is always treated as a directory, so `http://h/api` and
    /// `http://h/api/` both resolve `me` to `http://h/api/me`.
    pub fn endpoint(&self, path: &str) -> Result<Url, EndpointError> {
        let mut base = Url::parse(&self.api_base_url)
            .map_err(|_| EndpointError::InvalidBaseUrl(self.api_base_url.clone()))?;
        match base.scheme() {
            "http" | "https" => {}
            other => return Err(EndpointError::UnsupportedScheme(other.to_string())),
        }
        if !base.path().ends_with('/') {
            let dir = format!("{}/", base.path());
            base.set_path(&dir);
        }
        base.join(path.trim_start_matches('/'))
            .map_err(|_| EndpointError::InvalidBaseUrl(self.api_base_url.clone()))
    }

    /// WebSocket URL of the backend relay (`/connect` under the API base).
    pub fn relay_url(&self) -> Result<Url, EndpointError> {
        let mut url = self.endpoint("connect")?;
        let ws_scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(ws_scheme)
            .map_err(|()| EndpointError::UnsupportedScheme(ws_scheme.to_string()))?;
        Ok(url)
    }
}

/// Parameters of the "Log in with Discord" link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthSettings {
    #[serde(default = "default_client_id")]
    pub client_id: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    #[serde(default = "default_scope")]
    pub scope: String,
}

fn default_client_id() -> String {
    "947195490322235482".to_string()
}
fn default_redirect_uri() -> String {
    "https://localhost:2069/".to_string()
}
fn default_scope() -> String {
    "identify".to_string()
}

impl Default for OAuthSettings {
    fn default() -> Self {
        Self {
            client_id: default_client_id(),
            redirect_uri: default_redirect_uri(),
            scope: default_scope(),
        }
    }
}

impl OAuthSettings {
    /// Builds the Discord authorization URL the user opens to log in.
    pub fn authorize_url(&self) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.scope)
            .finish();
        format!("{DISCORD_AUTHORIZE_URL}?{query}")
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_authorize_url_matches_login_link() {
        let url = OAuthSettings::default().authorize_url();
        assert_eq!(
            url,
            "https://discord.com/api/oauth2/authorize?client_id=947195490322235482\
             &redirect_uri=https%3A%2F%2Flocalhost%3A2069%2F&response_type=code&scope=identify"
        );
    }

    #[test]
    fn test_authorize_url_encodes_multi_scope() {
        let oauth = OAuthSettings {
            scope: "identify email".to_string(),
            ..OAuthSettings::default()
        };
        assert!(oauth.authorize_url().ends_with("scope=identify+email"));
    }

    #[test]
    fn test_endpoint_joins_onto_base_with_slash() {
        let backend = BackendSettings::default();
        assert_eq!(
            backend.endpoint("me").unwrap().as_str(),
            "http://localhost:4000/api/me"
        );
    }

    #[test]
    fn test_endpoint_treats_base_without_slash_as_directory() {
        let backend = BackendSettings {
            api_base_url: "http://example.com/api".to_string(),
            session_cookie: None,
        };
        assert_eq!(
            backend.endpoint("/login").unwrap().as_str(),
            "http://example.com/api/login"
        );
    }

    #[test]
    fn test_relay_url_switches_http_to_ws() {
        let backend = BackendSettings::default();
        assert_eq!(
            backend.relay_url().unwrap().as_str(),
            "ws://localhost:4000/api/connect"
        );
    }

    #[test]
    fn test_relay_url_switches_https_to_wss() {
        let backend = BackendSettings {
            api_base_url: "https://euphoria.example/api/".to_string(),
            session_cookie: None,
        };
        assert_eq!(
            backend.relay_url().unwrap().as_str(),
            "wss://euphoria.example/api/connect"
        );
    }

    #[test]
    fn test_invalid_base_url_is_error() {
        let backend = BackendSettings {
            api_base_url: "not a url".to_string(),
            session_cookie: None,
        };
        assert!(matches!(
            backend.endpoint("me"),
            Err(EndpointError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_non_http_base_url_is_error() {
        let backend = BackendSettings {
            api_base_url: "ftp://host/api/".to_string(),
            session_cookie: None,
        };
        assert_eq!(
            backend.endpoint("me"),
            Err(EndpointError::UnsupportedScheme("ftp".to_string()))
        );
    }
}
