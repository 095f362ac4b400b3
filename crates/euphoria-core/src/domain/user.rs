//! The logged-in principal as reported by the backend session endpoint.
//!
//! The backend answers `GET /me` with one of two JSON shapes:
//!
//! ```json
//! {"status": "LoggedIn", "user": {"id": "1", "username": "kit", "avatar": "ab12"}}
//! {"status": "LoggedOut"}
//! ```
//!
//! `serde`'s *adjacently tagged* enum representation (`tag` + `content`)
//! maps exactly onto that shape.

use serde::{Deserialize, Serialize};

/// Base URL of Discord's avatar CDN.
const AVATAR_CDN: &str = "https://cdn.discordapp.com/avatars";

/// A Discord-backed Euphoria user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Discord snowflake id, kept as a string because it exceeds 53 bits.
    pub id: String,
    /// Display name.
    pub username: String,
    /// Avatar hash; `null` when the user has no custom avatar.
    #[serde(rename = "avatar", default)]
    pub avatar_hash: Option<String>,
}

impl User {
    /// Returns the CDN URL of the user's avatar image, if they have one.
    ///
    /// ```rust
    /// use euphoria_core::User;
    ///
    /// let user = User {
    ///     id: "42".to_string(),
    ///     username: "kit".to_string(),
    ///     avatar_hash: Some("abc".to_string()),
    /// };
    /// assert_eq!(
    ///     user.avatar_url().as_deref(),
    ///     Some("https://cdn.discordapp.com/avatars/42/abc.png")
    /// );
    /// ```
    pub fn avatar_url(&self) -> Option<String> {
        self.avatar_hash
            .as_deref()
            .filter(|hash| !hash.is_empty())
            .map(|hash| format!("{AVATAR_CDN}/{}/{hash}.png", self.id))
    }
}

/// Session status returned by `GET /me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "user")]
pub enum UserStatus {
    LoggedIn(User),
    LoggedOut,
}

impl UserStatus {
    /// Returns the user when logged in.
    pub fn user(&self) -> Option<&User> {
        match self {
            UserStatus::LoggedIn(user) => Some(user),
            UserStatus::LoggedOut => None,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
