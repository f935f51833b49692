//! Authentication status and backend selection.
//!
//! The board never merges data across backends; which medium is active is
//! a pure function of the current authentication status, and every status
//! transition triggers a full reload through the newly selected backend.

use secrecy::SecretString;

/// Environment variable consulted first when resolving the API token.
pub const TOKEN_ENV: &str = "HEBDO_API_TOKEN";

/// The current authentication state of the session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthStatus {
    /// The auth provider has not answered yet.
    #[default]
    Loading,
    /// No signed-in user; data stays on this machine.
    Guest,
    /// A signed-in user; data syncs to the remote task API.
    Authenticated {
        /// The signed-in account name.
        user: String,
    },
    /// The auth provider failed; treated like a guest session.
    Error(String),
}

impl AuthStatus {
    /// Returns `true` for a signed-in user.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }
}

/// The kind of storage backend a session uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// The local envelope file.
    Local,
    /// The remote task API.
    Remote,
}

/// Picks the backend for an authentication status.
///
/// Only a signed-in user syncs remotely; guests, sessions still loading,
/// and failed auth lookups all stay local.
///
/// # Examples
///
/// ```
/// use hebdo_sync::{AuthStatus, BackendKind, select_backend};
///
/// let user = AuthStatus::Authenticated { user: "sam".to_string() };
/// assert_eq!(select_backend(&user), BackendKind::Remote);
/// assert_eq!(select_backend(&AuthStatus::Guest), BackendKind::Local);
/// assert_eq!(select_backend(&AuthStatus::Loading), BackendKind::Local);
/// ```
#[must_use]
pub fn select_backend(status: &AuthStatus) -> BackendKind {
    if status.is_authenticated() {
        BackendKind::Remote
    } else {
        BackendKind::Local
    }
}

/// Resolves the task-API token.
///
/// Sources in order: the `HEBDO_API_TOKEN` environment variable, then the
/// configured token. Blank values are skipped. Returns `None` when no
/// source has a token, which leaves the session in guest mode.
#[must_use]
pub fn resolve_token(config_token: Option<&str>) -> Option<SecretString> {
    if let Ok(token) = std::env::var(TOKEN_ENV)
        && !token.trim().is_empty()
    {
        return Some(SecretString::from(token));
    }
    config_token
        .filter(|token| !token.trim().is_empty())
        .map(|token| SecretString::from(token.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_authenticated_selects_remote() {
        assert_eq!(select_backend(&AuthStatus::Loading), BackendKind::Local);
        assert_eq!(select_backend(&AuthStatus::Guest), BackendKind::Local);
        assert_eq!(
            select_backend(&AuthStatus::Error("provider down".to_string())),
            BackendKind::Local
        );
        assert_eq!(
            select_backend(&AuthStatus::Authenticated {
                user: "sam".to_string()
            }),
            BackendKind::Remote
        );
    }

    #[test]
    fn config_token_is_used_when_present() {
        // The env var path is not exercised here: test processes share
        // their environment.
        let token = resolve_token(Some("config-token"));
        assert!(token.is_some());
    }

    #[test]
    fn blank_config_token_counts_as_absent() {
        assert!(resolve_token(Some("   ")).is_none());
        assert!(resolve_token(None).is_none());
    }
}
