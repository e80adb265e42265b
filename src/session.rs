//! Authenticated session passed explicitly to the UI and every backend call.

use serde::Deserialize;

/// Logged-in user as reported by the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub user_id: i64,
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// Bearer token plus the user it belongs to.
///
/// Lives in memory only; a restart requires a new login.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: SessionUser,
}

impl Session {
    pub fn new(token: impl Into<String>, user: SessionUser) -> Self {
        Self {
            token: token.into(),
            user,
        }
    }

    /// User id every scoped call is made on behalf of.
    pub fn user_id(&self) -> i64 {
        self.user.user_id
    }
}

// Keep the token out of logs.
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}
