//! Session context.

use api_protocol::AuthResponse;
use entities::UserSummary;

/// Who the client is talking to and as whom.
///
/// A session is a plain value owned by the caller; nothing is stored
/// globally, so several sessions (for example two accounts) can coexist.
#[derive(Debug, Clone, Default)]
pub struct Session {
    base_url: String,
    token: Option<String>,
    user: Option<UserSummary>,
}

impl Session {
    /// Creates a signed-out session for a server.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            user: None,
        }
    }

    /// Restores a session from a previously issued token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Records a successful register or login.
    pub fn sign_in(&mut self, auth: AuthResponse) {
        self.token = Some(auth.token);
        self.user = Some(auth.user);
    }

    /// Forgets the token and user.
    pub fn sign_out(&mut self) {
        self.token = None;
        self.user = None;
    }

    /// Returns true if a token is held.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// The bearer token, if signed in.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// The signed-in user, if known.
    pub fn user(&self) -> Option<&UserSummary> {
        self.user.as_ref()
    }

    /// Server base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_url_join() {
        let session = Session::new("http://localhost:5000/");
        assert_eq!(session.base_url(), "http://localhost:5000");
        assert_eq!(session.url("/api/projects"), "http://localhost:5000/api/projects");
    }

    #[test]
    fn test_sign_in_and_out() {
        let mut session = Session::new("http://localhost:5000");
        assert!(!session.is_authenticated());

        session.sign_in(AuthResponse {
            token: "abc".to_string(),
            user: UserSummary {
                id: Uuid::new_v4(),
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                avatar: None,
            },
        });
        assert_eq!(session.token(), Some("abc"));
        assert_eq!(session.user().map(|u| u.name.as_str()), Some("Ada"));

        session.sign_out();
        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
    }
}
