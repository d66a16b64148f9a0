use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::{PublicUser, Role, User};
use crate::persistence::SessionRepository;

/// Session state mirrored to the session file on every change
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub is_authenticated: bool,
    pub user: Option<PublicUser>,
}

/// The fixed credential table. Mock-only: plaintext passwords, no lockout,
/// no hashing.
fn credential_table() -> Vec<User> {
    vec![
        User {
            id: 1,
            username: "admin".to_string(),
            role: Role::Admin,
            password: "admin123".to_string(),
        },
        User {
            id: 2,
            username: "user1".to_string(),
            role: Role::User,
            password: "user123".to_string(),
        },
        User {
            id: 3,
            username: "user2".to_string(),
            role: Role::User,
            password: "user123".to_string(),
        },
    ]
}

/// Holder of the authenticated identity, rehydrated from the session file
/// at startup
pub struct AuthStore {
    state: AuthState,
    repo: Box<dyn SessionRepository>,
}

impl AuthStore {
    /// Rehydrate from the repository; a stored value with the wrong shape
    /// was already discarded by the repository's load
    pub fn open(repo: Box<dyn SessionRepository>) -> Result<Self> {
        let state = repo.load()?;
        Ok(Self { state, repo })
    }

    pub fn current_user(&self) -> Option<&PublicUser> {
        if self.state.is_authenticated {
            self.state.user.as_ref()
        } else {
            None
        }
    }

    /// Exact username+password match against the credential table.
    /// Success stores and persists the public identity; failure changes
    /// nothing and returns `None`.
    pub fn login(&mut self, username: &str, password: &str) -> Result<Option<PublicUser>> {
        let matched = credential_table()
            .into_iter()
            .find(|u| u.username == username && u.password == password);

        match matched {
            Some(user) => {
                let public = user.public();
                self.state = AuthState {
                    is_authenticated: true,
                    user: Some(public.clone()),
                };
                self.repo.save(&self.state)?;
                Ok(Some(public))
            }
            None => Ok(None),
        }
    }

    /// Clear the session unconditionally
    pub fn logout(&mut self) -> Result<()> {
        self.state = AuthState::default();
        self.repo.save(&self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::JsonSessionRepository;
    use tempfile::tempdir;

    fn store_in(dir: &std::path::Path) -> AuthStore {
        let repo = Box::new(JsonSessionRepository::new(dir.join("session.json")));
        AuthStore::open(repo).unwrap()
    }

    #[test]
    fn test_login_success_sets_identity() {
        let dir = tempdir().unwrap();
        let mut auth = store_in(dir.path());

        let user = auth.login("admin", "admin123").unwrap().unwrap();
        assert_eq!(user.role, Role::Admin);
        assert_eq!(auth.current_user().unwrap().username, "admin");
    }

    #[test]
    fn test_login_failure_leaves_unauthenticated() {
        let dir = tempdir().unwrap();
        let mut auth = store_in(dir.path());

        assert!(auth.login("admin", "wrong").unwrap().is_none());
        assert!(auth.current_user().is_none());
    }

    #[test]
    fn test_session_survives_restart() {
        let dir = tempdir().unwrap();
        {
            let mut auth = store_in(dir.path());
            auth.login("user1", "user123").unwrap().unwrap();
        }
        let auth = store_in(dir.path());
        assert_eq!(auth.current_user().unwrap().id, 2);
    }

    #[test]
    fn test_logout_clears_and_persists() {
        let dir = tempdir().unwrap();
        let mut auth = store_in(dir.path());
        auth.login("user2", "user123").unwrap().unwrap();
        auth.logout().unwrap();
        assert!(auth.current_user().is_none());

        let auth = store_in(dir.path());
        assert!(auth.current_user().is_none());
    }
}
