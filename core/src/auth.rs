//! Mock single sign-on flow
//!
//! Simulates an OIDC-style login so a frontend can obtain a session. It is
//! never consulted by the extraction pipeline.

use crate::config::AuthSettings;
use crate::error::AuthError;
use log::{debug, info};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use uuid::Uuid;

/// Authorization code the mock provider accepts
pub const MOCK_AUTH_CODE: &str = "mock_auth_code";

/// Profile returned by an identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserInfo {
    pub sub: String,
    pub email: String,
    pub name: String,
}

/// A logged-in session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub session_id: String,
    pub user: UserInfo,
}

/// Identity provider interaction
pub trait IdentityProvider: Send + Sync {
    /// URL the browser is sent to in order to log in
    fn login_url(&self, state: &str) -> String;

    /// Exchanges an authorization code for the user's profile
    fn exchange_code(&self, code: &str) -> Result<UserInfo, AuthError>;
}

/// Provider that logs everyone in as the same demo user
#[derive(Debug, Clone)]
pub struct MockIdentityProvider {
    base_url: String,
}

impl MockIdentityProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl IdentityProvider for MockIdentityProvider {
    fn login_url(&self, state: &str) -> String {
        format!(
            "{}/mock-idp/authorize?state={}",
            self.base_url.trim_end_matches('/'),
            state
        )
    }

    fn exchange_code(&self, code: &str) -> Result<UserInfo, AuthError> {
        if code != MOCK_AUTH_CODE {
            return Err(AuthError::InvalidCode);
        }
        Ok(UserInfo {
            sub: "mock_user_123".to_string(),
            email: "doctor@aidoc.com".to_string(),
            name: "Dr. Ai Doc".to_string(),
        })
    }
}

/// In-memory session map
///
/// Sessions live until logout or process exit; there is no expiry.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, UserInfo>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session_id: String, user: UserInfo) {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session_id, user);
    }

    pub fn get(&self, session_id: &str) -> Option<UserInfo> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session_id)
            .cloned()
    }

    /// Removes a session, returning whether it existed
    pub fn remove(&self, session_id: &str) -> bool {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(session_id)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Login, callback and logout on top of an identity provider
pub struct AuthService {
    provider: Box<dyn IdentityProvider>,
    sessions: SessionStore,
}

impl AuthService {
    pub fn new(provider: Box<dyn IdentityProvider>) -> Self {
        Self {
            provider,
            sessions: SessionStore::new(),
        }
    }

    /// Service backed by the mock provider
    pub fn mock(settings: &AuthSettings) -> Self {
        Self::new(Box::new(MockIdentityProvider::new(
            settings.public_base_url.clone(),
        )))
    }

    /// Login URL carrying a fresh random state
    pub fn login_url(&self) -> String {
        self.provider.login_url(&random_token())
    }

    /// Completes a login, creating a session
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCode`] if the provider rejects the code.
    pub fn handle_callback(&self, code: &str) -> Result<Session, AuthError> {
        let user = self.provider.exchange_code(code)?;
        let session_id = random_token();
        self.sessions.insert(session_id.clone(), user.clone());
        info!("Created session for {}", user.sub);
        Ok(Session { session_id, user })
    }

    pub fn user_for_session(&self, session_id: &str) -> Option<UserInfo> {
        self.sessions.get(session_id)
    }

    /// Ends a session; unknown ids are ignored
    pub fn logout(&self, session_id: &str) {
        if self.sessions.remove(session_id) {
            debug!("Session ended");
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("sessions", &self.sessions.len())
            .finish_non_exhaustive()
    }
}

/// 32 lowercase hex characters from a random UUID
fn random_token() -> String {
    Uuid::new_v4().simple().to_string()
}
