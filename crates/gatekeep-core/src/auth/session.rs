use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::api::AuthApi;
use crate::models::{AuthResponse, AuthStatus, User};

use super::token_store::{TokenStore, TOKEN_KEY};
use super::AuthError;

/// Current authentication state. The user only exists in the
/// `Authenticated` variant.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Checking,
    Authenticated { user: User, since: DateTime<Utc> },
    NotAuthenticated,
}

impl SessionState {
    pub fn status(&self) -> AuthStatus {
        match self {
            SessionState::Checking => AuthStatus::Checking,
            SessionState::Authenticated { .. } => AuthStatus::Authenticated,
            SessionState::NotAuthenticated => AuthStatus::NotAuthenticated,
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated { user, .. } => Some(user),
            _ => None,
        }
    }

    pub fn is_checking(&self) -> bool {
        matches!(self, SessionState::Checking)
    }
}

/// Owns the session state and mediates every credential exchange with the
/// Auth API. Shared as `Arc<SessionManager>`; every operation takes `&self`.
pub struct SessionManager {
    api: Arc<dyn AuthApi>,
    store: Arc<dyn TokenStore>,
    state: watch::Sender<SessionState>,
    purge_invalid_token: bool,
}

impl SessionManager {
    /// Create a manager in the `Checking` state. Nothing is fetched until
    /// [`start`](Self::start) or [`check_status`](Self::check_status) runs.
    pub fn new(api: Arc<dyn AuthApi>, store: Arc<dyn TokenStore>) -> Self {
        let (state, _) = watch::channel(SessionState::Checking);
        Self {
            api,
            store,
            state,
            purge_invalid_token: false,
        }
    }

    /// Also delete a stored token when the backend rejects it during
    /// `check_status`. Off by default: a rejected token stays in the store.
    pub fn purge_invalid_token(mut self, purge: bool) -> Self {
        self.purge_invalid_token = purge;
        self
    }

    /// Kick off the initial status check in the background
    pub fn start(self: Arc<Self>) -> JoinHandle<bool> {
        tokio::spawn(async move { self.check_status().await })
    }

    // =========================================================================
    // Observation
    // =========================================================================

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn status(&self) -> AuthStatus {
        self.state.borrow().status()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().user().cloned()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Resolve once the session has left `Checking`
    pub async fn wait_until_checked(&self) -> AuthStatus {
        let mut rx = self.state.subscribe();
        let status = match rx.wait_for(|s| !s.is_checking()).await {
            Ok(state) => state.status(),
            Err(_) => self.status(),
        };
        status
    }

    // =========================================================================
    // Operations
    // =========================================================================

    fn set_authentication(&self, user: User, token: String) -> bool {
        if let Err(e) = self.store.set(TOKEN_KEY, &token) {
            warn!(error = %e, "Failed to persist token");
        }
        info!(email = %user.email, "Session authenticated");
        self.state.send_replace(SessionState::Authenticated {
            user,
            since: Utc::now(),
        });
        true
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<bool, AuthError> {
        debug!(email, "Logging in");
        match self.api.login(email, password).await {
            Ok(AuthResponse { user, token }) => Ok(self.set_authentication(user, token)),
            Err(e) => {
                warn!(email, error = %e, "Login failed");
                Err(e.into())
            }
        }
    }

    /// Register, then log straight in with the returned email.
    ///
    /// Only a failed registration is an error; if the follow-up login fails
    /// the account exists but the result is `Ok(false)`.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<bool, AuthError> {
        debug!(email, "Registering");
        let response = match self.api.register(name, email, password).await {
            Ok(response) => response,
            Err(e) => {
                error!(email, error = %e, "Registration error");
                return Err(e.into());
            }
        };

        match self.login(&response.user.email, password).await {
            Ok(success) => Ok(success),
            Err(e) => {
                error!(email = %response.user.email, error = %e, "Error during login after registration");
                Ok(false)
            }
        }
    }

    /// Validate the persisted token against the backend.
    ///
    /// Never fails: every problem ends in `NotAuthenticated` and `false`.
    pub async fn check_status(&self) -> bool {
        let token = match self.store.get(TOKEN_KEY) {
            Ok(Some(token)) if !token.is_empty() => token,
            Ok(_) => {
                debug!("No stored token");
                self.logout();
                return false;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read stored token");
                self.logout();
                return false;
            }
        };

        match self.api.check_token(&token).await {
            Ok(AuthResponse { user, token }) => self.set_authentication(user, token),
            Err(e) => {
                if self.purge_invalid_token {
                    info!(error = %e, "Token rejected, purging it");
                    self.remove_token();
                } else {
                    warn!(error = %e, "Token rejected, leaving it in the store");
                }
                self.state.send_replace(SessionState::NotAuthenticated);
                false
            }
        }
    }

    pub fn logout(&self) {
        self.state.send_replace(SessionState::NotAuthenticated);
        self.remove_token();
        info!("Logged out");
    }

    fn remove_token(&self) {
        if let Err(e) = self.store.remove(TOKEN_KEY) {
            warn!(error = %e, "Failed to remove stored token");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
