//! Route guard for protected pages.
//!
//! The navigation layer asks the guard before entering a protected route.
//! While the initial token check is still in flight the guard blocks without
//! redirecting, so a user with a valid token is not bounced to the login page.

use tracing::debug;

use crate::auth::SessionManager;
use crate::models::AuthStatus;

/// Well-known routes
pub mod routes {
    pub const LOGIN: &str = "/auth/login";
    pub const REGISTER: &str = "/auth/register";
    pub const DASHBOARD: &str = "/dashboard";
}

/// Routing collaborator
pub trait Navigator: Send + Sync {
    fn navigate_by_url(&self, url: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Block, but stay put: the status is still being checked
    Wait,
    Redirect(&'static str),
}

pub fn decide(status: AuthStatus) -> GuardDecision {
    match status {
        AuthStatus::Authenticated => GuardDecision::Allow,
        AuthStatus::Checking => GuardDecision::Wait,
        AuthStatus::NotAuthenticated => GuardDecision::Redirect(routes::LOGIN),
    }
}

/// Guard for routes that need a logged-in user. Performs the redirect itself.
pub fn is_authenticated_guard(session: &SessionManager, navigator: &dyn Navigator) -> bool {
    match decide(session.status()) {
        GuardDecision::Allow => true,
        GuardDecision::Wait => {
            debug!("Session still checking, holding navigation");
            false
        }
        GuardDecision::Redirect(url) => {
            debug!(url, "Not authenticated, redirecting");
            navigator.navigate_by_url(url);
            false
        }
    }
}
