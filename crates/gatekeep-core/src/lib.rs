//! gatekeep-core - client-side authentication session management.
//!
//! This crate provides:
//! - `api`: the Auth API seam and its reqwest implementation
//! - `auth`: the session manager and durable token stores
//! - `guard`: the route guard for protected pages
//! - `forms`: the registration form model
//! - `config`: application configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod forms;
pub mod guard;
pub mod models;

pub use api::{ApiError, AuthApi, HttpAuthApi};
pub use auth::{AuthError, SessionManager, SessionState, TokenStore};
pub use config::{Config, TokenBackend};
pub use guard::{is_authenticated_guard, routes, GuardDecision, Navigator};
pub use models::{AuthStatus, User};
