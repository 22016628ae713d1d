//! Authentication module for managing the session and the stored token.
//!
//! This module provides:
//! - `SessionManager`: login, register, status check and logout against the Auth API
//! - `TokenStore`: durable storage for the bearer token (file, keychain or memory)
//!
//! The session starts out `Checking` and settles on `Authenticated` or
//! `NotAuthenticated` once the stored token has been verified.

pub mod error;
pub mod session;
pub mod token_store;

pub use error::{AuthError, StoreError};
pub use session::{SessionManager, SessionState};
pub use token_store::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenStore, TOKEN_KEY};
