//! Data models exchanged with the Auth API.
//!
//! - `User`: identity record returned by every successful auth call
//! - `AuthStatus`: the three-way session status flag
//! - `AuthResponse`: `{user, token}` envelope shared by login, register and check-token

pub mod user;

pub use user::{
    AuthResponse,
    AuthStatus,
    CheckTokenResponse,
    LoginRequest,
    LoginResponse,
    RegisterRequest,
    RegisterResponse,
    User,
};
