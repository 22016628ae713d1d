//! HTTP client module for the authentication backend.
//!
//! This module provides the `AuthApi` trait (the seam the session manager
//! talks to) and `HttpAuthApi`, its reqwest implementation.
//!
//! Endpoints live under `{base_url}/auth`: `login`, `register` and
//! `check-token`, the last one authenticated with a bearer token.

pub mod client;
pub mod error;

pub use client::{AuthApi, HttpAuthApi};
pub use error::ApiError;
