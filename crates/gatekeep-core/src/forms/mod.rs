//! Form models for the auth pages.

pub mod register;

pub use register::{Alert, Field, FieldError, FormOutcome, RegisterForm, ValidationError};
