use thiserror::Error;

use crate::api::ApiError;

/// Errors surfaced to callers of `SessionManager::login`/`register`.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Request refused; the payload is the backend's own message
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Api(ApiError),
}

impl From<ApiError> for AuthError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Rejected { message, .. } => AuthError::Rejected(message),
            other => AuthError::Api(other),
        }
    }
}

impl AuthError {
    /// Free-text message for the alert shown to the user
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Failures of the durable token store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Token store IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Token store is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_message_is_bare() {
        let err: AuthError = ApiError::Rejected {
            status: 400,
            message: "User already exists".to_string(),
        }
        .into();
        assert!(matches!(err, AuthError::Rejected(_)));
        assert_eq!(err.message(), "User already exists");
    }

    #[test]
    fn test_server_message_reaches_alert_unprefixed() {
        let err: AuthError = ApiError::from_status(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"message":"Please check server logs"}"#,
        )
        .into();
        assert_eq!(err.message(), "Please check server logs");
    }

    #[test]
    fn test_other_api_errors_pass_through() {
        let err: AuthError = ApiError::Unauthorized.into();
        assert!(matches!(err, AuthError::Api(ApiError::Unauthorized)));
        assert_eq!(err.message(), "Unauthorized - token may be expired");
    }
}
