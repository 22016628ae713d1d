use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The backend refused the request and explained why in its error body
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Unauthorized - token may be expired")]
    Unauthorized,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Shown when a login is refused without an explanation
const CREDENTIALS_REFUSED_MESSAGE: &str = "Invalid email or password";

/// Error body shape: `{"message": "..."}` or, for validation failures,
/// `{"message": ["...", "..."]}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<ErrorMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

impl ErrorMessage {
    fn into_text(self) -> String {
        match self {
            ErrorMessage::One(message) => message,
            ErrorMessage::Many(messages) => messages.join(", "),
        }
    }
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Pull the `message` field out of an error body, if there is one
    fn extract_message(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .map(ErrorMessage::into_text)
            .filter(|m| !m.trim().is_empty())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = Self::extract_message(body);
        match (status.as_u16(), message) {
            (code, Some(message)) => ApiError::Rejected { status: code, message },
            (500..=599, None) => ApiError::ServerError(Self::truncate_body(body)),
            (401, None) => ApiError::Unauthorized,
            (_, None) => ApiError::InvalidResponse(format!(
                "Status {}: {}",
                status,
                Self::truncate_body(body)
            )),
        }
    }

    /// Text suitable for showing to the user in an alert
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// A bare 401 on a credential exchange means the credentials were wrong,
    /// not that a token expired
    pub fn for_credentials(self) -> Self {
        match self {
            ApiError::Unauthorized => ApiError::Rejected {
                status: 401,
                message: CREDENTIALS_REFUSED_MESSAGE.to_string(),
            },
            other => other,
        }
    }
}
