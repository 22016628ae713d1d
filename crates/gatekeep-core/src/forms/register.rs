//! Registration form: field validation and the submit flow.

use tracing::{debug, warn};
use validator::Validate;

use crate::auth::SessionManager;
use crate::guard::{routes, Navigator};

/// Minimum password length accepted by the form (kept in step with the
/// `length(min = 6)` rule on `RegisterForm::password`)
pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Password,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Name => write!(f, "Name"),
            Field::Email => write!(f, "Email"),
            Field::Password => write!(f, "Password"),
        }
    }
}

impl Field {
    /// Struct field name, as reported by the validator
    fn key(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Password => "password",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Required,
    InvalidEmail,
    MinLength { required: usize, actual: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub error: ValidationError,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.error {
            ValidationError::Required => write!(f, "{} is required", self.field),
            ValidationError::InvalidEmail => write!(f, "{} is not a valid email address", self.field),
            ValidationError::MinLength { required, actual } => write!(
                f,
                "{} must be at least {} characters ({} given)",
                self.field, required, actual
            ),
        }
    }
}

/// Blocking error notification shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    /// Validation failed; nothing was sent
    Invalid(Vec<FieldError>),
    /// Register call resolved and navigation to the dashboard was requested
    Submitted { logged_in: bool },
    /// Register call failed
    Alert(Alert),
}

#[derive(Debug, Clone, Default, Validate)]
pub struct RegisterForm {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

impl RegisterForm {
    pub fn new(name: impl Into<String>, email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    /// Field-level checks. An empty field reports `Required` alone; format
    /// and length failures are reported for non-empty fields.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let report = match Validate::validate(self) {
            Ok(()) => return Ok(()),
            Err(report) => report,
        };
        let failed = report.field_errors();

        let fields = [
            (Field::Name, &self.name),
            (Field::Email, &self.email),
            (Field::Password, &self.password),
        ];
        let errors: Vec<FieldError> = fields
            .into_iter()
            .filter(|(field, _)| failed.contains_key(field.key()))
            .map(|(field, value)| {
                let error = match field {
                    _ if value.is_empty() => ValidationError::Required,
                    Field::Name => ValidationError::Required,
                    Field::Email => ValidationError::InvalidEmail,
                    Field::Password => ValidationError::MinLength {
                        required: MIN_PASSWORD_LENGTH,
                        actual: value.chars().count(),
                    },
                };
                FieldError { field, error }
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate, register, and navigate to the dashboard on success.
    /// Registration errors come back as an alert instead.
    pub async fn submit(&self, session: &SessionManager, navigator: &dyn Navigator) -> FormOutcome {
        if let Err(errors) = self.validate() {
            debug!(count = errors.len(), "Registration form invalid");
            return FormOutcome::Invalid(errors);
        }

        match session.register(&self.name, &self.email, &self.password).await {
            Ok(logged_in) => {
                navigator.navigate_by_url(routes::DASHBOARD);
                FormOutcome::Submitted { logged_in }
            }
            Err(e) => {
                warn!(error = %e, "Registration rejected");
                FormOutcome::Alert(Alert {
                    title: "Error".to_string(),
                    message: e.message(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use crate::api::{ApiError, AuthApi};
    use crate::auth::MemoryTokenStore;
    use crate::models::{AuthResponse, AuthStatus, User};

    fn email_ok(email: &str) -> bool {
        RegisterForm::new("Ann", email, "secret").validate().is_ok()
    }

    #[test]
    fn test_valid_emails() {
        assert!(email_ok("a@b.com"));
        assert!(email_ok("first.last+tag@sub.example.co"));
        assert!(email_ok("o'neil@my-host.io"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!email_ok("plainaddress"));
        assert!(!email_ok("@b.com"));
        assert!(!email_ok("a@"));
        assert!(!email_ok("a@b@c.com"));
        assert!(!email_ok("a b@c.com"));
        assert!(!email_ok("a@-b.com"));
    }

    #[test]
    fn test_empty_form_reports_required_only() {
        let errors = RegisterForm::default().validate().unwrap_err();
        assert_eq!(
            errors,
            vec![
                FieldError { field: Field::Name, error: ValidationError::Required },
                FieldError { field: Field::Email, error: ValidationError::Required },
                FieldError { field: Field::Password, error: ValidationError::Required },
            ]
        );
    }

    #[test]
    fn test_short_password_and_bad_email() {
        let errors = RegisterForm::new("Ann", "not-an-email", "abc").validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].error, ValidationError::InvalidEmail);
        assert_eq!(
            errors[1].error,
            ValidationError::MinLength { required: 6, actual: 3 }
        );
        assert_eq!(errors[1].to_string(), "Password must be at least 6 characters (3 given)");
    }

    #[test]
    fn test_min_password_length_matches_rule() {
        let short = "x".repeat(MIN_PASSWORD_LENGTH - 1);
        let exact = "x".repeat(MIN_PASSWORD_LENGTH);
        assert!(RegisterForm::new("Ann", "a@b.com", short).validate().is_err());
        assert!(RegisterForm::new("Ann", "a@b.com", exact).validate().is_ok());
    }

    #[test]
    fn test_password_length_counts_characters() {
        assert!(RegisterForm::new("Ann", "a@b.com", "ñññññ").validate().is_err());
        assert!(RegisterForm::new("Ann", "a@b.com", "ññññññ").validate().is_ok());
    }

    // -------------------------------------------------------------------------
    // Submit flow
    // -------------------------------------------------------------------------

    struct ScriptedApi {
        register_error: Option<&'static str>,
        login_error: Option<&'static str>,
        calls: Mutex<usize>,
    }

    impl ScriptedApi {
        fn new(register_error: Option<&'static str>, login_error: Option<&'static str>) -> Self {
            Self { register_error, login_error, calls: Mutex::new(0) }
        }

        fn reply(error: Option<&'static str>, email: &str) -> Result<AuthResponse, ApiError> {
            match error {
                Some(message) => Err(ApiError::Rejected { status: 400, message: message.to_string() }),
                None => Ok(AuthResponse {
                    user: User {
                        id: "1".to_string(),
                        name: "Ann".to_string(),
                        email: email.to_string(),
                        extra: Default::default(),
                    },
                    token: "T1".to_string(),
                }),
            }
        }
    }

    #[async_trait]
    impl AuthApi for ScriptedApi {
        async fn login(&self, email: &str, _password: &str) -> Result<AuthResponse, ApiError> {
            *self.calls.lock().unwrap() += 1;
            Self::reply(self.login_error, email)
        }
        async fn register(&self, _name: &str, email: &str, _password: &str) -> Result<AuthResponse, ApiError> {
            *self.calls.lock().unwrap() += 1;
            Self::reply(self.register_error, email)
        }
        async fn check_token(&self, _token: &str) -> Result<AuthResponse, ApiError> {
            Err(ApiError::Unauthorized)
        }
    }

    #[derive(Default)]
    struct RecordingNavigator {
        visited: Mutex<Vec<String>>,
    }

    impl Navigator for RecordingNavigator {
        fn navigate_by_url(&self, url: &str) {
            self.visited.lock().unwrap().push(url.to_string());
        }
    }

    fn setup(api: ScriptedApi) -> (SessionManager, Arc<ScriptedApi>, RecordingNavigator) {
        let api = Arc::new(api);
        let session = SessionManager::new(api.clone(), Arc::new(MemoryTokenStore::new()));
        (session, api, RecordingNavigator::default())
    }

    #[tokio::test]
    async fn test_submit_success_navigates_to_dashboard() {
        let (session, _, navigator) = setup(ScriptedApi::new(None, None));
        let outcome = RegisterForm::new("Ann", "a@b.com", "secret")
            .submit(&session, &navigator)
            .await;

        assert_eq!(outcome, FormOutcome::Submitted { logged_in: true });
        assert_eq!(*navigator.visited.lock().unwrap(), vec![routes::DASHBOARD.to_string()]);
        assert_eq!(session.status(), AuthStatus::Authenticated);
    }

    #[tokio::test]
    async fn test_submit_when_follow_up_login_fails_still_navigates() {
        let (session, _, navigator) = setup(ScriptedApi::new(None, Some("Login unavailable")));
        let outcome = RegisterForm::new("Ann", "a@b.com", "secret")
            .submit(&session, &navigator)
            .await;

        assert_eq!(outcome, FormOutcome::Submitted { logged_in: false });
        assert_eq!(navigator.visited.lock().unwrap().len(), 1);
        assert_ne!(session.status(), AuthStatus::Authenticated);
    }

    #[tokio::test]
    async fn test_submit_failure_shows_alert() {
        let (session, _, navigator) = setup(ScriptedApi::new(Some("User a@b.com already exists"), None));
        let outcome = RegisterForm::new("Ann", "a@b.com", "secret")
            .submit(&session, &navigator)
            .await;

        assert_eq!(
            outcome,
            FormOutcome::Alert(Alert {
                title: "Error".to_string(),
                message: "User a@b.com already exists".to_string(),
            })
        );
        assert!(navigator.visited.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_form_is_not_sent() {
        let (session, api, navigator) = setup(ScriptedApi::new(None, None));
        let outcome = RegisterForm::new("", "a@b.com", "secret")
            .submit(&session, &navigator)
            .await;

        assert!(matches!(outcome, FormOutcome::Invalid(ref errors) if errors.len() == 1));
        assert_eq!(*api.calls.lock().unwrap(), 0);
        assert!(navigator.visited.lock().unwrap().is_empty());
    }
}
