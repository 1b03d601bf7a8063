use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Per-field validation messages, in the order the checks ran.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

#[derive(Debug, Error)]
pub enum OnboardingError {
    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("You must be logged in")]
    Unauthenticated,

    #[error("{0} not found")]
    PrerequisiteMissing(&'static str),

    #[error("{0}")]
    Store(String),

    #[error("Onboarding not complete")]
    OnboardingIncomplete,

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("unexpected: {0}")]
    Unexpected(String),
}

impl From<sqlx::Error> for OnboardingError {
    fn from(err: sqlx::Error) -> Self {
        OnboardingError::Store(err.to_string())
    }
}

impl From<bcrypt::BcryptError> for OnboardingError {
    fn from(err: bcrypt::BcryptError) -> Self {
        OnboardingError::Unexpected(err.to_string())
    }
}

impl OnboardingError {
    pub fn status(&self) -> StatusCode {
        match self {
            OnboardingError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            OnboardingError::Unauthenticated | OnboardingError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            OnboardingError::PrerequisiteMissing(_)
            | OnboardingError::OnboardingIncomplete
            | OnboardingError::Conflict(_) => StatusCode::CONFLICT,
            OnboardingError::Store(_) | OnboardingError::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Converts into the wire shape. `fallback` replaces the message of
    /// unexpected failures so internal details never reach the user.
    pub fn into_failure(self, fallback: &str) -> StepFailure {
        match self {
            OnboardingError::Validation(errors) => StepFailure {
                message: "Validation failed".to_string(),
                errors: Some(errors),
            },
            OnboardingError::Unexpected(detail) => {
                tracing::error!(error = %detail, "{}", fallback);
                StepFailure::message(fallback)
            }
            other => StepFailure::message(other.to_string()),
        }
    }

    pub fn into_response(self, fallback: &str) -> HttpResponse {
        let status = self.status();
        HttpResponse::build(status).json(self.into_failure(fallback))
    }
}

/// The `{ message, errors? }` body returned by every failed submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepFailure {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl StepFailure {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: None,
        }
    }

    pub fn field_errors(&self, field: &str) -> Option<&[String]> {
        self.errors.as_ref().and_then(|e| e.get(field))
    }
}

pub type OnboardingResult<T> = Result<T, OnboardingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prerequisite_message_names_the_record() {
        let err = OnboardingError::PrerequisiteMissing("Business profile");
        assert_eq!(err.to_string(), "Business profile not found");
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn unexpected_errors_hide_details() {
        let failure = OnboardingError::Unexpected("disk on fire".into())
            .into_failure("An error occurred while saving tax information");
        assert_eq!(failure.message, "An error occurred while saving tax information");
        assert!(failure.errors.is_none());
    }

    #[test]
    fn store_errors_pass_through_verbatim() {
        let failure = OnboardingError::Store("UNIQUE constraint failed: users.email".into())
            .into_failure("fallback");
        assert_eq!(failure.message, "UNIQUE constraint failed: users.email");
    }

    #[test]
    fn failure_without_field_errors_omits_key() {
        let body = serde_json::to_value(StepFailure::message("You must be logged in")).unwrap();
        assert_eq!(body, serde_json::json!({ "message": "You must be logged in" }));
    }

    #[test]
    fn field_errors_keep_insertion_order_per_field() {
        let mut errors = FieldErrors::new();
        errors.push("password", "Password must be at least 8 characters");
        errors.push("password", "Password must contain at least one number");
        assert_eq!(
            errors.get("password").unwrap(),
            &[
                "Password must be at least 8 characters".to_string(),
                "Password must contain at least one number".to_string(),
            ]
        );
    }
}
