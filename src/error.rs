//! Error types for Mindful Meals.

use crate::onboarding::state::OnboardingStep;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors from talking to the backend over HTTP.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response. `message` is the server's `{error}` body when present.
    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

/// Errors raised by the onboarding wizard. All are recoverable.
#[derive(Debug, thiserror::Error)]
pub enum OnboardingError {
    #[error("{message}")]
    ValidationFailed { step: OnboardingStep, message: String },

    #[error("Step {step} is required and cannot be skipped")]
    SkipRequired { step: OnboardingStep },

    #[error("Already at the last step")]
    AtLastStep,

    #[error("A profile submission is already in flight")]
    SubmissionInFlight,

    #[error("Onboarding is already complete")]
    Completed,

    #[error("No signed-in user")]
    NotSignedIn,

    #[error("Unknown dietary goal: {0}")]
    UnknownGoal(String),

    #[error("Restriction {0} is not selected")]
    RestrictionNotSelected(String),

    #[error("{0}")]
    Submission(#[from] ApiError),
}

/// Which credential field a validation failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialField {
    General,
    Email,
    Password,
    ConfirmPassword,
}

/// Authentication errors: form validation and identity provider failures.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{message}")]
    InvalidInput {
        field: CredentialField,
        message: String,
    },

    #[error("Authentication failed: {code}: {message}")]
    Provider { code: String, message: String },
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
