//! Error types for the Ezzifly client.

use reqwest::StatusCode;

/// Top-level error type for the client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Failures raised by the gateway shim.
///
/// Each variant maps onto one [`FailureClass`], which is what the demo
/// fallback policy keys on.
///
/// [`FailureClass`]: crate::api::FailureClass
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error("API URL not configured. Please check your environment variables.")]
    NotConfigured,

    #[error("Unable to connect to the server. Please check your internet connection and try again.")]
    Connectivity { reason: String },

    #[error("{message}")]
    Application { status: StatusCode, message: String },

    #[error("Unexpected response body from {path}: {reason}")]
    Decode { path: String, reason: String },
}

impl ApiError {
    /// HTTP status of an application failure, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Application { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Client-side form validation failures. Raised before any network call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter your {field}.")]
    Required { field: &'static str },

    #[error("Please fill in all fields.")]
    MissingFields { fields: Vec<&'static str> },

    #[error("{value:?} is not a valid email address.")]
    InvalidEmail { value: String },

    #[error("Passwords do not match.")]
    PasswordMismatch,

    #[error("Return date cannot be before the departure date.")]
    ReturnBeforeDeparture,

    #[error("Travelers must be between {min} and {max}, got {value}.")]
    TravelerCount { value: u8, min: u8, max: u8 },

    #[error("Please fill all fields for flight leg {leg}.")]
    IncompleteLeg { leg: usize },

    #[error("A multi-city search needs at least one flight leg.")]
    LastLeg,

    #[error("Unknown {field}: {value:?}")]
    UnknownOption { field: &'static str, value: String },
}

/// Persistence backend errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error for key {key}: {reason}")]
    Serialization { key: String, reason: String },

    #[error("Storage file {path} is corrupt: {reason}")]
    Corrupt { path: String, reason: String },
}

/// Session store errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Login response did not include both a user and a token")]
    IncompleteLogin,

    #[error("Registration was not accepted: {0}")]
    RegistrationRejected(String),

    #[error("Not signed in")]
    NotAuthenticated,
}

/// Auth wizard errors that are not inline validation problems.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("The sign-in window is closed")]
    Closed,

    #[error("A request is already in progress")]
    SubmissionPending,

    #[error("Step {step} has no {field} field")]
    NoSuchField { step: String, field: &'static str },

    #[error("Cannot transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}

/// Result type alias for the client.
pub type Result<T> = std::result::Result<T, Error>;
