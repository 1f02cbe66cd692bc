use thiserror::Error;

/// Errors produced by credential operations.
///
/// A failed password or reset-token comparison is never an error; those
/// paths return `Ok(false)` / `false` so callers cannot conflate a wrong
/// secret with a broken system.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("token signing or verification failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("signing secret is missing or empty")]
    MissingSecret,

    #[error("invalid configuration: {0}")]
    Config(String),
}
