use thiserror::Error;

pub const UNEXPECTED_SIGNUP: &str = "An unexpected error occurred during signup. Please try again.";
pub const UNEXPECTED_LOGIN: &str = "An unexpected error occurred during login. Please try again.";

/// Signup failures as the form displays them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignupError {
    /// Rejected by the identity provider, nothing was created.
    #[error("{0}")]
    Auth(String),
    /// The account exists but its profile row could not be written.
    #[error("Failed to create teacher profile: {0}. Please try again or contact support.")]
    ProfileCreation(String),
    /// Network or decoding failure; the detail is only logged.
    #[error("{}", UNEXPECTED_SIGNUP)]
    Unexpected(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoginError {
    #[error("{0}")]
    Auth(String),
    #[error("{}", UNEXPECTED_LOGIN)]
    Unexpected(String),
}
