//! Seams to the two external systems a signup touches.
//!
//! Both are injected into the flows as trait objects so tests and the reconciler can
//! swap in their own implementations.

use async_trait::async_trait;
use thiserror::Error;

use super::model::{Credentials, ProfileRecord, Session, SignUp};

/// Failure reported by an external collaborator.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The provider answered and said no; the message is shown to the user as is.
    #[error("{0}")]
    Rejected(String),
    /// Unique violation (`23505`) relayed by `PostgREST`: the row already exists.
    #[error("{0}")]
    Duplicate(String),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response: {0}")]
    Unexpected(String),
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Unexpected(err.to_string())
    }
}

/// Identity provider operations used by the pages.
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUp, ServiceError>;

    async fn sign_in_with_password(&self, credentials: &Credentials)
        -> Result<Session, ServiceError>;

    /// Revoke the session server side.
    async fn sign_out(&self, session: &Session) -> Result<(), ServiceError>;
}

/// Application profile table.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Insert a single profile row. `session` is the bearer for row-level security;
    /// `None` means the store's own key.
    async fn insert(
        &self,
        session: Option<&Session>,
        record: &ProfileRecord,
    ) -> Result<(), ServiceError>;
}
