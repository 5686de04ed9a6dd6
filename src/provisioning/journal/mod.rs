//! Saga bookkeeping for account provisioning.
//!
//! An intent is written before the auth account is requested and advanced as the
//! signup progresses:
//!
//! ```text
//! started ─┬─> failed            (provider rejected the signup)
//!          ├─> pending           (email confirmation required)
//!          └─> account_created ─┬─> completed
//!                               └─> abandoned (reconciler gave up)
//! ```
//!
//! Intents parked in `account_created` have an auth account without a profile row;
//! the reconciler picks them up once they have been quiet for a grace period.

mod memory;
mod postgres;

pub use memory::MemoryJournal;
pub use postgres::PgJournal;

use async_trait::async_trait;
use std::{fmt, str::FromStr, time::Duration};
use thiserror::Error;
use uuid::Uuid;

use super::model::{ProfileRecord, SignupRequest};

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("intent {0} not found")]
    NotFound(Uuid),
    #[error("invalid intent state: {0}")]
    InvalidState(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntentState {
    Started,
    Pending,
    AccountCreated,
    Completed,
    Failed,
    Abandoned,
}

impl IntentState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Pending => "pending",
            Self::AccountCreated => "account_created",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Abandoned => "abandoned",
        }
    }

    /// No further step of the saga follows this state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Started | Self::AccountCreated)
    }
}

impl fmt::Display for IntentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntentState {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "started" => Ok(Self::Started),
            "pending" => Ok(Self::Pending),
            "account_created" => Ok(Self::AccountCreated),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "abandoned" => Ok(Self::Abandoned),
            other => Err(JournalError::InvalidState(other.to_string())),
        }
    }
}

/// One signup attempt as the journal sees it. Never holds the password.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProvisioningIntent {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub user_id: Option<Uuid>,
    pub state: IntentState,
    pub attempts: u32,
}

impl ProvisioningIntent {
    #[must_use]
    pub fn new(request: &SignupRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: request.credentials.email().to_string(),
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            user_id: None,
            state: IntentState::Started,
            attempts: 0,
        }
    }

    /// The profile row this intent should produce, once the account id is known.
    #[must_use]
    pub fn profile(&self) -> Option<ProfileRecord> {
        self.user_id.map(|user_id| ProfileRecord {
            user_id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
        })
    }
}

#[async_trait]
pub trait IntentJournal: Send + Sync {
    async fn begin(&self, intent: &ProvisioningIntent) -> Result<(), JournalError>;

    /// Move an intent to `state`. A `None` user id keeps the stored one. Journals
    /// may forget an intent once its state is terminal.
    async fn update(
        &self,
        id: Uuid,
        state: IntentState,
        user_id: Option<Uuid>,
    ) -> Result<(), JournalError>;

    /// Count a reconciliation attempt and return the new total. Also resets the
    /// quiet period, so retries are spaced by the grace period.
    async fn record_attempt(&self, id: Uuid) -> Result<u32, JournalError>;

    /// `account_created` intents untouched for at least `grace`, oldest first.
    async fn stale(
        &self,
        grace: Duration,
        limit: usize,
    ) -> Result<Vec<ProvisioningIntent>, JournalError>;
}
