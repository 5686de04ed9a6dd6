//! In-memory stand-ins for the auth provider, profile table and journal.

use async_trait::async_trait;
use secrecy::SecretString;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

use super::journal::{IntentJournal, IntentState, JournalError, ProvisioningIntent};
use super::model::{AuthAccount, Credentials, ProfileRecord, Session, SignUp};
use super::service::{AuthService, ProfileStore, ServiceError};

#[derive(Clone)]
enum AuthMode {
    Active,
    Pending,
    Rejecting(String),
    Unreachable,
}

pub struct FakeAuth {
    mode: AuthMode,
    fail_sign_out: bool,
    sign_ups: AtomicUsize,
    sign_outs: AtomicUsize,
}

impl FakeAuth {
    pub const ACCESS_TOKEN: &'static str = "access-token";

    fn with_mode(mode: AuthMode) -> Self {
        Self {
            mode,
            fail_sign_out: false,
            sign_ups: AtomicUsize::new(0),
            sign_outs: AtomicUsize::new(0),
        }
    }

    pub fn active() -> Self {
        Self::with_mode(AuthMode::Active)
    }

    pub fn pending() -> Self {
        Self::with_mode(AuthMode::Pending)
    }

    pub fn rejecting(message: &str) -> Self {
        Self::with_mode(AuthMode::Rejecting(message.to_string()))
    }

    pub fn unreachable() -> Self {
        Self::with_mode(AuthMode::Unreachable)
    }

    pub fn with_failing_sign_out(mut self) -> Self {
        self.fail_sign_out = true;
        self
    }

    pub fn sign_ups(&self) -> usize {
        self.sign_ups.load(Ordering::SeqCst)
    }

    pub fn sign_outs(&self) -> usize {
        self.sign_outs.load(Ordering::SeqCst)
    }

    fn session(email: &str) -> Session {
        Session {
            access_token: SecretString::from(Self::ACCESS_TOKEN.to_string()),
            refresh_token: None,
            user: AuthAccount {
                id: Uuid::new_v4(),
                email: email.to_string(),
            },
        }
    }

    fn failure(&self) -> Option<ServiceError> {
        match &self.mode {
            AuthMode::Rejecting(message) => Some(ServiceError::Rejected(message.clone())),
            AuthMode::Unreachable => Some(ServiceError::Unexpected("connection refused".to_string())),
            AuthMode::Active | AuthMode::Pending => None,
        }
    }
}

#[async_trait]
impl AuthService for FakeAuth {
    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUp, ServiceError> {
        self.sign_ups.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.failure() {
            return Err(err);
        }
        Ok(match self.mode {
            AuthMode::Pending => SignUp::PendingConfirmation(Some(AuthAccount {
                id: Uuid::new_v4(),
                email: credentials.email().to_string(),
            })),
            _ => SignUp::Active(Self::session(credentials.email())),
        })
    }

    async fn sign_in_with_password(
        &self,
        credentials: &Credentials,
    ) -> Result<Session, ServiceError> {
        match self.failure() {
            Some(err) => Err(err),
            None => Ok(Self::session(credentials.email())),
        }
    }

    async fn sign_out(&self, _session: &Session) -> Result<(), ServiceError> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        if self.fail_sign_out {
            return Err(ServiceError::Rejected("session not found".to_string()));
        }
        Ok(())
    }
}

#[derive(Clone)]
enum ProfileFailure {
    Rejected(String),
    Duplicate,
    Unreachable,
}

impl ProfileFailure {
    fn to_error(&self) -> ServiceError {
        match self {
            Self::Rejected(message) => ServiceError::Rejected(message.clone()),
            Self::Duplicate => ServiceError::Duplicate(
                "duplicate key value violates unique constraint \"teachers_pkey\"".to_string(),
            ),
            Self::Unreachable => ServiceError::Unexpected("503 Service Unavailable".to_string()),
        }
    }
}

pub struct FakeProfiles {
    failure: Mutex<Option<ProfileFailure>>,
    inserted: Mutex<Vec<ProfileRecord>>,
    bearers: Mutex<Vec<Option<String>>>,
}

impl FakeProfiles {
    pub fn accepting() -> Self {
        Self {
            failure: Mutex::new(None),
            inserted: Mutex::new(Vec::new()),
            bearers: Mutex::new(Vec::new()),
        }
    }

    fn failing(failure: ProfileFailure) -> Self {
        let profiles = Self::accepting();
        *profiles.failure.lock().expect("lock") = Some(failure);
        profiles
    }

    pub fn rejecting(message: &str) -> Self {
        Self::failing(ProfileFailure::Rejected(message.to_string()))
    }

    /// Row already present (unique violation).
    pub fn duplicate() -> Self {
        Self::failing(ProfileFailure::Duplicate)
    }

    /// Upstream down: every insert fails with a server error.
    pub fn unreachable() -> Self {
        Self::failing(ProfileFailure::Unreachable)
    }

    pub fn reject_with(&self, message: Option<&str>) {
        *self.failure.lock().expect("lock") =
            message.map(|message| ProfileFailure::Rejected(message.to_string()));
    }

    pub fn inserted(&self) -> Vec<ProfileRecord> {
        self.inserted.lock().expect("lock").clone()
    }

    pub fn bearers(&self) -> Vec<Option<String>> {
        self.bearers.lock().expect("lock").clone()
    }
}

#[async_trait]
impl ProfileStore for FakeProfiles {
    async fn insert(
        &self,
        session: Option<&Session>,
        record: &ProfileRecord,
    ) -> Result<(), ServiceError> {
        self.bearers
            .lock()
            .expect("lock")
            .push(session.map(|s| s.bearer().to_string()));
        if let Some(failure) = self.failure.lock().expect("lock").clone() {
            return Err(failure.to_error());
        }
        self.inserted.lock().expect("lock").push(record.clone());
        Ok(())
    }
}

pub struct FailingJournal;

#[async_trait]
impl IntentJournal for FailingJournal {
    async fn begin(&self, _intent: &ProvisioningIntent) -> Result<(), JournalError> {
        Err(JournalError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn update(
        &self,
        id: Uuid,
        _state: IntentState,
        _user_id: Option<Uuid>,
    ) -> Result<(), JournalError> {
        Err(JournalError::NotFound(id))
    }

    async fn record_attempt(&self, id: Uuid) -> Result<u32, JournalError> {
        Err(JournalError::NotFound(id))
    }

    async fn stale(
        &self,
        _grace: Duration,
        _limit: usize,
    ) -> Result<Vec<ProvisioningIntent>, JournalError> {
        Err(JournalError::Database(sqlx::Error::PoolTimedOut))
    }
}
