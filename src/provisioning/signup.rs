//! Account provisioning: auth account first, teacher profile second.

use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::{
    error::SignupError,
    journal::{IntentJournal, IntentState, ProvisioningIntent},
    model::{AuthAccount, ProfileRecord, Session, SignUp, SignupRequest},
    service::{AuthService, ProfileStore, ServiceError},
};

pub const ACCOUNT_CREATED: &str = "Account created successfully!";
pub const CHECK_EMAIL: &str =
    "Please check your email to confirm your account and complete registration.";

/// Terminal states of a signup that did not fail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignupOutcome {
    Provisioned {
        account: AuthAccount,
        profile: ProfileRecord,
    },
    PendingConfirmation { account: Option<AuthAccount> },
}

impl SignupOutcome {
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::Provisioned { .. } => ACCOUNT_CREATED,
            Self::PendingConfirmation { .. } => CHECK_EMAIL,
        }
    }
}

#[derive(Clone)]
pub struct AccountProvisioner {
    auth: Arc<dyn AuthService>,
    profiles: Arc<dyn ProfileStore>,
    journal: Arc<dyn IntentJournal>,
}

impl AccountProvisioner {
    #[must_use]
    pub fn new(
        auth: Arc<dyn AuthService>,
        profiles: Arc<dyn ProfileStore>,
        journal: Arc<dyn IntentJournal>,
    ) -> Self {
        Self {
            auth,
            profiles,
            journal,
        }
    }

    /// Run one signup to completion.
    ///
    /// # Errors
    /// `Auth` when the provider refuses the account, `ProfileCreation` when the
    /// account was created but its profile could not be stored, `Unexpected` for
    /// anything else.
    #[instrument(skip(self, request), fields(email = %request.credentials.email()))]
    pub async fn provision(&self, request: &SignupRequest) -> Result<SignupOutcome, SignupError> {
        let intent = ProvisioningIntent::new(request);
        self.journal.begin(&intent).await.map_err(|err| {
            error!("Failed to record provisioning intent: {err}");
            SignupError::Unexpected(err.to_string())
        })?;

        let signed_up = match self.auth.sign_up(&request.credentials).await {
            Ok(signed_up) => signed_up,
            Err(err) => {
                self.advance(intent.id, IntentState::Failed, None).await;
                return Err(match err {
                    ServiceError::Rejected(message) => {
                        info!("Signup rejected by auth provider: {message}");
                        SignupError::Auth(message)
                    }
                    other => {
                        error!("Signup request failed: {other}");
                        SignupError::Unexpected(other.to_string())
                    }
                });
            }
        };

        let session = match signed_up {
            SignUp::Active(session) => session,
            SignUp::PendingConfirmation(account) => {
                let user_id = account.as_ref().map(|a| a.id);
                self.advance(intent.id, IntentState::Pending, user_id).await;
                info!("Account awaits email confirmation");
                return Ok(SignupOutcome::PendingConfirmation { account });
            }
        };

        let account = session.user.clone();
        self.advance(intent.id, IntentState::AccountCreated, Some(account.id))
            .await;

        let profile = request.profile_for(&account);
        if let Err(err) = self.profiles.insert(Some(&session), &profile).await {
            self.sign_out_best_effort(&session).await;
            return Err(match err {
                ServiceError::Rejected(message) | ServiceError::Duplicate(message) => {
                    error!(user_id = %account.id, "Error creating teacher profile: {message}");
                    SignupError::ProfileCreation(message)
                }
                other => {
                    error!(user_id = %account.id, "Profile insert failed: {other}");
                    SignupError::Unexpected(other.to_string())
                }
            });
        }

        self.advance(intent.id, IntentState::Completed, None).await;
        info!(user_id = %account.id, "Account provisioned");

        Ok(SignupOutcome::Provisioned { account, profile })
    }

    /// Journal writes after the first are bookkeeping only; the user-facing result
    /// depends on the external systems alone.
    async fn advance(&self, id: Uuid, state: IntentState, user_id: Option<Uuid>) {
        if let Err(err) = self.journal.update(id, state, user_id).await {
            warn!(intent = %id, %state, "Failed to update provisioning intent: {err}");
        }
    }

    async fn sign_out_best_effort(&self, session: &Session) {
        if let Err(err) = self.auth.sign_out(session).await {
            warn!(user_id = %session.user.id, "Sign out after failed provisioning failed: {err}");
        }
    }
}
