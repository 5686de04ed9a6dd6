//! Background repair of signups that stopped between the two external writes.
//!
//! Every tick picks `account_created` intents that have been quiet for the grace
//! period and retries the profile insert with the store's own (service role) key.
//! An intent that keeps failing is marked `abandoned` after `max_attempts`; deleting
//! the orphaned auth account needs the provider's admin API and is left to an
//! operator.

use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{sync::Arc, time::Duration};
use tokio::{task::JoinHandle, time::sleep};
use tracing::{debug, error, info, warn};

use super::{
    journal::{IntentJournal, IntentState, JournalError, ProvisioningIntent},
    service::{ProfileStore, ServiceError},
};

#[derive(Clone, Copy, Debug)]
pub struct ReconcilerConfig {
    interval: Duration,
    grace: Duration,
    max_attempts: u32,
    batch_size: usize,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ReconcilerConfig {
    /// Every 60s, intents quiet for 5m, 5 attempts, 20 intents per tick.
    #[must_use]
    pub fn new() -> Self {
        Self {
            interval: Duration::from_secs(60),
            grace: Duration::from_secs(300),
            max_attempts: 5,
            batch_size: 20,
        }
    }

    #[must_use]
    pub fn with_interval_seconds(mut self, seconds: u64) -> Self {
        self.interval = Duration::from_secs(seconds);
        self
    }

    #[must_use]
    pub fn with_grace_seconds(mut self, seconds: u64) -> Self {
        self.grace = Duration::from_secs(seconds);
        self
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    #[must_use]
    pub fn normalize(self) -> Self {
        Self {
            interval: if self.interval.is_zero() {
                Duration::from_secs(1)
            } else {
                self.interval
            },
            grace: self.grace,
            max_attempts: self.max_attempts.max(1),
            batch_size: self.batch_size.max(1),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub completed: usize,
    pub retrying: usize,
    pub abandoned: usize,
}

pub struct Reconciler {
    journal: Arc<dyn IntentJournal>,
    profiles: Arc<dyn ProfileStore>,
    config: ReconcilerConfig,
}

impl Reconciler {
    #[must_use]
    pub fn new(
        journal: Arc<dyn IntentJournal>,
        profiles: Arc<dyn ProfileStore>,
        config: ReconcilerConfig,
    ) -> Self {
        Self {
            journal,
            profiles,
            config: config.normalize(),
        }
    }

    /// One pass over the stale intents.
    ///
    /// # Errors
    /// Returns an error only if the stale intents cannot be listed
    pub async fn run_once(&self) -> Result<ReconcileReport, JournalError> {
        let stale = self
            .journal
            .stale(self.config.grace, self.config.batch_size)
            .await?;

        let mut report = ReconcileReport::default();
        for intent in stale {
            match self.repair(&intent).await {
                IntentState::Completed => report.completed += 1,
                IntentState::Abandoned => report.abandoned += 1,
                _ => report.retrying += 1,
            }
        }

        if report != ReconcileReport::default() {
            info!(
                completed = report.completed,
                retrying = report.retrying,
                abandoned = report.abandoned,
                "Reconciliation pass finished"
            );
        }
        Ok(report)
    }

    async fn repair(&self, intent: &ProvisioningIntent) -> IntentState {
        let Some(profile) = intent.profile() else {
            error!(intent = %intent.id, "Intent has no account id; abandoning");
            self.mark(intent, IntentState::Abandoned).await;
            return IntentState::Abandoned;
        };

        let attempts = match self.journal.record_attempt(intent.id).await {
            Ok(attempts) => attempts,
            Err(err) => {
                warn!(intent = %intent.id, "Failed to record attempt: {err}");
                return IntentState::AccountCreated;
            }
        };

        match self.profiles.insert(None, &profile).await {
            Ok(()) => {
                info!(intent = %intent.id, user_id = %profile.user_id, "Profile recovered");
                self.mark(intent, IntentState::Completed).await;
                IntentState::Completed
            }
            Err(ServiceError::Duplicate(message)) => {
                debug!(intent = %intent.id, "Profile already present: {message}");
                self.mark(intent, IntentState::Completed).await;
                IntentState::Completed
            }
            Err(err) if attempts >= self.config.max_attempts => {
                error!(
                    intent = %intent.id,
                    user_id = %profile.user_id,
                    email = %intent.email,
                    attempts,
                    "Giving up on profile recovery, account is orphaned: {err}"
                );
                self.mark(intent, IntentState::Abandoned).await;
                IntentState::Abandoned
            }
            Err(err) => {
                warn!(intent = %intent.id, attempts, "Profile recovery failed: {err}");
                IntentState::AccountCreated
            }
        }
    }

    async fn mark(&self, intent: &ProvisioningIntent, state: IntentState) {
        if let Err(err) = self.journal.update(intent.id, state, None).await {
            warn!(intent = %intent.id, %state, "Failed to update intent: {err}");
        }
    }

    /// Run forever on a jittered interval.
    #[must_use]
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut rng = StdRng::from_entropy();
            info!(
                interval = self.config.interval.as_secs(),
                grace = self.config.grace.as_secs(),
                "Reconciler started"
            );

            loop {
                let factor: f64 = rng.gen_range(0.7..0.9);
                sleep(self.config.interval.mul_f64(factor)).await;

                if let Err(err) = self.run_once().await {
                    error!("Reconciliation pass failed: {err}");
                }
            }
        })
    }
}
