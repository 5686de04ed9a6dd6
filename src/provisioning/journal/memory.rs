//! Process-local journal, used when no database is configured.
//!
//! Only open intents are kept; an intent is dropped as soon as it reaches a
//! terminal state, so the map is bounded by the signups in progress plus the
//! orphans waiting for the reconciler.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use uuid::Uuid;

use super::{IntentJournal, IntentState, JournalError, ProvisioningIntent};

struct Entry {
    intent: ProvisioningIntent,
    touched: Instant,
}

#[derive(Default)]
pub struct MemoryJournal {
    entries: Mutex<HashMap<Uuid, Entry>>,
}

impl MemoryJournal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<Uuid, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries().len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    #[cfg(test)]
    pub(crate) fn get(&self, id: Uuid) -> Option<ProvisioningIntent> {
        self.entries().get(&id).map(|entry| entry.intent.clone())
    }
}

#[async_trait]
impl IntentJournal for MemoryJournal {
    async fn begin(&self, intent: &ProvisioningIntent) -> Result<(), JournalError> {
        self.entries().insert(
            intent.id,
            Entry {
                intent: intent.clone(),
                touched: Instant::now(),
            },
        );
        Ok(())
    }

    async fn update(
        &self,
        id: Uuid,
        state: IntentState,
        user_id: Option<Uuid>,
    ) -> Result<(), JournalError> {
        let mut entries = self.entries();
        if state.is_terminal() {
            return entries
                .remove(&id)
                .map(|_| ())
                .ok_or(JournalError::NotFound(id));
        }

        let entry = entries.get_mut(&id).ok_or(JournalError::NotFound(id))?;
        entry.intent.state = state;
        if user_id.is_some() {
            entry.intent.user_id = user_id;
        }
        entry.touched = Instant::now();
        Ok(())
    }

    async fn record_attempt(&self, id: Uuid) -> Result<u32, JournalError> {
        let mut entries = self.entries();
        let entry = entries.get_mut(&id).ok_or(JournalError::NotFound(id))?;
        entry.intent.attempts += 1;
        entry.touched = Instant::now();
        Ok(entry.intent.attempts)
    }

    async fn stale(
        &self,
        grace: Duration,
        limit: usize,
    ) -> Result<Vec<ProvisioningIntent>, JournalError> {
        let entries = self.entries();
        let mut stale: Vec<&Entry> = entries
            .values()
            .filter(|entry| entry.intent.state == IntentState::AccountCreated)
            .filter(|entry| entry.touched.elapsed() >= grace)
            .collect();
        stale.sort_by_key(|entry| entry.touched);

        Ok(stale
            .into_iter()
            .take(limit)
            .map(|entry| entry.intent.clone())
            .collect())
    }
}
