//! Form lifecycle shared by the login and signup pages.
//!
//! A form is in exactly one `FormState`. Submissions are tracked per rendered form
//! (`form_id`) so a second POST of the same form is refused while the first one is
//! still running.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex, PoisonError},
};
use ulid::Ulid;

pub const ALREADY_SUBMITTING: &str = "This form is already being submitted.";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FormState {
    #[default]
    Idle,
    Submitting,
    Succeeded(String),
    Failed(String),
}

impl FormState {
    /// Settle a submission. Only meaningful from `submitting`.
    #[must_use]
    pub fn finish(self, result: Result<String, String>) -> Self {
        match (self, result) {
            (Self::Submitting, Ok(message)) => Self::Succeeded(message),
            (Self::Submitting, Err(message)) => Self::Failed(message),
            (other, _) => other,
        }
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting)
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }

    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        match self {
            Self::Succeeded(message) => Some(message),
            _ => None,
        }
    }
}

/// Forms currently being processed.
#[derive(Clone, Debug, Default)]
pub struct InFlight {
    forms: Arc<Mutex<HashSet<Ulid>>>,
}

impl InFlight {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `form_id`; `None` if it is already claimed.
    #[must_use]
    pub fn acquire(&self, form_id: Ulid) -> Option<InFlightGuard> {
        let inserted = self
            .forms
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(form_id);

        inserted.then(|| InFlightGuard {
            forms: Arc::clone(&self.forms),
            form_id,
        })
    }

    #[cfg(test)]
    fn contains(&self, form_id: Ulid) -> bool {
        self.forms
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&form_id)
    }
}

/// Releases its form when dropped.
#[derive(Debug)]
pub struct InFlightGuard {
    forms: Arc<Mutex<HashSet<Ulid>>>,
    form_id: Ulid,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.forms
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.form_id);
    }
}

/// Parse a submitted `form_id`, minting a fresh one when it is missing or invalid.
#[must_use]
pub fn form_id(raw: Option<&str>) -> Ulid {
    raw.and_then(|value| Ulid::from_string(value.trim()).ok())
        .unwrap_or_else(Ulid::new)
}
