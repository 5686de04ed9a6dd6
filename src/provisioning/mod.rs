//! Login and signup flows, independent of HTTP.

pub mod error;
pub mod journal;
pub mod login;
pub mod model;
pub mod reconcile;
pub mod service;
pub mod signup;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{LoginError, SignupError};
pub use journal::{
    IntentJournal, IntentState, JournalError, MemoryJournal, PgJournal, ProvisioningIntent,
};
pub use login::LoginFlow;
pub use model::{AuthAccount, Credentials, ProfileRecord, Session, SignUp, SignupRequest};
pub use reconcile::{Reconciler, ReconcilerConfig};
pub use service::{AuthService, ProfileStore, ServiceError};
pub use signup::{AccountProvisioner, SignupOutcome};
