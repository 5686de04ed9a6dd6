use std::sync::Arc;
use tracing::{error, info, instrument};

use super::{
    error::LoginError,
    model::{Credentials, Session},
    service::{AuthService, ServiceError},
};

#[derive(Clone)]
pub struct LoginFlow {
    auth: Arc<dyn AuthService>,
}

impl LoginFlow {
    #[must_use]
    pub fn new(auth: Arc<dyn AuthService>) -> Self {
        Self { auth }
    }

    /// Password sign-in.
    ///
    /// # Errors
    /// `Auth` carries the provider message verbatim; `Unexpected` hides transport detail.
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn login(&self, credentials: &Credentials) -> Result<Session, LoginError> {
        match self.auth.sign_in_with_password(credentials).await {
            Ok(session) => {
                info!(user_id = %session.user.id, "Signed in");
                Ok(session)
            }
            Err(ServiceError::Rejected(message)) => {
                info!("Sign in rejected: {message}");
                Err(LoginError::Auth(message))
            }
            Err(err) => {
                error!("An unexpected error occurred: {err}");
                Err(LoginError::Unexpected(err.to_string()))
            }
        }
    }

    /// Revoke a session; failures are logged and swallowed.
    pub async fn logout(&self, session: &Session) {
        if let Err(err) = self.auth.sign_out(session).await {
            error!(user_id = %session.user.id, "Sign out failed: {err}");
        }
    }
}
