//! Request and record types shared by the login and signup flows.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

/// Email and password exactly as submitted. Dropped once the request finishes.
#[derive(Clone)]
pub struct Credentials {
    email: String,
    password: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(email: &str, password: SecretString) -> Self {
        Self {
            email: email.trim().to_string(),
            password,
        }
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn password(&self) -> &SecretString {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// One signup submission: credentials plus the profile fields of the form.
#[derive(Clone, Debug)]
pub struct SignupRequest {
    pub credentials: Credentials,
    pub first_name: String,
    pub last_name: String,
}

impl SignupRequest {
    #[must_use]
    pub fn new(credentials: Credentials, first_name: &str, last_name: &str) -> Self {
        Self {
            credentials,
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
        }
    }

    /// Profile row linked to `account`.
    #[must_use]
    pub fn profile_for(&self, account: &AuthAccount) -> ProfileRecord {
        ProfileRecord {
            user_id: account.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.credentials.email().to_string(),
        }
    }
}

/// Identity record owned by the auth provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthAccount {
    pub id: Uuid,
    pub email: String,
}

/// Tokens handed out by the auth provider after sign-in or an auto-confirmed signup.
#[derive(Clone)]
pub struct Session {
    pub access_token: SecretString,
    pub refresh_token: Option<SecretString>,
    pub user: AuthAccount,
}

impl Session {
    #[must_use]
    pub fn bearer(&self) -> &str {
        self.access_token.expose_secret()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("user", &self.user)
            .finish()
    }
}

/// What the provider returned for a signup.
#[derive(Clone, Debug)]
pub enum SignUp {
    /// Account usable right away.
    Active(Session),
    /// Account waits for email confirmation; the provider may or may not reveal it.
    PendingConfirmation(Option<AuthAccount>),
}

/// Application-owned teacher profile, keyed by the auth account id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProfileRecord {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}
