use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{failure, SupabaseClient};
use crate::provisioning::{AuthAccount, AuthService, Credentials, ServiceError, Session, SignUp};

/// Supabase Auth (`GoTrue`) endpoints used by the pages.
#[derive(Clone, Debug)]
pub struct GoTrue {
    client: SupabaseClient,
}

#[derive(Deserialize)]
struct UserPayload {
    id: Uuid,
    email: Option<String>,
}

#[derive(Deserialize)]
struct SessionPayload {
    access_token: String,
    refresh_token: Option<String>,
    user: UserPayload,
}

impl UserPayload {
    fn into_account(self, fallback_email: &str) -> AuthAccount {
        AuthAccount {
            id: self.id,
            email: self.email.unwrap_or_else(|| fallback_email.to_string()),
        }
    }
}

impl SessionPayload {
    fn into_session(self, fallback_email: &str) -> Session {
        Session {
            access_token: SecretString::from(self.access_token),
            refresh_token: self.refresh_token.map(SecretString::from),
            user: self.user.into_account(fallback_email),
        }
    }
}

impl GoTrue {
    #[must_use]
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    fn credentials_body(credentials: &Credentials) -> Value {
        json!({
            "email": credentials.email(),
            "password": credentials.password().expose_secret(),
        })
    }
}

/// Signup answers with a session when the project auto-confirms, otherwise with the
/// bare user (or a `user` field) and no tokens.
fn parse_sign_up(body: Value, email: &str) -> Result<SignUp, ServiceError> {
    if body.get("access_token").is_some_and(|token| !token.is_null()) {
        let payload: SessionPayload = serde_json::from_value(body)?;
        return Ok(SignUp::Active(payload.into_session(email)));
    }

    let user = if body.get("user").is_some_and(|user| !user.is_null()) {
        body.get("user").cloned()
    } else if body.get("id").is_some() {
        Some(body)
    } else {
        None
    };

    let account = user
        .map(serde_json::from_value::<UserPayload>)
        .transpose()?
        .map(|user| user.into_account(email));

    Ok(SignUp::PendingConfirmation(account))
}

#[async_trait]
impl AuthService for GoTrue {
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUp, ServiceError> {
        let url = self.client.endpoint("auth/v1/signup")?;
        let response = self
            .client
            .post(url, self.client.anon_key(), self.client.anon_key())
            .json(&Self::credentials_body(credentials))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(failure(response).await);
        }

        let body: Value = response.json().await?;
        let signed_up = parse_sign_up(body, credentials.email())?;
        debug!(
            active = matches!(signed_up, SignUp::Active(_)),
            "signup accepted"
        );
        Ok(signed_up)
    }

    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    async fn sign_in_with_password(
        &self,
        credentials: &Credentials,
    ) -> Result<Session, ServiceError> {
        let mut url = self.client.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let response = self
            .client
            .post(url, self.client.anon_key(), self.client.anon_key())
            .json(&Self::credentials_body(credentials))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(failure(response).await);
        }

        let payload: SessionPayload = response.json().await?;
        Ok(payload.into_session(credentials.email()))
    }

    #[instrument(skip(self, session), fields(user_id = %session.user.id))]
    async fn sign_out(&self, session: &Session) -> Result<(), ServiceError> {
        let url = self.client.endpoint("auth/v1/logout")?;
        let response = self
            .client
            .post(url, self.client.anon_key(), session.bearer())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(failure(response).await);
        }
        Ok(())
    }
}
