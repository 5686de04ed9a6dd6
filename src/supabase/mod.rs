//! HTTP adapters for Supabase: `GoTrue` for accounts, `PostgREST` for the profile table.

pub mod gotrue;
pub mod postgrest;

pub use gotrue::GoTrue;
pub use postgrest::Postgrest;

use anyhow::{anyhow, Context, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::{provisioning::ServiceError, APP_USER_AGENT};

/// Shared HTTP client plus project URL and keys.
#[derive(Clone, Debug)]
pub struct SupabaseClient {
    http: Client,
    base_url: Url,
    anon_key: SecretString,
    service_key: Option<SecretString>,
}

impl SupabaseClient {
    /// # Errors
    /// Returns an error if the project URL is not an http(s) URL or the HTTP client
    /// cannot be built
    pub fn new(
        project_url: &str,
        anon_key: SecretString,
        service_key: Option<SecretString>,
    ) -> Result<Self> {
        let base_url = base_url(project_url)?;

        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()
            .context("Failed to build Supabase HTTP client")?;

        Ok(Self {
            http,
            base_url,
            anon_key,
            service_key,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn has_service_key(&self) -> bool {
        self.service_key.is_some()
    }

    fn endpoint(&self, path: &str) -> Result<Url, ServiceError> {
        self.base_url
            .join(path)
            .map_err(|e| ServiceError::Unexpected(format!("invalid endpoint {path}: {e}")))
    }

    /// POST with the `apikey` header and `bearer` as the Authorization token.
    fn post(&self, url: Url, apikey: &str, bearer: &str) -> RequestBuilder {
        debug!("POST {}", url);
        self.http
            .post(url)
            .header("apikey", apikey)
            .bearer_auth(bearer)
    }

    fn anon_key(&self) -> &str {
        self.anon_key.expose_secret()
    }

    fn service_key(&self) -> Option<&str> {
        self.service_key.as_ref().map(|key| key.expose_secret())
    }
}

fn base_url(project_url: &str) -> Result<Url> {
    let mut url = Url::parse(project_url)
        .with_context(|| format!("Invalid Supabase URL: {project_url}"))?;

    match url.scheme() {
        "http" | "https" => (),
        scheme => return Err(anyhow!("Unsupported Supabase URL scheme: {scheme}")),
    }

    // join() replaces the last segment unless the path ends with a slash
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

/// Postgres `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Turn a non-success response into a `ServiceError`.
///
/// Client errors carry the provider's own message; server errors are unexpected.
async fn failure(response: Response) -> ServiceError {
    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);
    classify(status, &body)
}

fn classify(status: StatusCode, body: &Value) -> ServiceError {
    let message = error_message(body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request rejected")
            .to_string()
    });

    if !status.is_client_error() {
        return ServiceError::Unexpected(format!("{status}: {message}"));
    }
    // GoTrue sends a numeric `code`, PostgREST the SQLSTATE as a string.
    match body.get("code").and_then(Value::as_str) {
        Some(UNIQUE_VIOLATION) => ServiceError::Duplicate(message),
        _ => ServiceError::Rejected(message),
    }
}

/// First message-like string field in a Supabase error body.
fn error_message(body: &Value) -> Option<String> {
    ["msg", "error_description", "message", "error"]
        .iter()
        .find_map(|key| body.get(key).and_then(Value::as_str))
        .filter(|message| !message.is_empty())
        .map(ToString::to_string)
}
