use async_trait::async_trait;
use tracing::{debug, instrument};

use super::{failure, SupabaseClient};
use crate::provisioning::{ProfileRecord, ProfileStore, ServiceError, Session};

/// Inserts profile rows through the `PostgREST` API.
#[derive(Clone, Debug)]
pub struct Postgrest {
    client: SupabaseClient,
    table: String,
}

impl Postgrest {
    #[must_use]
    pub fn new(client: SupabaseClient, table: &str) -> Self {
        Self {
            client,
            table: table.trim_matches('/').to_string(),
        }
    }

    /// Signed-in writes go out as the user so row-level security applies; the
    /// reconciler writes with the service role key when one is configured.
    fn credentials<'a>(&'a self, session: Option<&'a Session>) -> (&'a str, &'a str) {
        match (session, self.client.service_key()) {
            (Some(session), _) => (self.client.anon_key(), session.bearer()),
            (None, Some(service_key)) => (service_key, service_key),
            (None, None) => (self.client.anon_key(), self.client.anon_key()),
        }
    }
}

#[async_trait]
impl ProfileStore for Postgrest {
    #[instrument(
        skip(self, session, record),
        fields(table = %self.table, user_id = %record.user_id, as_user = session.is_some())
    )]
    async fn insert(
        &self,
        session: Option<&Session>,
        record: &ProfileRecord,
    ) -> Result<(), ServiceError> {
        let url = self.client.endpoint(&format!("rest/v1/{}", self.table))?;
        let (apikey, bearer) = self.credentials(session);

        let response = self
            .client
            .post(url, apikey, bearer)
            .header("Prefer", "return=minimal")
            .json(&[record])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(failure(response).await);
        }

        debug!("profile row inserted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provisioning::AuthAccount;
    use secrecy::SecretString;
    use serde_json::json;
    use std::net::TcpListener;
    use uuid::Uuid;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn store(server: &MockServer, service_key: Option<&str>) -> Postgrest {
        let client = SupabaseClient::new(
            &server.uri(),
            SecretString::from("anon-key".to_string()),
            service_key.map(|key| SecretString::from(key.to_string())),
        )
        .expect("client");
        Postgrest::new(client, "teachers")
    }

    fn record() -> ProfileRecord {
        ProfileRecord {
            user_id: Uuid::nil(),
            first_name: "Ana".to_string(),
            last_name: "Lee".to_string(),
            email: "new@x.com".to_string(),
        }
    }

    fn session() -> Session {
        Session {
            access_token: SecretString::from("jwt-access".to_string()),
            refresh_token: None,
            user: AuthAccount {
                id: Uuid::nil(),
                email: "new@x.com".to_string(),
            },
        }
    }

    #[test]
    fn table_name_is_trimmed() {
        let client = SupabaseClient::new(
            "http://localhost:54321",
            SecretString::from("anon-key".to_string()),
            None,
        )
        .expect("client");
        assert_eq!(Postgrest::new(client, "/teachers/").table, "teachers");
    }

    #[tokio::test]
    async fn insert_as_user() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/teachers"))
            .and(header("apikey", "anon-key"))
            .and(header("authorization", "Bearer jwt-access"))
            .and(header("prefer", "return=minimal"))
            .and(body_json(json!([{
                "user_id": "00000000-0000-0000-0000-000000000000",
                "first_name": "Ana",
                "last_name": "Lee",
                "email": "new@x.com"
            }])))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        store(&server, Some("service-key"))
            .insert(Some(&session()), &record())
            .await
            .expect("inserted");
    }

    #[tokio::test]
    async fn insert_without_session_uses_service_key() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/teachers"))
            .and(header("apikey", "service-key"))
            .and(header("authorization", "Bearer service-key"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        store(&server, Some("service-key"))
            .insert(None, &record())
            .await
            .expect("inserted");
    }

    #[tokio::test]
    async fn insert_without_session_or_service_key_uses_anon() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/teachers"))
            .and(header("authorization", "Bearer anon-key"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        store(&server, None)
            .insert(None, &record())
            .await
            .expect("inserted");
    }

    #[tokio::test]
    async fn rls_violation_is_rejected_with_message() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/teachers"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "code": "42501",
                "details": null,
                "hint": null,
                "message": "new row violates row-level security policy for table \"teachers\""
            })))
            .mount(&server)
            .await;

        let err = store(&server, None)
            .insert(Some(&session()), &record())
            .await
            .expect_err("rejected");
        assert!(matches!(
            err,
            ServiceError::Rejected(ref m) if m.starts_with("new row violates row-level security")
        ));
    }

    #[tokio::test]
    async fn unique_violation_is_duplicate() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/teachers"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "code": "23505",
                "details": "Key (user_id)=(00000000-0000-0000-0000-000000000000) already exists.",
                "hint": null,
                "message": "duplicate key value violates unique constraint \"teachers_pkey\""
            })))
            .mount(&server)
            .await;

        let err = store(&server, Some("service-key"))
            .insert(None, &record())
            .await
            .expect_err("duplicate");
        assert!(matches!(err, ServiceError::Duplicate(_)));
    }

    #[tokio::test]
    async fn server_error_is_unexpected() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/teachers"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = store(&server, None)
            .insert(None, &record())
            .await
            .expect_err("server error");
        assert!(matches!(err, ServiceError::Unexpected(_)));
    }
}
