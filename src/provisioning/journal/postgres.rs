//! `PostgreSQL` journal backed by the `provisioning_intents` table.

use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use std::time::Duration;
use tracing::{info_span, Instrument};
use uuid::Uuid;

use super::{IntentJournal, IntentState, JournalError, ProvisioningIntent};

const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

#[derive(Clone, Debug)]
pub struct PgJournal {
    pool: PgPool,
}

impl PgJournal {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the intents table if it does not exist.
    ///
    /// # Errors
    /// Returns an error if any schema statement fails
    pub async fn init_schema(&self) -> Result<(), JournalError> {
        for statement in split_sql_statements(SCHEMA_SQL) {
            sqlx::query(&statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    fn row_to_intent(row: &PgRow) -> Result<ProvisioningIntent, JournalError> {
        let state: String = row.try_get("state")?;
        let attempts: i32 = row.try_get("attempts")?;
        Ok(ProvisioningIntent {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            user_id: row.try_get("user_id")?,
            state: state.parse()?,
            attempts: u32::try_from(attempts).unwrap_or_default(),
        })
    }
}

fn db_span(operation: &'static str, statement: &'static str) -> tracing::Span {
    info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

#[async_trait]
impl IntentJournal for PgJournal {
    async fn begin(&self, intent: &ProvisioningIntent) -> Result<(), JournalError> {
        let query = r"
            INSERT INTO provisioning_intents
                (id, email, first_name, last_name, user_id, state)
            VALUES ($1, $2, $3, $4, $5, $6)
        ";
        sqlx::query(query)
            .bind(intent.id)
            .bind(&intent.email)
            .bind(&intent.first_name)
            .bind(&intent.last_name)
            .bind(intent.user_id)
            .bind(intent.state.as_str())
            .execute(&self.pool)
            .instrument(db_span("INSERT", query))
            .await?;
        Ok(())
    }

    async fn update(
        &self,
        id: Uuid,
        state: IntentState,
        user_id: Option<Uuid>,
    ) -> Result<(), JournalError> {
        let query = r"
            UPDATE provisioning_intents
            SET state = $2, user_id = COALESCE($3, user_id), updated_at = now()
            WHERE id = $1
        ";
        let result = sqlx::query(query)
            .bind(id)
            .bind(state.as_str())
            .bind(user_id)
            .execute(&self.pool)
            .instrument(db_span("UPDATE", query))
            .await?;

        if result.rows_affected() == 0 {
            return Err(JournalError::NotFound(id));
        }
        Ok(())
    }

    async fn record_attempt(&self, id: Uuid) -> Result<u32, JournalError> {
        let query = r"
            UPDATE provisioning_intents
            SET attempts = attempts + 1, updated_at = now()
            WHERE id = $1
            RETURNING attempts
        ";
        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(db_span("UPDATE", query))
            .await?
            .ok_or(JournalError::NotFound(id))?;

        let attempts: i32 = row.try_get("attempts")?;
        Ok(u32::try_from(attempts).unwrap_or_default())
    }

    async fn stale(
        &self,
        grace: Duration,
        limit: usize,
    ) -> Result<Vec<ProvisioningIntent>, JournalError> {
        let query = r"
            SELECT id, email, first_name, last_name, user_id, state, attempts
            FROM provisioning_intents
            WHERE state = 'account_created'
              AND updated_at <= now() - make_interval(secs => $1)
            ORDER BY updated_at
            LIMIT $2
        ";
        let rows = sqlx::query(query)
            .bind(grace.as_secs_f64())
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .instrument(db_span("SELECT", query))
            .await?;

        rows.iter().map(Self::row_to_intent).collect()
    }
}

fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();

    for line in sql.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("--") {
            continue;
        }
        current.push_str(line);
        current.push('\n');

        if trimmed.ends_with(';') {
            let statement = current.trim();
            if !statement.is_empty() {
                statements.push(statement.to_string());
            }
            current.clear();
        }
    }

    let leftover = current.trim();
    if !leftover.is_empty() {
        statements.push(leftover.to_string());
    }

    statements
}
