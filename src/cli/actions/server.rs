use crate::{
    cli::{globals::GlobalArgs, telemetry},
    faculty,
    provisioning::{IntentJournal, MemoryJournal, PgJournal, ReconcilerConfig},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: Option<String>,
    pub supabase_url: String,
    pub supabase_anon_key: SecretString,
    pub supabase_service_key: Option<SecretString>,
    pub profile_table: String,
    pub insecure_cookie: bool,
    pub reconcile_interval_seconds: u64,
    pub reconcile_grace_seconds: u64,
    pub reconcile_max_attempts: u32,
    pub reconcile_batch_size: usize,
}

/// Open the signup journal: Postgres when a DSN is given, memory otherwise.
///
/// # Errors
/// Returns an error if the database is unreachable or the schema cannot be created
pub async fn journal(dsn: Option<&str>) -> Result<Arc<dyn IntentJournal>> {
    let Some(dsn) = dsn else {
        warn!("No DSN configured, signup journal is kept in memory");
        return Ok(Arc::new(MemoryJournal::new()));
    };

    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(dsn)
        .await
        .context("Failed to connect to database")?;

    let journal = PgJournal::new(pool);
    journal
        .init_schema()
        .await
        .context("Failed to create the provisioning_intents table")?;

    info!("Signup journal stored in PostgreSQL");
    Ok(Arc::new(journal))
}

/// Execute the server action.
/// # Errors
/// Returns an error if the journal cannot be opened or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let mut globals = GlobalArgs::new(args.supabase_url, args.supabase_anon_key);
    globals.profile_table = args.profile_table;
    globals.secure_cookie = !args.insecure_cookie;
    if let Some(key) = args.supabase_service_key {
        globals.set_service_key(key);
    }

    debug!("Global args: {:?}", globals);

    let journal = journal(args.dsn.as_deref()).await?;

    let reconciler_config = ReconcilerConfig::new()
        .with_interval_seconds(args.reconcile_interval_seconds)
        .with_grace_seconds(args.reconcile_grace_seconds)
        .with_max_attempts(args.reconcile_max_attempts)
        .with_batch_size(args.reconcile_batch_size);

    let result = faculty::new(args.port, &globals, journal, reconciler_config).await;

    telemetry::shutdown_tracer();

    result
}
