//! Maps validated CLI arguments to the action to run.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{reconcile, supabase};
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .filter(|dsn| !dsn.is_empty())
        .cloned();

    let supabase_opts = supabase::Options::parse(matches)?;
    let reconcile_opts = reconcile::Options::parse(matches);

    Ok(Action::Server(Args {
        port,
        dsn,
        supabase_url: supabase_opts.url,
        supabase_anon_key: supabase_opts.anon_key,
        supabase_service_key: supabase_opts.service_key,
        profile_table: supabase_opts.profile_table,
        insecure_cookie: supabase_opts.insecure_cookie,
        reconcile_interval_seconds: reconcile_opts.interval_seconds,
        reconcile_grace_seconds: reconcile_opts.grace_seconds,
        reconcile_max_attempts: reconcile_opts.max_attempts,
        reconcile_batch_size: reconcile_opts.batch_size,
    }))
}
