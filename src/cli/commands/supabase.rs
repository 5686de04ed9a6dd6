use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_SUPABASE_URL: &str = "supabase-url";
pub const ARG_SUPABASE_ANON_KEY: &str = "supabase-anon-key";
pub const ARG_SUPABASE_SERVICE_KEY: &str = "supabase-service-key";
pub const ARG_PROFILE_TABLE: &str = "profile-table";
pub const ARG_INSECURE_COOKIE: &str = "insecure-cookie";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SUPABASE_URL)
                .long(ARG_SUPABASE_URL)
                .help("Supabase project URL, example: https://<project>.supabase.co")
                .env("FACULTY_SUPABASE_URL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_SUPABASE_ANON_KEY)
                .long(ARG_SUPABASE_ANON_KEY)
                .help("Supabase anon (public) API key")
                .env("FACULTY_SUPABASE_ANON_KEY")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_SUPABASE_SERVICE_KEY)
                .long(ARG_SUPABASE_SERVICE_KEY)
                .help("Supabase service role key, enables the profile reconciler")
                .env("FACULTY_SUPABASE_SERVICE_KEY")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_PROFILE_TABLE)
                .long(ARG_PROFILE_TABLE)
                .help("Table holding teacher profiles")
                .env("FACULTY_PROFILE_TABLE")
                .default_value("teachers"),
        )
        .arg(
            Arg::new(ARG_INSECURE_COOKIE)
                .long(ARG_INSECURE_COOKIE)
                .help("Drop the Secure attribute from the session cookie (plain http development)")
                .env("FACULTY_INSECURE_COOKIE")
                .action(ArgAction::SetTrue),
        )
}

pub struct Options {
    pub url: String,
    pub anon_key: SecretString,
    pub service_key: Option<SecretString>,
    pub profile_table: String,
    pub insecure_cookie: bool,
}

impl Options {
    /// # Errors
    /// Returns an error if a required argument is missing
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let url = matches
            .get_one::<String>(ARG_SUPABASE_URL)
            .cloned()
            .context("missing required argument: --supabase-url")?;
        let anon_key = matches
            .get_one::<String>(ARG_SUPABASE_ANON_KEY)
            .cloned()
            .map(SecretString::from)
            .context("missing required argument: --supabase-anon-key")?;
        let service_key = matches
            .get_one::<String>(ARG_SUPABASE_SERVICE_KEY)
            .filter(|key| !key.is_empty())
            .cloned()
            .map(SecretString::from);
        let profile_table = matches
            .get_one::<String>(ARG_PROFILE_TABLE)
            .cloned()
            .unwrap_or_else(|| "teachers".to_string());

        Ok(Self {
            url,
            anon_key,
            service_key,
            profile_table,
            insecure_cookie: matches.get_flag(ARG_INSECURE_COOKIE),
        })
    }
}
