use clap::{Arg, ArgMatches, Command};

pub const ARG_RECONCILE_INTERVAL: &str = "reconcile-interval";
pub const ARG_RECONCILE_GRACE: &str = "reconcile-grace";
pub const ARG_RECONCILE_MAX_ATTEMPTS: &str = "reconcile-max-attempts";
pub const ARG_RECONCILE_BATCH_SIZE: &str = "reconcile-batch-size";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_RECONCILE_INTERVAL)
                .long(ARG_RECONCILE_INTERVAL)
                .help("Seconds between reconciliation passes")
                .env("FACULTY_RECONCILE_INTERVAL")
                .default_value("60")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new(ARG_RECONCILE_GRACE)
                .long(ARG_RECONCILE_GRACE)
                .help("Seconds a signup must be idle before its profile insert is retried")
                .env("FACULTY_RECONCILE_GRACE")
                .default_value("300")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new(ARG_RECONCILE_MAX_ATTEMPTS)
                .long(ARG_RECONCILE_MAX_ATTEMPTS)
                .help("Retries before a signup is abandoned")
                .env("FACULTY_RECONCILE_MAX_ATTEMPTS")
                .default_value("5")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new(ARG_RECONCILE_BATCH_SIZE)
                .long(ARG_RECONCILE_BATCH_SIZE)
                .help("Most signups repaired per pass")
                .env("FACULTY_RECONCILE_BATCH_SIZE")
                .default_value("20")
                .value_parser(clap::value_parser!(usize)),
        )
}

pub struct Options {
    pub interval_seconds: u64,
    pub grace_seconds: u64,
    pub max_attempts: u32,
    pub batch_size: usize,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Self {
        Self {
            interval_seconds: matches
                .get_one::<u64>(ARG_RECONCILE_INTERVAL)
                .copied()
                .unwrap_or(60),
            grace_seconds: matches
                .get_one::<u64>(ARG_RECONCILE_GRACE)
                .copied()
                .unwrap_or(300),
            max_attempts: matches
                .get_one::<u32>(ARG_RECONCILE_MAX_ATTEMPTS)
                .copied()
                .unwrap_or(5),
            batch_size: matches
                .get_one::<usize>(ARG_RECONCILE_BATCH_SIZE)
                .copied()
                .unwrap_or(20),
        }
    }
}
