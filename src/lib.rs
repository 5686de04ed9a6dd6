//! # Faculty (teacher accounts on Supabase)
//!
//! `faculty` serves the login, signup and dashboard pages of a teacher portal.
//! Identity lives in Supabase Auth (`GoTrue`); the application owns one table of
//! teacher profiles behind `PostgREST`.
//!
//! ## Account provisioning
//!
//! Signup spans two systems that fail independently: the auth account is created
//! first, the profile row second. Every attempt is recorded as an intent in a
//! journal before the first external call. When the profile insert fails the new
//! session is signed out, and a background reconciler later retries the insert for
//! intents that are stuck with an account but no profile.
//!
//! ## Forms
//!
//! Each page form moves through a single `FormState` (`idle`, `submitting`,
//! `succeeded`, `failed`). Duplicate submissions of the same rendered form are
//! refused while the first one is in flight.

pub mod cli;
pub mod faculty;
pub mod provisioning;
pub mod supabase;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
