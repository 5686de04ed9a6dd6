pub mod account;
pub mod health;
pub mod login;
pub mod signup;

pub use self::health::health;

use regex::Regex;

pub const INVALID_EMAIL: &str = "Please enter a valid email address.";
pub const MISSING_FIELDS: &str = "Please fill in all fields.";

#[must_use]
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

/// Field checks done before calling out to the provider.
fn check_fields(email: &str, required: &[&str]) -> Result<(), &'static str> {
    if email.trim().is_empty() || required.iter().any(|value| value.trim().is_empty()) {
        return Err(MISSING_FIELDS);
    }
    if !valid_email(email.trim()) {
        return Err(INVALID_EMAIL);
    }
    Ok(())
}
