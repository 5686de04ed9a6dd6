//! Session cookie carrying the provider's access token between login and logout.

use axum::http::{header::COOKIE, HeaderMap, HeaderValue};
use secrecy::SecretString;
use uuid::Uuid;

use crate::provisioning::{AuthAccount, Session};

pub const SESSION_COOKIE_NAME: &str = "faculty_session";

/// Access tokens from Supabase expire after an hour by default.
const SESSION_MAX_AGE_SECONDS: u64 = 3600;

/// `<user id>:<access token>`, `HttpOnly`, `Secure` unless disabled for development.
pub fn session_cookie(session: &Session, secure: bool) -> Option<HeaderValue> {
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={}:{}; Path=/; HttpOnly; SameSite=Lax; Max-Age={SESSION_MAX_AGE_SECONDS}",
        session.user.id,
        session.bearer()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).ok()
}

pub fn clear_session_cookie(secure: bool) -> Option<HeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).ok()
}

/// Rebuild enough of a session from the cookie to revoke it.
///
/// The cookie does not carry the email address, so the restored account has none.
pub fn session_from_headers(headers: &HeaderMap) -> Option<Session> {
    let value = headers.get(COOKIE)?.to_str().ok()?;
    let raw = value.split(';').find_map(|pair| {
        let (key, val) = pair.trim().split_once('=')?;
        (key.trim() == SESSION_COOKIE_NAME).then(|| val.trim())
    })?;

    let (user_id, token) = raw.split_once(':')?;
    let user_id = Uuid::parse_str(user_id).ok()?;
    if token.is_empty() {
        return None;
    }

    Some(Session {
        access_token: SecretString::from(token.to_string()),
        refresh_token: None,
        user: AuthAccount {
            id: user_id,
            email: String::new(),
        },
    })
}

#[must_use]
pub fn has_session(headers: &HeaderMap) -> bool {
    session_from_headers(headers).is_some()
}
