//! Pages around a finished login or signup.

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap},
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use crate::faculty::{
    pages::{self, CheckEmailPage, DashboardPage},
    session::{clear_session_cookie, has_session, session_from_headers},
    state::AppState,
};
use crate::provisioning::signup::CHECK_EMAIL;

pub async fn root() -> Redirect {
    Redirect::to("/login")
}

#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Dashboard", content_type = "text/html", body = String)
    ),
    tag = "pages"
)]
pub async fn dashboard(headers: HeaderMap) -> Response {
    pages::render(&DashboardPage {
        signed_in: has_session(&headers),
    })
}

#[utoipa::path(
    get,
    path = "/check-email",
    responses(
        (status = 200, description = "Waiting for email confirmation", content_type = "text/html", body = String)
    ),
    tag = "pages"
)]
pub async fn check_email() -> Response {
    pages::render(&CheckEmailPage {
        message: CHECK_EMAIL,
    })
}

#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 303, description = "Session revoked and cleared, redirect to /login")
    ),
    tag = "pages"
)]
pub async fn logout(app: Extension<Arc<AppState>>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(session) = session_from_headers(&headers) {
        app.login().logout(&session).await;
    }

    // Always clear the cookie, even if the provider call failed.
    let mut response_headers = HeaderMap::new();
    if let Some(cookie) = clear_session_cookie(app.secure_cookie()) {
        response_headers.insert(SET_COOKIE, cookie);
    }
    (response_headers, Redirect::to("/login"))
}
