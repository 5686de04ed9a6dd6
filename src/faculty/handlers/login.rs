use axum::{
    extract::{Extension, Form, Query},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use super::check_fields;
use crate::faculty::{
    form::{self, FormState, ALREADY_SUBMITTING},
    pages::{self, LoginPage},
    session::session_cookie,
    state::AppState,
};
use crate::provisioning::{signup::ACCOUNT_CREATED, Credentials};

#[derive(Deserialize, Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LoginQuery {
    /// Short notice key set by the signup redirect, e.g. `account-created`
    notice: Option<String>,
}

/// Only known notices are shown; the query string is never echoed.
fn notice_text(key: Option<&str>) -> Option<&'static str> {
    match key {
        Some("account-created") => Some(ACCOUNT_CREATED),
        _ => None,
    }
}

#[derive(Deserialize, ToSchema)]
pub struct LoginForm {
    form_id: Option<String>,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[utoipa::path(
    get,
    path = "/login",
    params(LoginQuery),
    responses(
        (status = 200, description = "Login form", content_type = "text/html", body = String)
    ),
    tag = "pages"
)]
pub async fn login_page(Query(query): Query<LoginQuery>) -> Response {
    // arriving from a finished signup
    let state = notice_text(query.notice.as_deref())
        .map_or(FormState::Idle, |notice| FormState::Succeeded(notice.to_string()));

    pages::render(&LoginPage {
        state,
        ..LoginPage::default()
    })
}

#[utoipa::path(
    post,
    path = "/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Signed in, redirect to /dashboard"),
        (status = 200, description = "Login form with the error", content_type = "text/html", body = String),
        (status = 409, description = "Form already being submitted", content_type = "text/html", body = String)
    ),
    tag = "pages"
)]
pub async fn login(app: Extension<Arc<AppState>>, Form(form): Form<LoginForm>) -> Response {
    let form_id = form::form_id(form.form_id.as_deref());

    let page = |state: FormState| LoginPage {
        form_id,
        email: form.email.trim(),
        state,
    };

    let Some(_guard) = app.in_flight().acquire(form_id) else {
        debug!(%form_id, "duplicate submission");
        let state = FormState::Failed(ALREADY_SUBMITTING.to_string());
        return pages::render_with(StatusCode::CONFLICT, &page(state));
    };
    let submitting = FormState::Submitting;

    if let Err(message) = check_fields(&form.email, &[form.password.as_str()]) {
        return pages::render(&page(submitting.finish(Err(message.to_string()))));
    }

    let credentials = Credentials::new(&form.email, SecretString::from(form.password.clone()));

    match app.login().login(&credentials).await {
        Ok(session) => {
            let mut headers = HeaderMap::new();
            if let Some(cookie) = session_cookie(&session, app.secure_cookie()) {
                headers.insert(SET_COOKIE, cookie);
            }
            (headers, Redirect::to("/dashboard")).into_response()
        }
        Err(err) => pages::render(&page(submitting.finish(Err(err.to_string())))),
    }
}
