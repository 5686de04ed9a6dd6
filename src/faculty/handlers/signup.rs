use axum::{
    extract::{Extension, Form},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;
use utoipa::ToSchema;

use super::check_fields;
use crate::faculty::{
    form::{self, FormState, ALREADY_SUBMITTING},
    pages::{self, SignupPage},
    state::AppState,
};
use crate::provisioning::{Credentials, SignupOutcome, SignupRequest};

#[derive(Deserialize, ToSchema)]
pub struct SignupForm {
    form_id: Option<String>,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

fn redirect_for(outcome: &SignupOutcome) -> &'static str {
    match outcome {
        SignupOutcome::Provisioned { .. } => "/login?notice=account-created",
        SignupOutcome::PendingConfirmation { .. } => "/check-email",
    }
}

#[utoipa::path(
    get,
    path = "/signup",
    responses(
        (status = 200, description = "Signup form", content_type = "text/html", body = String)
    ),
    tag = "pages"
)]
pub async fn signup_page() -> Response {
    pages::render(&SignupPage::default())
}

#[utoipa::path(
    post,
    path = "/signup",
    request_body(content = SignupForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Account created (redirect to /login) or awaiting confirmation (redirect to /check-email)"),
        (status = 200, description = "Signup form with the error", content_type = "text/html", body = String),
        (status = 409, description = "Form already being submitted", content_type = "text/html", body = String)
    ),
    tag = "pages"
)]
pub async fn signup(app: Extension<Arc<AppState>>, Form(form): Form<SignupForm>) -> Response {
    let form_id = form::form_id(form.form_id.as_deref());

    let page = |state: FormState| SignupPage {
        form_id,
        first_name: form.first_name.trim(),
        last_name: form.last_name.trim(),
        email: form.email.trim(),
        state,
    };

    let Some(_guard) = app.in_flight().acquire(form_id) else {
        debug!(%form_id, "duplicate submission");
        let state = FormState::Failed(ALREADY_SUBMITTING.to_string());
        return pages::render_with(StatusCode::CONFLICT, &page(state));
    };
    let submitting = FormState::Submitting;

    let required = [
        form.password.as_str(),
        form.first_name.as_str(),
        form.last_name.as_str(),
    ];
    if let Err(message) = check_fields(&form.email, &required) {
        return pages::render(&page(submitting.finish(Err(message.to_string()))));
    }

    let request = SignupRequest::new(
        Credentials::new(&form.email, SecretString::from(form.password.clone())),
        &form.first_name,
        &form.last_name,
    );

    match app.provisioner().provision(&request).await {
        Ok(outcome) => Redirect::to(redirect_for(&outcome)).into_response(),
        Err(err) => pages::render(&page(submitting.finish(Err(err.to_string())))),
    }
}
