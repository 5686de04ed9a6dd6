//! Server-rendered HTML for the account pages, from the askama templates in
//! `templates/`. Interpolated values are HTML-escaped by the template engine.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tracing::error;
use ulid::Ulid;

use super::form::FormState;

/// Values echoed back into the login form. The password never is.
#[derive(Template, Clone, Debug)]
#[template(path = "login.html")]
pub struct LoginPage<'a> {
    pub form_id: Ulid,
    pub email: &'a str,
    pub state: FormState,
}

#[derive(Template, Clone, Debug)]
#[template(path = "signup.html")]
pub struct SignupPage<'a> {
    pub form_id: Ulid,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub state: FormState,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardPage {
    pub signed_in: bool,
}

#[derive(Template)]
#[template(path = "check_email.html")]
pub struct CheckEmailPage<'a> {
    pub message: &'a str,
}

impl Default for LoginPage<'_> {
    fn default() -> Self {
        Self {
            form_id: Ulid::new(),
            email: "",
            state: FormState::Idle,
        }
    }
}

impl Default for SignupPage<'_> {
    fn default() -> Self {
        Self {
            form_id: Ulid::new(),
            first_name: "",
            last_name: "",
            email: "",
            state: FormState::Idle,
        }
    }
}

/// Render a page, answering 500 if the template fails.
pub fn render<T: Template>(page: &T) -> Response {
    match page.render() {
        Ok(html) => Html(html).into_response(),
        Err(err) => {
            error!("Failed to render page: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Like `render`, with `status` in place of 200.
pub fn render_with<T: Template>(status: StatusCode, page: &T) -> Response {
    let mut response = render(page);
    if response.status().is_success() {
        *response.status_mut() = status;
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_button_tracks_state() {
        let html = LoginPage::default().render().expect("render");
        assert!(html.contains(">Login</button>"));
        assert!(!html.contains(" disabled>"));

        let html = LoginPage {
            state: FormState::Submitting,
            ..LoginPage::default()
        }
        .render()
        .expect("render");
        assert!(html.contains(r#"data-busy-label="Logging In..." disabled>Logging In...</button>"#));
    }

    #[test]
    fn failed_login_keeps_email_and_enables_button() {
        let html = LoginPage {
            email: "a@b.co",
            state: FormState::Failed("Invalid login credentials".to_string()),
            ..LoginPage::default()
        }
        .render()
        .expect("render");
        assert!(html.contains(r#"<p class="error" role="alert">Invalid login credentials</p>"#));
        assert!(html.contains(r#"value="a@b.co""#));
        assert!(html.contains(">Login</button>"));
        assert!(!html.contains(" disabled>"));
        assert!(!html.contains(r#"role="status""#));
    }

    #[test]
    fn succeeded_login_state_shows_notice() {
        let html = LoginPage {
            state: FormState::Succeeded("Account created successfully!".to_string()),
            ..LoginPage::default()
        }
        .render()
        .expect("render");
        assert!(html.contains(r#"<p class="notice" role="status">Account created successfully!</p>"#));
        assert!(!html.contains(r#"role="alert""#));
    }

    #[test]
    fn signup_escapes_echoed_values() {
        let html = SignupPage {
            first_name: "<b>Ana</b>",
            last_name: "\"Lee\"",
            email: "new@x.com",
            state: FormState::Failed("<script>alert(1)</script>".to_string()),
            ..SignupPage::default()
        }
        .render()
        .expect("render");
        assert!(html.contains("&lt;b&gt;Ana"));
        assert!(!html.contains("<b>Ana</b>"));
        assert!(html.contains("&quot;Lee&quot;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains(">Sign Up</button>"));
        assert!(html.contains("Already have an account?"));
    }

    #[test]
    fn form_id_is_embedded() {
        let form_id = Ulid::new();
        let html = SignupPage {
            form_id,
            ..SignupPage::default()
        }
        .render()
        .expect("render");
        assert!(html.contains(&format!(r#"name="form_id" value="{form_id}""#)));
    }

    #[test]
    fn dashboard_offers_logout_when_signed_in() {
        let signed_in = DashboardPage { signed_in: true }.render().expect("render");
        let signed_out = DashboardPage { signed_in: false }.render().expect("render");
        assert!(signed_in.contains(r#"action="/logout""#));
        assert!(!signed_out.contains(r#"action="/logout""#));
        assert!(signed_out.contains("Welcome to your dashboard!"));
    }

    #[test]
    fn render_with_sets_status() {
        let response = render_with(StatusCode::CONFLICT, &CheckEmailPage { message: "hi" });
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(render(&DashboardPage { signed_in: false }).status(), StatusCode::OK);
    }
}
