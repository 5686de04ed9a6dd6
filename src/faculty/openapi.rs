use super::handlers::{account, health, login, signup};
use utoipa::{
    openapi::{Contact, License},
    OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        login::login_page,
        login::login,
        signup::signup_page,
        signup::signup,
        account::dashboard,
        account::check_email,
        account::logout,
    ),
    components(schemas(health::Health, login::LoginForm, signup::SignupForm)),
    tags(
        (name = "pages", description = "Login, signup and dashboard pages"),
        (name = "health", description = "Liveness and build information")
    )
)]
struct ApiDoc;

/// `OpenAPI` document with the package metadata from Cargo.toml.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info.title = env!("CARGO_PKG_NAME").to_string();
    doc.info.version = env!("CARGO_PKG_VERSION").to_string();
    doc.info.description = Some(env!("CARGO_PKG_DESCRIPTION").to_string());
    doc.info.license = Some(License::new(env!("CARGO_PKG_LICENSE")));
    doc.info.contact = cargo_contact();
    doc
}

// Cargo authors may be "Name <email>".
fn cargo_contact() -> Option<Contact> {
    let primary = env!("CARGO_PKG_AUTHORS").split(':').next().map(str::trim)?;
    if primary.is_empty() {
        return None;
    }

    let mut contact = Contact::new();
    match primary.split_once('<') {
        Some((name, email)) => {
            contact.name = Some(name.trim().to_string());
            contact.email = Some(email.trim_end_matches('>').trim().to_string());
        }
        None => contact.name = Some(primary.to_string()),
    }
    Some(contact)
}
