use crate::{
    cli::globals::GlobalArgs,
    provisioning::{
        AccountProvisioner, IntentJournal, LoginFlow, Reconciler, ReconcilerConfig,
    },
    supabase::{GoTrue, Postgrest, SupabaseClient},
};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, warn, Span};
use ulid::Ulid;
use utoipa_swagger_ui::SwaggerUi;

pub mod form;
pub mod handlers;
mod openapi;
pub mod pages;
pub mod session;
pub mod state;

pub use openapi::openapi;
pub use state::AppState;

use handlers::{account, health, login, signup};

/// Page routes plus request id, tracing and the shared state.
#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(account::root))
        .route("/login", get(login::login_page).post(login::login))
        .route("/signup", get(signup::signup_page).post(signup::signup))
        .route("/dashboard", get(account::dashboard))
        .route("/logout", post(account::logout))
        .route("/check-email", get(account::check_email))
        .route("/health", get(health).options(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(state)),
        )
}

/// Wire the Supabase clients, start the reconciler and serve until ctrl-c.
///
/// # Errors
/// Returns an error if the Supabase client cannot be built or the listener fails
pub async fn new(
    port: u16,
    globals: &GlobalArgs,
    journal: Arc<dyn IntentJournal>,
    reconciler_config: ReconcilerConfig,
) -> Result<()> {
    let client = SupabaseClient::new(
        &globals.supabase_url,
        globals.supabase_anon_key.clone(),
        globals.supabase_service_key.clone(),
    )?;

    let auth = Arc::new(GoTrue::new(client.clone()));
    let profiles = Arc::new(Postgrest::new(client.clone(), &globals.profile_table));

    let reconciler = if client.has_service_key() {
        Some(Reconciler::new(journal.clone(), profiles.clone(), reconciler_config).spawn())
    } else {
        warn!("No Supabase service key configured, orphaned signups will not be repaired");
        None
    };

    let state = AppState::new(
        AccountProvisioner::new(auth.clone(), profiles, journal),
        LoginFlow::new(auth),
    )
    .with_secure_cookie(globals.secure_cookie);

    let app = router(Arc::new(state));

    let listener = TcpListener::bind(format!("::0:{port}"))
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;

    info!(supabase = %client.base_url(), "Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {err}");
            }
            info!("Gracefully shutdown");
        })
        .await?;

    if let Some(handle) = reconciler {
        handle.abort();
    }

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
