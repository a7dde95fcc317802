//! HTTP surface over the extractor and the mock login flow

mod handlers;
mod types;

use crate::api::MetadataExtractor;
use crate::auth::AuthService;
use crate::config::{AuthSettings, ServerSettings};
use axum::http::HeaderValue;
use axum::{
    routing::{get, post},
    Router,
};
use log::{info, warn};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};

pub use handlers::{status_for, ApiError};
pub use types::*;

/// State shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    pub extractor: Arc<MetadataExtractor>,
    pub auth: Arc<AuthService>,
    /// Where the mock identity provider sends the browser back to
    pub frontend_callback_url: String,
}

impl AppState {
    pub fn new(extractor: MetadataExtractor, auth_settings: &AuthSettings) -> Self {
        Self {
            extractor: Arc::new(extractor),
            auth: Arc::new(AuthService::mock(auth_settings)),
            frontend_callback_url: auth_settings.frontend_callback_url.clone(),
        }
    }
}

/// Build the router with all endpoints
pub fn build_router(state: AppState, settings: &ServerSettings) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Metadata
        .route("/api/common-fields", get(handlers::common_fields))
        .route("/api/dicom-metadata", post(handlers::dicom_metadata))
        // Mock login
        .route("/api/auth/login", get(handlers::login))
        .route("/api/auth/callback", post(handlers::auth_callback))
        .route("/api/auth/session/{session_id}", get(handlers::session_user))
        .route("/api/auth/logout", post(handlers::logout))
        .route("/mock-idp/authorize", get(handlers::mock_idp_authorize))
        .layer(cors_layer(&settings.allowed_origins))
        .with_state(state)
}

/// Permissive when no origins are configured
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::permissive().allow_origin(AllowOrigin::list(origins))
}

/// Start the server and run until the listener fails
pub async fn start_server(settings: &ServerSettings, state: AppState) -> std::io::Result<()> {
    info!("Starting server on {}", settings.bind);

    let app = build_router(state, settings);
    let listener = tokio::net::TcpListener::bind(&settings.bind).await?;

    axum::serve(listener, app).await
}
