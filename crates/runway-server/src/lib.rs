//! Runway Web Server
//!
//! Axum-based REST API over the runway analytics engine.
//!
//! The server keeps a single uploaded transaction table in memory:
//! - `POST /upload` replaces it
//! - `GET /metrics`, `POST /optimize` and `GET /anomalies` analyze it
//!
//! Nothing is persisted across restarts.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

use runway_core::RunwayConfig;

mod handlers;
mod session;

pub use session::SessionStore;

/// Maximum file upload size (10 MB)
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Room for multipart boundaries and headers on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = any origin)
    pub allowed_origins: Vec<String>,
}

/// Shared application state
pub struct AppState {
    /// Analysis settings (default cash balance, optimizer and anomaly tuning)
    pub settings: RunwayConfig,
    pub config: ServerConfig,
    /// Most recently uploaded table
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(settings: RunwayConfig, config: ServerConfig) -> Self {
        Self {
            settings,
            config,
            sessions: SessionStore::new(),
        }
    }
}

/// Build the router with the given analysis settings
pub fn create_router(settings: RunwayConfig, config: ServerConfig) -> Router {
    create_router_with_state(Arc::new(AppState::new(settings, config)))
}

/// Build the router around existing state
pub fn create_router_with_state(state: Arc<AppState>) -> Router {
    let cors = build_cors(&state.config);

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/upload",
            post(handlers::upload_csv)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE + MULTIPART_OVERHEAD)),
        )
        .route("/metrics", get(handlers::get_metrics))
        .route("/optimize", post(handlers::run_optimize))
        .route("/anomalies", get(handlers::get_anomalies))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn build_cors(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if config.allowed_origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

/// Start the server
pub async fn serve(
    settings: RunwayConfig,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    let app = create_router(settings, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    /// Map a core error, keeping caller mistakes as 400 with their message
    pub fn from_core(err: runway_core::Error) -> Self {
        if !err.is_user_error() {
            return Self::from(err);
        }
        match err {
            runway_core::Error::Import(msg) | runway_core::Error::InvalidData(msg) => {
                Self::bad_request(&msg)
            }
            runway_core::Error::Csv(e) => Self::bad_request(&format!("Malformed CSV: {}", e)),
            other => Self::bad_request(&other.to_string()),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
