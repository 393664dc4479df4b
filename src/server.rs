//! Runtime configuration server.
//!
//! The frontend is built once and deployed behind arbitrary hosts, so the
//! backend URL cannot be baked in. Instead the browser asks this server at
//! startup, and the answer is resolved per request.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/config` | `{ "apiUrl": "..." }` for the calling browser |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Resolution order
//!
//! 1. The environment override (`API_URL` by default), when non-empty.
//! 2. `X-Forwarded-Proto` (default `http`) plus `X-Forwarded-Host` or
//!    `Host`. A host without a port gets `server.default_api_port` (8899).
//! 3. `server.fallback_api_url`.
//!
//! # Error contract
//!
//! Unknown routes answer with
//!
//! ```json
//! { "error": { "code": "not_found", "message": "no route for /nope" } }
//! ```

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{Config, ServerConfig};

/// Shared state for the route handlers.
#[derive(Clone)]
pub struct AppState {
    server: Arc<ServerConfig>,
    /// Value of the override variable captured at startup.
    env_override: Option<String>,
}

impl AppState {
    pub fn new(server: ServerConfig, env_override: Option<String>) -> Self {
        Self {
            server: Arc::new(server),
            env_override,
        }
    }

    /// Capture the override variable named in `server.api_url_env`.
    pub fn from_env(server: ServerConfig) -> Self {
        let env_override = std::env::var(&server.api_url_env).ok();
        Self::new(server, env_override)
    }
}

/// Starts the runtime configuration server.
///
/// Binds to `[server].bind` and runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let state = AppState::from_env(config.server.clone());
    if state.env_override.is_some() {
        tracing::info!(var = %config.server.api_url_env, "API URL override present");
    }

    let app = build_router(state);

    tracing::info!(addr = %bind_addr, "runtime config server listening");
    println!("Runtime config server listening on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/config", get(handle_config))
        .route("/health", get(handle_health))
        .fallback(handle_fallback)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Resolve the API URL for one request. Pure; see the module docs for order.
pub fn resolve_api_url(
    env_override: Option<&str>,
    headers: &HeaderMap,
    server: &ServerConfig,
) -> String {
    if let Some(url) = env_override.map(str::trim).filter(|u| !u.is_empty()) {
        return url.trim_end_matches('/').to_string();
    }

    let host = first_header_value(headers, "x-forwarded-host")
        .or_else(|| first_header_value(headers, "host"));
    if let Some(host) = host {
        let proto = first_header_value(headers, "x-forwarded-proto")
            .unwrap_or_else(|| "http".to_string());
        return if has_port(&host) {
            format!("{}://{}", proto, host)
        } else {
            format!("{}://{}:{}", proto, host, server.default_api_port)
        };
    }

    server.fallback_api_url.clone()
}

/// First entry of a possibly comma-separated proxy header.
fn first_header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(name)?.to_str().ok()?;
    let first = raw.split(',').next()?.trim();
    if first.is_empty() {
        None
    } else {
        Some(first.to_string())
    }
}

fn has_port(host: &str) -> bool {
    // Bracketed IPv6 literal: only a colon after `]` introduces a port.
    if let Some(end) = host.rfind(']') {
        return host[end..].contains(':');
    }
    host.contains(':')
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

async fn handle_fallback(uri: Uri) -> AppError {
    not_found(format!("no route for {}", uri.path()))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /config ============

#[derive(Serialize)]
struct RuntimeConfigResponse {
    #[serde(rename = "apiUrl")]
    api_url: String,
}

async fn handle_config(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<RuntimeConfigResponse> {
    let api_url = resolve_api_url(state.env_override.as_deref(), &headers, &state.server);
    tracing::debug!(api_url = %api_url, "resolved runtime API URL");
    Json(RuntimeConfigResponse { api_url })
}
