//! HTTP API for the match server.
//!
//! # Architecture
//!
//! The API is built with:
//! - **Axum**: Async web framework for HTTP
//! - **Tower**: Middleware for CORS, authentication and request ids
//! - **JWT**: Bearer tokens naming the acting player
//! - **Actor Model**: Match state owned by dedicated actor tasks
//!
//! # Modules
//!
//! - [`matches`]: Match endpoints (list, detail, history, create, join, start, turn)
//! - [`middleware`]: Authentication middleware for protected endpoints
//! - [`request_id`]: Request correlation ids
//!
//! # CORS
//!
//! CORS is configured permissively for development. In production, configure
//! appropriate origins, methods, and headers.

pub mod matches;
pub mod middleware;
pub mod request_id;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use grid_connect::{MatchManager, db::Database};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use middleware::JwtKeys;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request (cheap due to Arc wrappers).
#[derive(Clone)]
pub struct AppState {
    /// Routes requests to match actors
    pub manager: Arc<MatchManager>,
    /// Bearer token verification
    pub jwt: Arc<JwtKeys>,
    /// Connection pool, absent when matches live in memory
    pub database: Option<Database>,
}

/// Create the complete API router with all endpoints and middleware.
///
/// # Endpoint Summary
///
/// ```text
/// GET  /health                          - Health check (public)
/// GET  /api/v1/matches/waiting          - List waiting matches (public)
/// GET  /api/v1/matches/started          - List started matches (public)
/// GET  /api/v1/matches/{id}             - Match detail (public)
/// GET  /api/v1/matches/{id}/history     - Moves from ?from=k (public)
/// POST /api/v1/matches                  - Create match (auth required)
/// POST /api/v1/matches/{id}/join        - Join match (auth required)
/// POST /api/v1/matches/{id}/start       - Start match (auth required)
/// POST /api/v1/matches/{id}/turns       - Submit turn (auth required)
/// ```
pub fn create_router(state: AppState) -> Router {
    let v1_routes = create_v1_router(state.clone());

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", v1_routes)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn create_v1_router(state: AppState) -> Router<AppState> {
    // Public routes (no authentication middleware)
    let public_routes = Router::new()
        .route("/matches/waiting", get(matches::list_waiting))
        .route("/matches/started", get(matches::list_started))
        .route("/matches/{match_id}", get(matches::get_match))
        .route("/matches/{match_id}/history", get(matches::get_history));

    // Protected routes (require authentication middleware)
    let protected_routes = Router::new()
        .route("/matches", post(matches::create_match))
        .route("/matches/{match_id}/join", post(matches::join_match))
        .route("/matches/{match_id}/start", post(matches::start_match))
        .route("/matches/{match_id}/turns", post(matches::submit_turn))
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth_middleware,
        ));

    Router::new().merge(public_routes).merge(protected_routes)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when storage is reachable, `503 Service Unavailable`
/// otherwise.
///
/// ```bash
/// curl http://localhost:6969/health
/// # {"status":"healthy","database":true,"matches":{"active_count":3},...}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = match &state.database {
        Some(database) => database.health_check().await.is_ok(),
        None => true,
    };
    let active_count = state.manager.active_match_count().await;

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_healthy,
        "storage": if state.database.is_some() { "postgres" } else { "memory" },
        "matches": {
            "active_count": active_count
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
