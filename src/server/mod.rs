//! HTTP/WebSocket server exposing the research workflow
//!
//! Every workflow field lives in an explicit server-side session that
//! each request handler loads, mutates and writes back, so clients can
//! rebuild their entire view from any single response.

mod auth;
mod events;
pub mod routes;
mod sessions;
mod state;

pub use auth::{generate_auth_token, AuthLayer, AuthState};
pub use events::{EventBroadcaster, ServerEvent};
pub use sessions::SessionStore;
pub use state::ServerAppState;

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue,
    },
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

/// Build the full application router with auth and CORS layers applied
pub fn build_router(state: ServerAppState, cors_origins: Option<Vec<String>>) -> Router {
    // CORS must be the outermost layer so preflight OPTIONS requests are
    // handled before the auth check. Explicit headers instead of Any to
    // avoid browser deprecation warnings with Authorization.
    let cors = match &cors_origins {
        Some(origins) if !origins.is_empty() => {
            let allowed_origins: Vec<HeaderValue> =
                origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods(Any)
                .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT])
        }
        _ => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]),
    };

    Router::new()
        .route("/api/login", post(routes::auth_routes::login))
        .route("/api/sessions", post(routes::session_routes::create_session))
        .route("/api/sessions/:id", get(routes::session_routes::get_session))
        .route(
            "/api/sessions/:id/reset",
            post(routes::session_routes::reset_session),
        )
        .route(
            "/api/sessions/:id/plan",
            post(routes::workflow_routes::generate_plan),
        )
        .route(
            "/api/sessions/:id/tasks/select",
            post(routes::workflow_routes::select_tasks),
        )
        .route(
            "/api/sessions/:id/research",
            post(routes::workflow_routes::start_research),
        )
        .route(
            "/api/sessions/:id/analyze",
            post(routes::workflow_routes::run_analysis),
        )
        .route("/ws/events", get(events::ws_handler))
        .route("/health", get(health_handler))
        .layer(AuthLayer::new(state.auth.clone()))
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP/WebSocket server until the process is stopped
pub async fn run_server(
    port: u16,
    bind: &str,
    state: ServerAppState,
    cors_origins: Option<Vec<String>>,
) -> Result<(), String> {
    let outputs_dir = state.workflow.artifacts.root().display().to_string();
    let app = build_router(state, cors_origins);

    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .map_err(|e| format!("Invalid address: {}", e))?;

    println!("Dealdesk listening on http://{}", addr);
    println!("  artifacts -> {}", outputs_dir);
    println!("  POST /api/login with the app password to get a token");

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind {}: {}", addr, e))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| format!("Server error: {}", e))
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
