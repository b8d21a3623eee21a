//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The viewer page and the canvas PNG are static files served straight from
//! disk; the PNG is replaced by every save, so viewers just re-fetch it.
//! `POST /click` is the only route that reaches the walker, and it does so
//! through the click ingress.

pub mod walker;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::AppState;

/// Full router: viewer, canvas image, click and walker API.
pub fn app(state: AppState, config: &Config) -> Router {
    Router::new()
        .route_service("/", ServeFile::new(&config.index_path))
        .route_service("/pic.png", ServeFile::new(&config.pic_path))
        .route("/click", post(walker::click))
        .route("/api/walker", get(walker::current))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
