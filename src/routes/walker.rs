//! Walker routes: click ingress and a read-only view of the walker.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Redirect, Response};
use serde::Serialize;
use tracing::info;

use crate::canvas::{Direction, Walker};
use crate::services::ingress::IngressError;
use crate::state::AppState;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct WalkerView {
    pub x: u32,
    pub y: u32,
    pub direction: Direction,
    pub color: [u8; 3],
}

impl From<Walker> for WalkerView {
    fn from(walker: Walker) -> Self {
        Self { x: walker.position.x, y: walker.position.y, direction: walker.direction, color: walker.color.0 }
    }
}

/// `POST /click`: queue one click and send the browser back to the viewer.
/// Never waits for the scheduler.
pub async fn click(State(state): State<AppState>, ConnectInfo(remote): ConnectInfo<SocketAddr>) -> Response {
    info!(%remote, pending = state.ingress.pending(), "click");
    match state.ingress.click() {
        Ok(()) => Redirect::to("/").into_response(),
        Err(e @ IngressError::Full { .. }) => (StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response(),
        Err(e @ IngressError::Closed) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// `GET /api/walker`: current position, direction and color.
pub async fn current(State(state): State<AppState>) -> Json<WalkerView> {
    let walker = state.canvas.read().await.walker();
    Json(walker.into())
}

#[cfg(test)]
#[path = "walker_test.rs"]
mod tests;
