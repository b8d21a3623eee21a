//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! Handlers read the canvas through the shared lock and send clicks through
//! the ingress; only the scheduler writes to the canvas.

use crate::canvas::SharedCanvas;
use crate::services::ingress::ClickIngress;

/// Clone is required by Axum; both fields are cheap handles.
#[derive(Clone)]
pub struct AppState {
    pub canvas: SharedCanvas,
    pub ingress: ClickIngress,
}

impl AppState {
    #[must_use]
    pub fn new(canvas: SharedCanvas, ingress: ClickIngress) -> Self {
        Self { canvas, ingress }
    }
}

#[cfg(test)]
#[path = "state_helpers_test.rs"]
pub mod test_helpers;
