//! Click ingress: bounded queue between HTTP handlers and the scheduler.
//!
//! DESIGN
//! ======
//! Handlers enqueue with `try_send` so a request never waits on the
//! scheduler. A full queue rejects the click; the canvas is untouched
//! either way.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::warn;

/// Largest queue `channel` will build; larger requests are clamped to it.
pub const MAX_CLICK_QUEUE_CAPACITY: usize = 65_536;

/// A click carries no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Click;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IngressError {
    #[error("click queue full (capacity {capacity})")]
    Full { capacity: usize },
    #[error("click queue closed")]
    Closed,
}

/// Sending half, cloned into every handler.
#[derive(Debug, Clone)]
pub struct ClickIngress {
    tx: mpsc::Sender<Click>,
}

/// Create the ingress and the receiver the scheduler drains.
#[must_use]
pub fn channel(capacity: usize) -> (ClickIngress, mpsc::Receiver<Click>) {
    let (tx, rx) = mpsc::channel(capacity.clamp(1, MAX_CLICK_QUEUE_CAPACITY));
    (ClickIngress { tx }, rx)
}

impl ClickIngress {
    /// Non-blocking enqueue of one click.
    pub fn click(&self) -> Result<(), IngressError> {
        match self.tx.try_send(Click) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                let capacity = self.tx.max_capacity();
                warn!(capacity, "click queue full; rejecting click");
                Err(IngressError::Full { capacity })
            }
            Err(TrySendError::Closed(_)) => {
                warn!("click queue closed; dropping click");
                Err(IngressError::Closed)
            }
        }
    }

    /// Clicks currently waiting for the scheduler.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }
}

#[cfg(test)]
#[path = "ingress_test.rs"]
mod tests;
