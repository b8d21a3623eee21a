//! Scheduler: the single event loop that drives the walker.
//!
//! DESIGN
//! ======
//! One task selects over three sources: the click queue, the auto-randomize
//! interval and the refresh interval. Each event runs exactly one walker
//! transition under the canvas write lock, so transitions never overlap.
//! A refresh tick also clones the canvas before releasing the lock and
//! saves that copy, keeping metadata and bitmap consistent.
//!
//! When several sources are ready at once, `tokio::select!` picks one at
//! random; no ordering between them is promised.
//!
//! ERROR HANDLING
//! ==============
//! A failed save ends the loop with `SchedulerError`. The caller treats it
//! as fatal.

use std::convert::Infallible;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::canvas::SharedCanvas;
use crate::services::ingress::Click;
use crate::services::persistence::{PersistError, SnapshotStore};
use crate::walker::{self, StepOutcome};

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("snapshot save failed: {0}")]
    Save(#[from] PersistError),
}

/// Timer periods for the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub refresh: Duration,
    pub auto_randomize: Duration,
}

/// Spawn the scheduler task. The handle resolves only on a fatal error.
pub fn spawn_scheduler(
    canvas: SharedCanvas,
    clicks: mpsc::Receiver<Click>,
    store: SnapshotStore,
    schedule: Schedule,
) -> JoinHandle<Result<Infallible, SchedulerError>> {
    let rng = StdRng::from_rng(&mut rand::rng());
    tokio::spawn(run_scheduler(canvas, clicks, store, schedule, rng))
}

/// Run the loop until a save fails.
pub async fn run_scheduler(
    canvas: SharedCanvas,
    mut clicks: mpsc::Receiver<Click>,
    store: SnapshotStore,
    schedule: Schedule,
    mut rng: StdRng,
) -> Result<Infallible, SchedulerError> {
    info!(
        refresh_ms = schedule.refresh.as_millis(),
        auto_randomize_ms = schedule.auto_randomize.as_millis(),
        "scheduler started"
    );

    let mut refresh = ticker(schedule.refresh);
    let mut auto = ticker(schedule.auto_randomize);
    let mut clicks_open = true;

    loop {
        tokio::select! {
            click = clicks.recv(), if clicks_open => {
                if click.is_some() {
                    let mut guard = canvas.write().await;
                    walker::randomize_manual(&mut guard, &mut rng);
                    debug!(direction = ?guard.direction, color = ?guard.color.0, "click applied");
                } else {
                    // EDGE: every sender dropped; timers keep running.
                    clicks_open = false;
                    info!("click queue closed");
                }
            }
            _ = auto.tick() => {
                let mut guard = canvas.write().await;
                walker::randomize_auto(&mut guard, &mut rng);
                debug!(direction = ?guard.direction, "auto randomize");
            }
            _ = refresh.tick() => {
                let snapshot = {
                    let mut guard = canvas.write().await;
                    if let StepOutcome::Bounced(direction) = walker::step(&mut guard) {
                        debug!(x = guard.position.x, y = guard.position.y, ?direction, "bounced");
                    }
                    (*guard).clone()
                };
                store.save(snapshot).await?;
            }
        }
    }
}

/// Interval whose first tick is one full period away.
fn ticker(period: Duration) -> Interval {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod tests;
