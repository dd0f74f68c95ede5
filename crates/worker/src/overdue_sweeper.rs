//! Periodic overdue detection.
//!
//! Calls [`JourneyEngine::check_overdue_phases`] on a fixed interval using
//! `tokio::time::interval`. A failed sweep is logged and retried on the next
//! tick; the engine only marks each phase once, so overlapping or repeated
//! sweeps are harmless.

use std::sync::Arc;
use std::time::Duration;

use skill_loop_journey::{EngineResult, JourneyEngine};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

pub struct OverdueSweeper {
    engine: Arc<JourneyEngine>,
    interval: Duration,
    run_on_start: bool,
}

impl OverdueSweeper {
    pub fn new(engine: Arc<JourneyEngine>, interval: Duration, run_on_start: bool) -> Self {
        Self {
            engine,
            interval,
            run_on_start,
        }
    }

    /// Run one sweep and return how many phases were marked overdue.
    pub async fn sweep_once(&self) -> EngineResult<usize> {
        self.engine.check_overdue_phases().await
    }

    /// Sweep on every tick until `cancel` is triggered.
    pub async fn run(self, cancel: CancellationToken) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            run_on_start = self.run_on_start,
            "Overdue sweeper started"
        );

        let first_tick = if self.run_on_start {
            Instant::now()
        } else {
            Instant::now() + self.interval
        };
        let mut interval = tokio::time::interval_at(first_tick, self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Overdue sweeper stopping");
                    break;
                }
                _ = interval.tick() => {
                    match self.sweep_once().await {
                        Ok(0) => tracing::debug!("Overdue sweep: nothing marked"),
                        Ok(marked) => tracing::info!(marked, "Overdue sweep: phases marked overdue"),
                        Err(e) => tracing::error!(error = %e, "Overdue sweep failed"),
                    }
                }
            }
        }
    }
}
