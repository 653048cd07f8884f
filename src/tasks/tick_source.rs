//! Periodic tick task with a scoped lifetime

use std::{ops::ControlFlow, time::Duration};
use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::debug;

/// Handle to a running tick task. Dropping it cancels the task.
#[derive(Debug)]
pub struct TickHandle {
    handle: JoinHandle<()>,
}

impl TickHandle {
    /// Call `on_tick` once per `period`, first after one full period.
    ///
    /// Each call runs to completion before the next tick is taken; ticks that
    /// fall behind are skipped rather than delivered in a burst. The task ends
    /// when `on_tick` returns `ControlFlow::Break`.
    pub fn spawn<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                if on_tick().is_break() {
                    debug!("Tick source finished");
                    break;
                }
            }
        });

        Self { handle }
    }

    /// Whether the task has stopped on its own
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
