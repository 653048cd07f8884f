//! One active timer session: the engine plus the tick subscription driving it

use std::{
    ops::ControlFlow,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, Weak,
    },
    time::Duration,
};
use tokio::sync::watch;
use tracing::{debug, error, warn};

use crate::{
    tasks::TickHandle,
    timer::{Notifier, Split, TimerEngine, TimerSnapshot, TimerState},
};

/// Shared sender for display snapshots (`None` while no timer is selected)
pub type SnapshotSender = Arc<watch::Sender<Option<TimerSnapshot>>>;

/// Result of a user action on the session
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    /// False when the action was not permitted in the current state
    pub applied: bool,
    pub snapshot: TimerSnapshot,
}

/// Owns the engine for one timer and the tick task that advances it.
///
/// The tick task only holds a weak reference to the engine, and dropping the
/// session drops its `TickHandle`, so a discarded session can never be ticked.
/// Dropping also clears `live` under the engine lock, so a tick already in
/// flight cannot publish over whatever replaced the session.
pub struct TimerSession {
    engine: Arc<Mutex<TimerEngine>>,
    live: Arc<AtomicBool>,
    ticks: Option<TickHandle>,
    tick_period: Duration,
    snapshot_tx: SnapshotSender,
}

impl TimerSession {
    /// Create a stopped session and publish its first snapshot
    pub fn new(
        initial: TimerState,
        notifier: Box<dyn Notifier>,
        tick_period: Duration,
        snapshot_tx: SnapshotSender,
    ) -> Self {
        let engine = TimerEngine::new(initial, notifier);
        publish(&snapshot_tx, engine.snapshot());

        Self {
            engine: Arc::new(Mutex::new(engine)),
            live: Arc::new(AtomicBool::new(true)),
            ticks: None,
            tick_period,
            snapshot_tx,
        }
    }

    /// Shared handle to the engine, for read access outside the session
    pub fn engine(&self) -> Arc<Mutex<TimerEngine>> {
        Arc::clone(&self.engine)
    }

    /// Whether a tick task is currently alive
    pub fn is_ticking(&self) -> bool {
        self.ticks.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn snapshot(&self) -> Result<TimerSnapshot, String> {
        self.engine
            .lock()
            .map(|engine| engine.snapshot())
            .map_err(|e| format!("Failed to lock timer engine: {}", e))
    }

    pub fn start(&mut self) -> Result<ActionOutcome, String> {
        self.apply(|engine| engine.start())
    }

    pub fn pause_or_resume(&mut self) -> Result<ActionOutcome, String> {
        self.apply(|engine| engine.pause_or_resume())
    }

    pub fn reset(&mut self) -> Result<ActionOutcome, String> {
        self.apply(|engine| {
            engine.reset();
            true
        })
    }

    pub fn adjust_by(&mut self, delta_seconds: i64) -> Result<ActionOutcome, String> {
        self.apply(|engine| engine.adjust_by(delta_seconds))
    }

    pub fn record_split(&mut self, label: String) -> Result<(Option<Split>, TimerSnapshot), String> {
        let mut engine = self.engine
            .lock()
            .map_err(|e| format!("Failed to lock timer engine: {}", e))?;

        let split = engine.record_split(label).cloned();
        let snapshot = engine.snapshot();
        drop(engine);

        publish(&self.snapshot_tx, snapshot.clone());
        Ok((split, snapshot))
    }

    /// Run a user action, then bring the tick task in line with the new state
    fn apply<F>(&mut self, action: F) -> Result<ActionOutcome, String>
    where
        F: FnOnce(&mut TimerEngine) -> bool,
    {
        let mut engine = self.engine
            .lock()
            .map_err(|e| format!("Failed to lock timer engine: {}", e))?;

        let applied = action(&mut *engine);
        let ticking = engine.state().is_ticking();
        let snapshot = engine.snapshot();
        drop(engine); // Release before touching the tick task

        if ticking {
            self.ensure_ticks();
        } else if self.ticks.take().is_some() {
            debug!("Tick source cancelled");
        }

        publish(&self.snapshot_tx, snapshot.clone());
        Ok(ActionOutcome { applied, snapshot })
    }

    fn ensure_ticks(&mut self) {
        if self.is_ticking() {
            return;
        }
        debug!("Spawning tick source every {:?}", self.tick_period);
        let engine = Arc::downgrade(&self.engine);
        let live = Arc::clone(&self.live);
        let snapshot_tx = Arc::clone(&self.snapshot_tx);
        self.ticks = Some(TickHandle::spawn(self.tick_period, move || {
            tick_engine(&engine, &live, &snapshot_tx)
        }));
    }
}

impl Drop for TimerSession {
    fn drop(&mut self) {
        // a poisoned lock still guards the engine; take it either way
        let _engine = self.engine.lock().unwrap_or_else(|e| e.into_inner());
        self.live.store(false, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for TimerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerSession")
            .field("engine", &self.engine)
            .field("ticking", &self.is_ticking())
            .field("tick_period", &self.tick_period)
            .finish()
    }
}

/// Body of the tick task. Breaks once the engine is gone or has stopped.
fn tick_engine(
    engine: &Weak<Mutex<TimerEngine>>,
    live: &AtomicBool,
    snapshot_tx: &SnapshotSender,
) -> ControlFlow<()> {
    let Some(shared) = engine.upgrade() else {
        debug!("Timer engine dropped, stopping tick source");
        return ControlFlow::Break(());
    };
    let mut engine = match shared.lock() {
        Ok(engine) => engine,
        Err(e) => {
            error!("Failed to lock timer engine on tick: {}", e);
            return ControlFlow::Break(());
        }
    };

    if !live.load(Ordering::SeqCst) || !engine.state().is_ticking() {
        return ControlFlow::Break(());
    }
    engine.on_tick();
    let still_ticking = engine.state().is_ticking();

    // publish under the lock so a concurrent drop waits for it
    publish(snapshot_tx, engine.snapshot());
    drop(engine);

    if still_ticking {
        ControlFlow::Continue(())
    } else {
        ControlFlow::Break(())
    }
}

fn publish(snapshot_tx: &SnapshotSender, snapshot: TimerSnapshot) {
    if snapshot_tx.send(Some(snapshot)).is_err() {
        warn!("Failed to publish timer snapshot: no receivers");
    }
}
