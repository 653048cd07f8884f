//! Main application state management

use std::{
    fmt,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use super::{ActionOutcome, SnapshotSender, TimerSession};
use crate::{
    services::AlertNotifier,
    timer::{find_preset, instantiate, Split, TimerEvent, TimerMode, TimerSnapshot, TimerState},
};

/// Why a session operation could not run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No preset or manual mode has been selected yet
    NoTimerSelected,
    UnknownPreset(String),
    Lock(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::NoTimerSelected => write!(f, "No timer selected"),
            SessionError::UnknownPreset(id) => write!(f, "Unknown preset: {}", id),
            SessionError::Lock(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<String> for SessionError {
    fn from(e: String) -> Self {
        SessionError::Lock(e)
    }
}

/// Main application state: at most one active timer session plus server metadata
#[derive(Debug)]
pub struct AppState {
    /// The active timer, if one has been selected
    pub session: Mutex<Option<TimerSession>>,
    pub tick_period: Duration,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// Cues raised by the running timer
    pub event_tx: broadcast::Sender<TimerEvent>,
    /// Latest display snapshot
    pub snapshot_tx: SnapshotSender,
    /// Keep the receiver alive to prevent channel closure
    pub _snapshot_rx: watch::Receiver<Option<TimerSnapshot>>,
}

impl AppState {
    pub fn new(port: u16, host: String, tick_period: Duration) -> Self {
        let (event_tx, _) = broadcast::channel(100);
        let (snapshot_tx, snapshot_rx) = watch::channel(None);

        Self {
            session: Mutex::new(None),
            tick_period,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            event_tx,
            snapshot_tx: Arc::new(snapshot_tx),
            _snapshot_rx: snapshot_rx,
        }
    }

    /// Replace the active session with one built from a catalog preset
    pub fn select_preset(&self, id: &str) -> Result<TimerSnapshot, SessionError> {
        let preset = find_preset(id).ok_or_else(|| SessionError::UnknownPreset(id.to_string()))?;
        info!("Selecting preset '{}' ({})", preset.name, preset.mode);
        self.select(&format!("preset:{}", id), instantiate(preset))
    }

    /// Replace the active session with a hand-picked mode
    pub fn select_manual(&self, mode: TimerMode, duration_seconds: u64) -> Result<TimerSnapshot, SessionError> {
        info!("Selecting manual {} timer ({}s)", mode, duration_seconds);
        self.select(&format!("manual:{}", mode), TimerState::manual(mode, duration_seconds))
    }

    fn select(&self, action: &str, initial: TimerState) -> Result<TimerSnapshot, SessionError> {
        let mut slot = self.lock_session()?;

        // retire the previous session (and its tick task) before the new one publishes
        if slot.take().is_some() {
            debug!("Previous timer session dropped");
        }
        let session = TimerSession::new(
            initial,
            Box::new(AlertNotifier::new(self.event_tx.clone())),
            self.tick_period,
            Arc::clone(&self.snapshot_tx),
        );
        let snapshot = session.snapshot()?;
        *slot = Some(session);
        drop(slot);

        self.record_action(action);
        Ok(snapshot)
    }

    pub fn start(&self) -> Result<ActionOutcome, SessionError> {
        self.with_session("start", |s| s.start())
    }

    pub fn pause_or_resume(&self) -> Result<ActionOutcome, SessionError> {
        self.with_session("pause", |s| s.pause_or_resume())
    }

    pub fn reset(&self) -> Result<ActionOutcome, SessionError> {
        self.with_session("reset", |s| s.reset())
    }

    pub fn adjust_by(&self, delta_seconds: i64) -> Result<ActionOutcome, SessionError> {
        self.with_session("adjust", |s| s.adjust_by(delta_seconds))
    }

    pub fn record_split(&self, label: String) -> Result<(Option<Split>, TimerSnapshot), SessionError> {
        self.with_session("split", |s| s.record_split(label))
    }

    /// Drop the active session, cancelling its tick task. Returns whether one existed.
    pub fn discard(&self) -> Result<bool, SessionError> {
        let discarded = self.lock_session()?.take().is_some();
        if discarded {
            info!("Timer session discarded");
            if self.snapshot_tx.send(None).is_err() {
                warn!("Failed to clear timer snapshot");
            }
            self.record_action("discard");
        }
        Ok(discarded)
    }

    /// Current snapshot, or `None` when no timer is selected
    pub fn get_snapshot(&self) -> Result<Option<TimerSnapshot>, SessionError> {
        match self.lock_session()?.as_ref() {
            Some(session) => Ok(Some(session.snapshot()?)),
            None => Ok(None),
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<TimerEvent> {
        self.event_tx.subscribe()
    }

    pub fn subscribe_snapshots(&self) -> watch::Receiver<Option<TimerSnapshot>> {
        self.snapshot_tx.subscribe()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    fn with_session<T, F>(&self, action: &str, f: F) -> Result<T, SessionError>
    where
        F: FnOnce(&mut TimerSession) -> Result<T, String>,
    {
        let mut slot = self.lock_session()?;
        let session = slot.as_mut().ok_or(SessionError::NoTimerSelected)?;
        let result = f(session)?;
        drop(slot);

        self.record_action(action);
        Ok(result)
    }

    fn lock_session(&self) -> Result<std::sync::MutexGuard<'_, Option<TimerSession>>, SessionError> {
        self.session
            .lock()
            .map_err(|e| SessionError::Lock(format!("Failed to lock timer session: {}", e)))
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> AppState {
        AppState::new(0, "127.0.0.1".to_string(), Duration::from_secs(1))
    }

    #[tokio::test(start_paused = true)]
    async fn test_actions_need_a_selection() {
        let state = app();
        assert_eq!(state.start().unwrap_err(), SessionError::NoTimerSelected);
        assert_eq!(state.get_snapshot().unwrap(), None);
        assert!(!state.discard().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_preset() {
        let state = app();
        assert_eq!(
            state.select_preset("nope").unwrap_err(),
            SessionError::UnknownPreset("nope".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_tabata_cues_are_broadcast() {
        let state = app();
        let mut events = state.subscribe_events();
        state.select_preset("tabata-20-10").unwrap();
        state.start().unwrap();

        tokio::time::sleep(Duration::from_millis(240_500)).await;

        let mut received = Vec::new();
        while let Ok(event) = events.try_recv() {
            received.push(event);
        }
        assert_eq!(received.iter().filter(|e| **e == TimerEvent::IntervalCue).count(), 8);
        assert_eq!(received.iter().filter(|e| matches!(e, TimerEvent::RoundAdvanced { .. })).count(), 7);
        assert_eq!(received.last(), Some(&TimerEvent::Completed));

        let snapshot = state.get_snapshot().unwrap().unwrap();
        assert!(!snapshot.state.is_running);
        assert_eq!(snapshot.state.current_round, 8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_selection_replaces_running_timer() {
        let state = app();
        state.select_manual(TimerMode::Stopwatch, 0).unwrap();
        state.start().unwrap();
        let old_engine = state.session.lock().unwrap().as_ref().unwrap().engine();

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        state.select_preset("rest-90s").unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(old_engine.lock().unwrap().state().elapsed_or_remaining, 2);
        let snapshot = state.get_snapshot().unwrap().unwrap();
        assert_eq!(snapshot.state.mode, TimerMode::Countdown);
        assert_eq!(snapshot.state.elapsed_or_remaining, 90);
    }

    #[tokio::test(start_paused = true)]
    async fn test_discard_clears_snapshot() {
        let state = app();
        let rx = state.subscribe_snapshots();
        state.select_preset("amrap-12").unwrap();
        assert!(rx.borrow().is_some());

        assert!(state.discard().unwrap());
        assert!(rx.borrow().is_none());
        assert_eq!(state.get_last_action().0.as_deref(), Some("discard"));
    }
}
