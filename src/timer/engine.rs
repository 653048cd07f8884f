//! Timer engine: owns one session's state and applies user actions and ticks

use tracing::{debug, info};

use super::{next_state, Split, TimerEvent, TimerMode, TimerSnapshot, TimerState};

/// Receives the cues a running timer produces (sound, alert, haptics...)
pub trait Notifier: Send {
    fn on_interval_cue(&mut self);
    fn on_round_advanced(&mut self, round: u32, total: u32);
    fn on_completed(&mut self);
}

/// Notifier that drops every cue
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn on_interval_cue(&mut self) {}
    fn on_round_advanced(&mut self, _round: u32, _total: u32) {}
    fn on_completed(&mut self) {}
}

pub struct TimerEngine {
    state: TimerState,
    initial: TimerState,
    splits: Vec<Split>,
    notifier: Box<dyn Notifier>,
}

impl TimerEngine {
    pub fn new(initial: TimerState, notifier: Box<dyn Notifier>) -> Self {
        Self {
            state: initial.clone(),
            initial,
            splits: Vec::new(),
            notifier,
        }
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn mode(&self) -> TimerMode {
        self.state.mode
    }

    pub fn splits(&self) -> &[Split] {
        &self.splits
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot::new(&self.state, &self.splits)
    }

    /// Start counting. Returns false if the timer was already running.
    pub fn start(&mut self) -> bool {
        if self.state.is_running {
            return false;
        }
        info!("Starting {} timer at {}s", self.state.mode, self.state.elapsed_or_remaining);
        self.state.is_running = true;
        self.state.is_paused = false;
        true
    }

    /// Toggle pause. Only meaningful on a started timer.
    pub fn pause_or_resume(&mut self) -> bool {
        if !self.state.is_running {
            return false;
        }
        self.state.is_paused = !self.state.is_paused;
        info!("{} timer {}", self.state.mode, if self.state.is_paused { "paused" } else { "resumed" });
        true
    }

    /// Put the session back exactly as it was first built
    pub fn reset(&mut self) {
        info!("Resetting {} timer", self.state.mode);
        self.state = self.initial.clone();
        self.splits.clear();
    }

    /// Shift the clock of a stopped countdown-style timer, never below zero
    pub fn adjust_by(&mut self, delta_seconds: i64) -> bool {
        if !self.state.mode.counts_down() || self.state.is_running {
            debug!("Ignoring adjustment of {}s on {} timer", delta_seconds, self.state.mode);
            return false;
        }
        let current = self.state.elapsed_or_remaining;
        self.state.elapsed_or_remaining = if delta_seconds >= 0 {
            current.saturating_add(delta_seconds.unsigned_abs())
        } else {
            current.saturating_sub(delta_seconds.unsigned_abs())
        };
        debug!("Adjusted {} timer from {}s to {}s", self.state.mode, current, self.state.elapsed_or_remaining);
        true
    }

    /// Log a stopwatch split at the current elapsed time
    pub fn record_split(&mut self, label: String) -> Option<&Split> {
        if self.state.mode != TimerMode::Stopwatch {
            return None;
        }
        self.splits.push(Split {
            label,
            at_seconds: self.state.elapsed_or_remaining,
        });
        self.splits.last()
    }

    /// Advance one second. Ignored unless running and not paused.
    pub fn on_tick(&mut self) -> Vec<TimerEvent> {
        if !self.state.is_ticking() {
            return Vec::new();
        }

        let (next, events) = next_state(self.state.mode, &self.state);
        self.state = next;
        debug!("{} tick -> {}s", self.state.mode, self.state.elapsed_or_remaining);

        for event in &events {
            match *event {
                TimerEvent::IntervalCue => self.notifier.on_interval_cue(),
                TimerEvent::RoundAdvanced { round, total } => {
                    info!("Round {}/{}", round, total);
                    self.notifier.on_round_advanced(round, total);
                }
                TimerEvent::Completed => {
                    info!("{} timer completed", self.state.mode);
                    self.notifier.on_completed();
                }
            }
        }
        events
    }
}

impl std::fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerEngine")
            .field("state", &self.state)
            .field("splits", &self.splits)
            .finish_non_exhaustive()
    }
}
