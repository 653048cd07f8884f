//! Timer state and display snapshots

use serde::{Deserialize, Serialize};

use super::TimerMode;
use crate::utils::format_clock;

/// Default Tabata work interval for manually selected sessions
pub const DEFAULT_WORK_SECONDS: u64 = 20;
/// Default Tabata rest interval for manually selected sessions
pub const DEFAULT_REST_SECONDS: u64 = 10;

/// Canonical state of one timer session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub mode: TimerMode,
    /// Counts up for stopwatch, down for every other mode (Tabata: current phase)
    pub elapsed_or_remaining: u64,
    pub target_duration_seconds: u64,
    pub is_running: bool,
    pub is_paused: bool,
    pub current_round: u32,
    pub total_rounds: u32,
    /// Tabata only
    pub is_work_phase: bool,
    pub work_duration_seconds: u64,
    pub rest_duration_seconds: u64,
}

impl TimerState {
    /// Fresh stopped state for a single-counter mode.
    ///
    /// For `TimerMode::Tabata`, `target_duration_seconds` is ignored: the
    /// session runs `total_rounds` of the default 20/10 split and its target
    /// is derived from that. Use [`TimerState::tabata`] to pick the split.
    pub fn new(mode: TimerMode, target_duration_seconds: u64, total_rounds: u32) -> Self {
        if mode == TimerMode::Tabata {
            return Self::tabata(DEFAULT_WORK_SECONDS, DEFAULT_REST_SECONDS, total_rounds);
        }

        Self {
            mode,
            elapsed_or_remaining: if mode.counts_down() { target_duration_seconds } else { 0 },
            target_duration_seconds,
            is_running: false,
            is_paused: false,
            current_round: 1,
            total_rounds: total_rounds.max(1),
            is_work_phase: true,
            work_duration_seconds: DEFAULT_WORK_SECONDS,
            rest_duration_seconds: DEFAULT_REST_SECONDS,
        }
    }

    /// Fresh stopped Tabata state, opening on the first work interval
    pub fn tabata(work_seconds: u64, rest_seconds: u64, rounds: u32) -> Self {
        let rounds = rounds.max(1);
        Self {
            mode: TimerMode::Tabata,
            elapsed_or_remaining: work_seconds,
            target_duration_seconds: u64::from(rounds) * (work_seconds + rest_seconds),
            is_running: false,
            is_paused: false,
            current_round: 1,
            total_rounds: rounds,
            is_work_phase: true,
            work_duration_seconds: work_seconds,
            rest_duration_seconds: rest_seconds,
        }
    }

    /// State for a mode picked by hand rather than from the catalog
    pub fn manual(mode: TimerMode, duration_seconds: u64) -> Self {
        match mode {
            TimerMode::Tabata => {
                let cycle = DEFAULT_WORK_SECONDS + DEFAULT_REST_SECONDS;
                let rounds = u32::try_from(duration_seconds / cycle).unwrap_or(u32::MAX);
                Self::tabata(DEFAULT_WORK_SECONDS, DEFAULT_REST_SECONDS, rounds)
            }
            TimerMode::Stopwatch => Self::new(mode, 0, 1),
            _ => Self::new(mode, duration_seconds, 1),
        }
    }

    /// Whether the tick source may advance this state
    pub fn is_ticking(&self) -> bool {
        self.is_running && !self.is_paused
    }

    /// Length of what the clock is currently counting down: the whole target,
    /// or for Tabata the current work or rest interval
    pub fn phase_duration_seconds(&self) -> u64 {
        match self.mode {
            TimerMode::Tabata if self.is_work_phase => self.work_duration_seconds,
            TimerMode::Tabata => self.rest_duration_seconds,
            _ => self.target_duration_seconds,
        }
    }

    /// Fraction of the current phase left on the clock, clamped to `[0, 1]`
    pub fn progress(&self) -> f64 {
        let phase = self.phase_duration_seconds();
        if phase == 0 {
            return 0.0;
        }
        (self.elapsed_or_remaining as f64 / phase as f64).clamp(0.0, 1.0)
    }

    pub fn phase_label(&self) -> &'static str {
        match self.mode {
            TimerMode::Tabata if self.is_work_phase => "WORK",
            TimerMode::Tabata => "REST",
            mode => mode.label(),
        }
    }
}

/// A stopwatch split logged by the athlete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    pub label: String,
    pub at_seconds: u64,
}

/// Read-only view handed to display clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    #[serde(flatten)]
    pub state: TimerState,
    pub display: String,
    pub phase: String,
    pub progress: f64,
    pub splits: Vec<Split>,
}

impl TimerSnapshot {
    pub fn new(state: &TimerState, splits: &[Split]) -> Self {
        Self {
            state: state.clone(),
            display: format_clock(state.elapsed_or_remaining),
            phase: state.phase_label().to_string(),
            progress: state.progress(),
            splits: splits.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_values_per_mode() {
        let sw = TimerState::new(TimerMode::Stopwatch, 300, 1);
        assert_eq!(sw.elapsed_or_remaining, 0);

        let cd = TimerState::new(TimerMode::Countdown, 180, 1);
        assert_eq!(cd.elapsed_or_remaining, 180);
        assert!(!cd.is_running);
        assert!(!cd.is_paused);
        assert_eq!(cd.current_round, 1);
        assert!(cd.is_work_phase);
    }

    #[test]
    fn test_tabata_opens_on_work_interval() {
        let t = TimerState::tabata(20, 10, 8);
        assert_eq!(t.elapsed_or_remaining, 20);
        assert_eq!(t.target_duration_seconds, 240);
        assert_eq!(t.total_rounds, 8);
        assert_eq!(t.phase_label(), "WORK");
    }

    #[test]
    fn test_manual_tabata_rounds_from_duration() {
        let t = TimerState::manual(TimerMode::Tabata, 240);
        assert_eq!(t.total_rounds, 8);

        // shorter than one cycle still gets a full round
        let t = TimerState::manual(TimerMode::Tabata, 10);
        assert_eq!(t.total_rounds, 1);
    }

    #[test]
    fn test_manual_stopwatch_ignores_duration() {
        let sw = TimerState::manual(TimerMode::Stopwatch, 500);
        assert_eq!(sw.elapsed_or_remaining, 0);
        assert_eq!(sw.target_duration_seconds, 0);
    }

    #[test]
    fn test_progress_is_clamped() {
        let mut cd = TimerState::new(TimerMode::Countdown, 100, 1);
        assert_eq!(cd.progress(), 1.0);
        cd.elapsed_or_remaining = 25;
        assert_eq!(cd.progress(), 0.25);
        cd.elapsed_or_remaining = 400;
        assert_eq!(cd.progress(), 1.0);

        let sw = TimerState::new(TimerMode::Stopwatch, 0, 1);
        assert_eq!(sw.progress(), 0.0);
    }

    #[test]
    fn test_tabata_progress_follows_phase() {
        let mut t = TimerState::tabata(20, 10, 8);
        assert_eq!(t.progress(), 1.0);

        t.elapsed_or_remaining = 5;
        assert_eq!(t.progress(), 0.25);

        // fresh rest interval
        t.is_work_phase = false;
        t.elapsed_or_remaining = 10;
        assert_eq!(t.progress(), 1.0);
        assert_eq!(t.phase_duration_seconds(), 10);
    }

    #[test]
    fn test_new_tabata_ignores_target() {
        let t = TimerState::new(TimerMode::Tabata, 999, 4);
        assert_eq!(t, TimerState::tabata(DEFAULT_WORK_SECONDS, DEFAULT_REST_SECONDS, 4));
        assert_eq!(t.target_duration_seconds, 120);
    }

    #[test]
    fn test_snapshot_display() {
        let cd = TimerState::new(TimerMode::Amrap, 720, 1);
        let snap = TimerSnapshot::new(&cd, &[]);
        assert_eq!(snap.display, "12:00");
        assert_eq!(snap.phase, "AMRAP");
    }
}
