//! Timer modes

use std::fmt;
use serde::{Deserialize, Serialize};

/// The counting policy a timer session runs under.
///
/// Fixed for the lifetime of a session; switching mode means building a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    Stopwatch,
    Countdown,
    Emom,
    Amrap,
    Tabata,
}

impl TimerMode {
    /// Whether the main counter runs down towards zero
    pub fn counts_down(self) -> bool {
        !matches!(self, TimerMode::Stopwatch)
    }

    pub fn label(self) -> &'static str {
        match self {
            TimerMode::Stopwatch => "STOPWATCH",
            TimerMode::Countdown => "COUNTDOWN",
            TimerMode::Emom => "EMOM",
            TimerMode::Amrap => "AMRAP",
            TimerMode::Tabata => "TABATA",
        }
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
