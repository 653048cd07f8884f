//! Workout Timer - A multi-mode interval timer served over local HTTP
//!
//! This library provides the timer core (stopwatch, countdown, EMOM, AMRAP and
//! Tabata), the tick task that drives it, and the HTTP surface display clients
//! bind to.

pub mod config;
pub mod timer;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;
pub use api::create_router;
pub use timer::{TimerEngine, TimerMode, TimerState};
pub use utils::signals::shutdown_signal;
