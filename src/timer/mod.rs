//! Interval timer core
//!
//! Modes, state, the per-mode tick policy, the engine that applies it, and the
//! preset catalog. Nothing in here knows about tasks, channels or HTTP.

pub mod mode;
pub mod state;
pub mod policy;
pub mod engine;
pub mod presets;

// Re-export main types
pub use mode::TimerMode;
pub use state::{Split, TimerSnapshot, TimerState};
pub use policy::{next_state, TimerEvent};
pub use engine::{Notifier, SilentNotifier, TimerEngine};
pub use presets::{catalog, find_preset, instantiate, PresetDefinition};
