//! Background tasks module
//!
//! This module contains the tick source that drives running timers.

pub mod tick_source;

// Re-export main types
pub use tick_source::TickHandle;
