//! State management module
//!
//! This module holds the service-level state wrapped around the timer core:
//! the active session, its tick subscription and the notification channels.

pub mod session;
pub mod app_state;

// Re-export main types
pub use session::{ActionOutcome, SnapshotSender, TimerSession};
pub use app_state::{AppState, SessionError};
