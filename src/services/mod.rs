//! Side-effecting collaborators of the timer core
//!
//! The engine only knows the `Notifier` trait; this module holds the
//! implementation the server wires in.

pub mod alerts;

// Re-export main types
pub use alerts::AlertNotifier;
