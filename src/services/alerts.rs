//! Alert notifier: logs timer cues and fans them out to subscribers

use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::timer::{Notifier, TimerEvent};

/// Forwards every cue to a broadcast channel so connected displays can play
/// the sound or show the alert themselves
#[derive(Debug, Clone)]
pub struct AlertNotifier {
    event_tx: broadcast::Sender<TimerEvent>,
}

impl AlertNotifier {
    pub fn new(event_tx: broadcast::Sender<TimerEvent>) -> Self {
        Self { event_tx }
    }

    fn publish(&self, event: TimerEvent) {
        // no listeners is normal when nobody has the display open
        if let Err(e) = self.event_tx.send(event) {
            debug!("No subscribers for timer event: {}", e);
        }
    }
}

impl Notifier for AlertNotifier {
    fn on_interval_cue(&mut self) {
        info!("Beep: interval cue");
        self.publish(TimerEvent::IntervalCue);
    }

    fn on_round_advanced(&mut self, round: u32, total: u32) {
        info!("Beep: round {}/{}", round, total);
        self.publish(TimerEvent::RoundAdvanced { round, total });
    }

    fn on_completed(&mut self) {
        info!("Timer complete, great work!");
        self.publish(TimerEvent::Completed);
    }
}
