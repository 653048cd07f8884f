//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{Split, TimerSnapshot};

/// Response for every timer action endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: Option<TimerSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split: Option<Split>,
}

impl TimerResponse {
    pub fn new(status: String, message: String, timer: Option<TimerSnapshot>) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            timer,
            split: None,
        }
    }

    /// The action took effect
    pub fn ok(message: String, timer: TimerSnapshot) -> Self {
        Self::new("ok".to_string(), message, Some(timer))
    }

    /// The action was not allowed in the current state and changed nothing
    pub fn ignored(message: String, timer: TimerSnapshot) -> Self {
        Self::new("ignored".to_string(), message, Some(timer))
    }

    pub fn with_split(mut self, split: Split) -> Self {
        self.split = Some(split);
        self
    }
}

/// Status response with session information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: Option<TimerSnapshot>,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
