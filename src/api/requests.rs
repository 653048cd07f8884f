//! API request bodies

use serde::{Deserialize, Serialize};

use crate::timer::TimerMode;

/// Body of POST /timer/manual
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualRequest {
    pub mode: TimerMode,
    #[serde(default)]
    pub duration_seconds: u64,
}

/// Body of POST /timer/adjust
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustRequest {
    pub delta_seconds: i64,
}

/// Body of POST /timer/split
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitRequest {
    pub label: String,
}
