//! Serializable view of the whole tracker

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot returned by `GET /status` and embedded in command responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// `idle`, `active` or `paused`
    pub state: String,
    /// Project of the running or paused session
    pub tracked_project: Option<String>,
    /// Project the host currently has open
    pub current_project: Option<String>,
    /// Stored total plus the running session, for the shown project
    pub total_seconds: u64,
    pub display: String,
    pub timer_running: bool,
    pub auto_start: bool,
    pub auto_start_indicator: String,
    pub auto_start_tooltip: String,
    pub inactivity_timeout_minutes: u32,
    pub idle_alarm_at: Option<DateTime<Utc>>,
    pub last_activity_at: Option<DateTime<Utc>>,
    pub uptime: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}
