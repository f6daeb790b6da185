//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    state::StatusSnapshot,
    tracking::{ActivitySource, Outcome},
};

/// Response for every command endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    /// `ok`, `warning` or `error`
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<Outcome>,
    pub tracking: StatusSnapshot,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: &str, message: String, tracking: StatusSnapshot) -> Self {
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            transitions: Vec::new(),
            tracking,
        }
    }

    pub fn ok(message: String, tracking: StatusSnapshot) -> Self {
        Self::new("ok", message, tracking)
    }

    pub fn warning(message: String, tracking: StatusSnapshot) -> Self {
        Self::new("warning", message, tracking)
    }

    pub fn error(message: String, tracking: StatusSnapshot) -> Self {
        Self::new("error", message, tracking)
    }

    pub fn with_transitions(mut self, transitions: Vec<Outcome>) -> Self {
        self.transitions = transitions;
        self
    }
}

/// Body of `POST /activity`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityRequest {
    #[serde(default)]
    pub source: ActivitySource,
}

/// Body of `POST /context`
#[derive(Debug, Clone, Deserialize)]
pub struct ContextRequest {
    pub project: Option<String>,
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
