//! Project Timer - track time spent per project from a small local daemon
//!
//! The host (an editor plugin, a shell hook, a script) reports which project
//! is open and when the user is active; the daemon keeps per-project totals,
//! pauses on inactivity and resumes on the next sign of activity.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod settings;
pub mod state;
pub mod tasks;
pub mod tracking;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::{TrackerError, TrackerResult};
pub use state::AppState;
pub use tracking::TrackingService;
pub use utils::signals::shutdown_signal;
