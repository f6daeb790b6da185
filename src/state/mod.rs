//! State management module
//!
//! The shared application state, the status display it drives and the
//! snapshot it reports.

pub mod app_state;
pub mod display;
pub mod status;

// Re-export main types
pub use app_state::{AppState, HistoryOptions};
pub use display::{DisplayState, StatusDisplay};
pub use status::StatusSnapshot;
