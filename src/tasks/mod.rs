//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod display_ticker;
pub mod idle_alarm;
pub mod inactivity_poll;

// Re-export main functions
pub use display_ticker::display_ticker_task;
pub use idle_alarm::idle_alarm_task;
pub use inactivity_poll::inactivity_poll_task;
