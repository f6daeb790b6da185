//! Time tracking core
//!
//! The state machine, the inactivity monitor it drives, the record store it
//! flushes into, and the presenter contract it reports to.

pub mod monitor;
pub mod presenter;
pub mod service;
pub mod store;

pub use monitor::{ActivityMonitor, ActivitySource, IdleAlarm};
pub use presenter::{NullPresenter, Presenter};
pub use service::{elapsed_seconds, Outcome, TrackingService, TrackingState};
pub use store::{DurationStore, ProjectRecord};
