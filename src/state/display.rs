//! Status display: the running stopwatch and the auto-start indicator

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::warn;

use crate::{tracking::Presenter, utils::format_clock};

/// What the status line currently shows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DisplayState {
    pub seconds: u64,
    pub running: bool,
    pub auto_start: bool,
}

impl DisplayState {
    /// Advance the local copy by one second while running.
    pub fn tick(&mut self) {
        if self.running {
            self.seconds += 1;
        }
    }

    pub fn text(&self) -> String {
        format!("⏱︎ {}", format_clock(self.seconds))
    }

    pub fn auto_start_text(&self) -> &'static str {
        if self.auto_start {
            "▶ Auto Start"
        } else {
            "◼ Auto Start"
        }
    }

    pub fn auto_start_tooltip(&self) -> &'static str {
        if self.auto_start {
            "Auto Start enabled. Click to disable"
        } else {
            "Auto Start disabled. Click to enable"
        }
    }
}

/// Shared handle to the display. The tracking service writes through it,
/// the ticker task advances it and the status endpoint reads it.
#[derive(Debug, Clone, Default)]
pub struct StatusDisplay {
    inner: Arc<Mutex<DisplayState>>,
}

impl StatusDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> DisplayState {
        self.inner
            .lock()
            .map(|state| state.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn tick(&self) {
        self.with(DisplayState::tick);
    }

    pub fn set_auto_start(&self, enabled: bool) {
        self.with(|state| state.auto_start = enabled);
    }

    fn with(&self, f: impl FnOnce(&mut DisplayState)) {
        match self.inner.lock() {
            Ok(mut state) => f(&mut state),
            Err(e) => warn!("Failed to lock status display: {}", e),
        }
    }
}

impl Presenter for StatusDisplay {
    fn update_time(&mut self, seconds: u64) {
        self.with(|state| state.seconds = seconds);
    }

    fn start_timer(&mut self, initial_seconds: u64) {
        self.with(|state| {
            state.seconds = initial_seconds;
            state.running = true;
        });
    }

    fn stop_timer(&mut self) {
        self.with(|state| state.running = false);
    }

    fn is_running(&self) -> bool {
        self.snapshot().running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_only_while_running() {
        let mut display = StatusDisplay::new();
        display.update_time(59);
        display.tick();
        assert_eq!(display.snapshot().seconds, 59);

        display.start_timer(59);
        display.tick();
        assert_eq!(display.snapshot().text(), "⏱︎ 00:01:00");

        display.stop_timer();
        display.tick();
        assert_eq!(display.snapshot().seconds, 60);
    }

    #[test]
    fn toggle_uses_running_flag() {
        let mut display = StatusDisplay::new();
        display.toggle_tracking(10);
        assert!(display.is_running());
        display.toggle_tracking(99);
        assert!(!display.is_running());
        assert_eq!(display.snapshot().seconds, 10);
    }

    #[test]
    fn auto_start_indicator() {
        let display = StatusDisplay::new();
        assert_eq!(display.snapshot().auto_start_text(), "◼ Auto Start");
        display.set_auto_start(true);
        assert_eq!(display.snapshot().auto_start_text(), "▶ Auto Start");
    }
}
