//! Display contract driven by the tracking service

/// Receives the authoritative total after every transition.
///
/// Implementations may keep a local copy of the seconds and advance it on
/// their own while a timer runs, but every call here overwrites that copy.
pub trait Presenter: Send {
    fn update_time(&mut self, seconds: u64);

    fn start_timer(&mut self, initial_seconds: u64);

    fn stop_timer(&mut self);

    fn is_running(&self) -> bool;

    fn toggle_tracking(&mut self, initial_seconds: u64) {
        if self.is_running() {
            self.stop_timer();
        } else {
            self.start_timer(initial_seconds);
        }
    }
}

/// Presenter that shows nothing
#[derive(Debug, Default)]
pub struct NullPresenter {
    running: bool,
}

impl Presenter for NullPresenter {
    fn update_time(&mut self, _seconds: u64) {}

    fn start_timer(&mut self, _initial_seconds: u64) {
        self.running = true;
    }

    fn stop_timer(&mut self) {
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
