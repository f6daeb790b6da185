//! Main application state management
//!
//! `AppState` is the boundary between the outside world (HTTP commands,
//! background tasks) and the tracking service. It resolves the current
//! project once per call and hands it to the service explicitly.

use std::{
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
    time::Instant,
};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::{
    config::Config,
    error::{TrackerError, TrackerResult},
    settings::{parse_timeout_minutes, Settings, SettingsStore},
    tracking::{
        ActivityMonitor, ActivitySource, DurationStore, IdleAlarm, Outcome, ProjectRecord,
        TrackingService,
    },
};

use super::{display::StatusDisplay, status::StatusSnapshot};

/// Everything a transition needs, behind one lock so transitions never
/// interleave.
struct TrackerContext {
    tracker: TrackingService,
    current_project: Option<String>,
}

impl TrackerContext {
    fn require_project(&self) -> TrackerResult<String> {
        self.current_project
            .clone()
            .ok_or(TrackerError::NoActiveContext)
    }
}

/// Where the history page goes and whether to open it
#[derive(Debug, Clone, Default)]
pub struct HistoryOptions {
    pub path: Option<PathBuf>,
    pub open_in_browser: bool,
}

/// Main application state shared by handlers and tasks
pub struct AppState {
    context: Mutex<TrackerContext>,
    settings: Mutex<SettingsStore>,
    display: StatusDisplay,
    history: HistoryOptions,
    /// Kept so the alarm channel outlives any single subscriber
    alarm_rx: watch::Receiver<Option<IdleAlarm>>,
    start_time: Instant,
    last_action: Mutex<Option<(String, DateTime<Utc>)>>,
}

impl AppState {
    pub fn new(
        store: DurationStore,
        settings: SettingsStore,
        display: StatusDisplay,
        current_project: Option<String>,
        history: HistoryOptions,
    ) -> Self {
        let monitor = ActivityMonitor::from_minutes(settings.get().inactivity_timeout_minutes);
        let tracker = TrackingService::new(store, monitor, Box::new(display.clone()));
        Self::with_tracker(tracker, settings, display, current_project, history)
    }

    /// Build around an existing tracker. Tests use this to pick short timeouts.
    pub fn with_tracker(
        tracker: TrackingService,
        settings: SettingsStore,
        display: StatusDisplay,
        current_project: Option<String>,
        history: HistoryOptions,
    ) -> Self {
        display.set_auto_start(settings.get().auto_start_on_open);
        let alarm_rx = tracker.subscribe_alarms();

        Self {
            context: Mutex::new(TrackerContext {
                tracker,
                current_project,
            }),
            settings: Mutex::new(settings),
            display,
            history,
            alarm_rx,
            start_time: Instant::now(),
            last_action: Mutex::new(None),
        }
    }

    /// Migrate the legacy store, then load the store and settings named by `config`.
    pub fn open(config: &Config) -> Self {
        let store_path = config.store_path();
        if let Some(legacy) = config.legacy_store_path() {
            if let Err(e) = DurationStore::migrate(&legacy, &store_path) {
                warn!("Failed to migrate store from {}: {}", legacy.display(), e);
            }
        }

        Self::new(
            DurationStore::load(&store_path),
            SettingsStore::load(&config.settings_path()),
            StatusDisplay::new(),
            config.project.clone(),
            HistoryOptions {
                path: Some(config.history_path()),
                open_in_browser: config.open_history,
            },
        )
    }

    fn lock_context(&self) -> TrackerResult<MutexGuard<'_, TrackerContext>> {
        self.context
            .lock()
            .map_err(|_| TrackerError::StateLock("tracker"))
    }

    fn lock_settings(&self) -> TrackerResult<MutexGuard<'_, SettingsStore>> {
        self.settings
            .lock()
            .map_err(|_| TrackerError::StateLock("settings"))
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last) = self.last_action.lock() {
            *last = Some((action.to_string(), Utc::now()));
        }
    }

    /// Show the stored total and honour auto-start for the initial project.
    pub fn init(&self) -> TrackerResult<Option<Outcome>> {
        let auto_start = self.settings()?.auto_start_on_open;
        let mut ctx = self.lock_context()?;
        let project = ctx.current_project.clone();
        ctx.tracker.init(project.as_deref(), auto_start, Utc::now())
    }

    /// Flush any running session before the process exits.
    pub fn shutdown(&self) -> TrackerResult<Option<Outcome>> {
        let outcome = self.lock_context()?.tracker.shutdown(Utc::now())?;
        if let Some(outcome) = &outcome {
            info!("Flushed on shutdown: {}", outcome.message());
        }
        Ok(outcome)
    }

    pub fn start(&self) -> TrackerResult<Outcome> {
        self.record_action("start");
        let mut ctx = self.lock_context()?;
        let project = ctx.require_project()?;
        ctx.tracker.start(&project, Utc::now())
    }

    pub fn stop(&self) -> TrackerResult<Outcome> {
        self.record_action("stop");
        self.lock_context()?.tracker.stop(Utc::now())
    }

    pub fn toggle(&self) -> TrackerResult<Outcome> {
        self.record_action("toggle");
        let mut ctx = self.lock_context()?;
        let project = ctx.require_project()?;
        ctx.tracker.toggle(&project, Utc::now())
    }

    pub fn reset(&self) -> TrackerResult<Outcome> {
        self.record_action("reset");
        let mut ctx = self.lock_context()?;
        let project = ctx.require_project()?;
        ctx.tracker.reset(&project)
    }

    pub fn record_activity(&self, source: ActivitySource) -> TrackerResult<Option<Outcome>> {
        self.lock_context()?
            .tracker
            .record_activity(source, Utc::now())
    }

    pub fn fire_idle_alarm(&self, alarm_id: u64) -> TrackerResult<Option<Outcome>> {
        self.lock_context()?
            .tracker
            .on_idle_alarm(alarm_id, Utc::now())
    }

    pub fn poll_inactivity(&self) -> TrackerResult<Option<Outcome>> {
        self.lock_context()?.tracker.poll_inactivity(Utc::now())
    }

    /// The host switched to `project` (or closed it).
    pub fn change_context(&self, project: Option<String>) -> TrackerResult<Vec<Outcome>> {
        self.record_action("context");
        let auto_start = self.settings()?.auto_start_on_open;

        let mut ctx = self.lock_context()?;
        info!("Project context changed to {:?}", project);
        ctx.current_project = project.clone();
        ctx.tracker
            .on_project_context_change(project.as_deref(), auto_start, Utc::now())
    }

    pub fn toggle_auto_start(&self) -> TrackerResult<bool> {
        self.record_action("auto-start");
        let enabled = self.lock_settings()?.toggle_auto_start()?;
        self.display.set_auto_start(enabled);
        Ok(enabled)
    }

    /// Validate a user-typed timeout, store it and re-arm a running session.
    pub fn configure_inactivity(&self, input: &str) -> TrackerResult<u32> {
        let minutes = parse_timeout_minutes(input)?;
        self.record_action("configure-inactivity");

        self.lock_settings()?.set_inactivity_timeout(minutes)?;
        self.lock_context()?
            .tracker
            .set_inactivity_timeout(minutes, Utc::now());
        Ok(minutes)
    }

    pub fn settings(&self) -> TrackerResult<Settings> {
        Ok(self.lock_settings()?.get().clone())
    }

    pub fn records(&self) -> TrackerResult<Vec<ProjectRecord>> {
        Ok(self.lock_context()?.tracker.records().to_vec())
    }

    pub fn current_project(&self) -> TrackerResult<Option<String>> {
        Ok(self.lock_context()?.current_project.clone())
    }

    pub fn display(&self) -> &StatusDisplay {
        &self.display
    }

    pub fn history_path(&self) -> Option<&Path> {
        self.history.path.as_deref()
    }

    pub fn open_history_in_browser(&self) -> bool {
        self.history.open_in_browser
    }

    pub fn subscribe_alarms(&self) -> watch::Receiver<Option<IdleAlarm>> {
        self.alarm_rx.clone()
    }

    pub fn status(&self) -> TrackerResult<StatusSnapshot> {
        let settings = self.settings()?;
        let display = self.display.snapshot();
        let now = Utc::now();
        let ctx = self.lock_context()?;
        let state = ctx.tracker.state();

        let shown_project = state
            .project()
            .map(str::to_string)
            .or_else(|| ctx.current_project.clone());
        let total_seconds = shown_project
            .as_deref()
            .map(|p| ctx.tracker.live_total(p, now))
            .unwrap_or(0);

        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());

        Ok(StatusSnapshot {
            state: state.label().to_string(),
            tracked_project: state.project().map(str::to_string),
            current_project: ctx.current_project.clone(),
            total_seconds,
            display: display.text(),
            timer_running: display.running,
            auto_start: settings.auto_start_on_open,
            auto_start_indicator: display.auto_start_text().to_string(),
            auto_start_tooltip: display.auto_start_tooltip().to_string(),
            inactivity_timeout_minutes: settings.inactivity_timeout_minutes,
            idle_alarm_at: ctx.tracker.monitor().pending_alarm().map(|a| a.deadline),
            last_activity_at: ctx.tracker.monitor().last_activity(),
            uptime: self.get_uptime(),
            last_action: last_action.as_ref().map(|(a, _)| a.clone()),
            last_action_time: last_action.map(|(_, t)| t),
        })
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}
