//! The tracking state machine
//!
//! `TrackingService` is the single owner of the current session, the project
//! records and the activity monitor. Every operation takes the current
//! instant from the caller; nothing in here reads the clock.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    error::{TrackerError, TrackerResult},
    utils::format_clock,
};

use super::{
    monitor::{ActivityMonitor, ActivitySource, IdleAlarm},
    presenter::Presenter,
    store::{DurationStore, ProjectRecord},
};

/// Current tracking session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackingState {
    Idle,
    Active {
        project: String,
        started_at: DateTime<Utc>,
    },
    /// Stopped by the idle alarm; resumes on the next activity signal.
    PausedForInactivity { project: String },
}

impl TrackingState {
    pub fn project(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Active { project, .. } | Self::PausedForInactivity { project } => Some(project),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, Self::PausedForInactivity { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Active { .. } => "active",
            Self::PausedForInactivity { .. } => "paused",
        }
    }
}

/// Result of a successful transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "transition", rename_all = "snake_case")]
pub enum Outcome {
    Started {
        project: String,
        total_seconds: u64,
    },
    Stopped {
        project: String,
        elapsed_seconds: u64,
        total_seconds: u64,
    },
    Paused {
        project: String,
        elapsed_seconds: u64,
        total_seconds: u64,
    },
    Resumed {
        project: String,
        total_seconds: u64,
    },
    Reset {
        project: String,
    },
}

impl Outcome {
    /// User-facing notification text
    pub fn message(&self) -> String {
        match self {
            Self::Started { project, .. } => format!("Time tracking started at \"{}\".", project),
            Self::Stopped { total_seconds, .. } => format!(
                "Stopped time tracking. Total time: {}.",
                format_clock(*total_seconds)
            ),
            Self::Paused { project, .. } => {
                format!("Time tracking for \"{}\" paused due to inactivity.", project)
            }
            Self::Resumed { project, .. } => {
                format!("Time tracking for \"{}\" resumed.", project)
            }
            Self::Reset { project } => {
                format!("Total time for project \"{}\" has been reset to zero.", project)
            }
        }
    }
}

/// What a session-ending transition flushed into the store
struct Flushed {
    project: String,
    elapsed_seconds: u64,
    total_seconds: u64,
}

/// Whole seconds between two instants, rounded half-up. Clock skew that
/// puts `end` before `start` counts as zero.
pub fn elapsed_seconds(start: DateTime<Utc>, end: DateTime<Utc>) -> u64 {
    let millis = end.signed_duration_since(start).num_milliseconds().max(0);
    u64::try_from((millis + 500) / 1000).unwrap_or(0)
}

pub struct TrackingService {
    state: TrackingState,
    store: DurationStore,
    monitor: ActivityMonitor,
    presenter: Box<dyn Presenter>,
}

impl TrackingService {
    pub fn new(store: DurationStore, monitor: ActivityMonitor, presenter: Box<dyn Presenter>) -> Self {
        Self {
            state: TrackingState::Idle,
            store,
            monitor,
            presenter,
        }
    }

    /// Show the stored total for `project` and start tracking it when
    /// `auto_start` is set.
    pub fn init(
        &mut self,
        project: Option<&str>,
        auto_start: bool,
        now: DateTime<Utc>,
    ) -> TrackerResult<Option<Outcome>> {
        let stored = project.and_then(|p| self.store.total_for(p)).unwrap_or(0);
        self.presenter.update_time(stored);

        match project {
            Some(project) if auto_start => {
                info!("Auto-start enabled, tracking \"{}\"", project);
                self.start(project, now).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Flush a running session and cancel all alarms.
    pub fn shutdown(&mut self, now: DateTime<Utc>) -> TrackerResult<Option<Outcome>> {
        let outcome = if self.state.is_idle() {
            None
        } else {
            Some(self.stop(now)?)
        };
        self.monitor.disarm();
        Ok(outcome)
    }

    pub fn state(&self) -> &TrackingState {
        &self.state
    }

    pub fn records(&self) -> &[ProjectRecord] {
        self.store.records()
    }

    pub fn total_for(&self, project: &str) -> Option<u64> {
        self.store.total_for(project)
    }

    /// Stored total plus the running session's elapsed time, if it is for `project`.
    pub fn live_total(&self, project: &str, now: DateTime<Utc>) -> u64 {
        let stored = self.store.total_for(project).unwrap_or(0);
        match &self.state {
            TrackingState::Active { project: p, started_at } if p == project => {
                stored.saturating_add(elapsed_seconds(*started_at, now))
            }
            _ => stored,
        }
    }

    pub fn monitor(&self) -> &ActivityMonitor {
        &self.monitor
    }

    pub fn subscribe_alarms(&self) -> watch::Receiver<Option<IdleAlarm>> {
        self.monitor.subscribe()
    }

    pub fn start(&mut self, project: &str, now: DateTime<Utc>) -> TrackerResult<Outcome> {
        if let Some(current) = self.state.project() {
            warn!("Start requested while already tracking \"{}\"", current);
            return Err(TrackerError::AlreadyTracking(current.to_string()));
        }

        let total_seconds = self.begin_session(project, now);
        self.presenter.start_timer(total_seconds);

        info!("Started tracking \"{}\" (stored total {}s)", project, total_seconds);
        Ok(Outcome::Started {
            project: project.to_string(),
            total_seconds,
        })
    }

    pub fn stop(&mut self, now: DateTime<Utc>) -> TrackerResult<Outcome> {
        let Some(flushed) = self.end_session(now, false) else {
            warn!("Stop requested while not tracking");
            return Err(TrackerError::NotTracking);
        };

        self.presenter.update_time(flushed.total_seconds);
        self.presenter.stop_timer();
        self.store
            .upsert_and_persist(&flushed.project, flushed.total_seconds)?;

        info!(
            "Stopped tracking \"{}\" after {}s (total {}s)",
            flushed.project, flushed.elapsed_seconds, flushed.total_seconds
        );
        Ok(Outcome::Stopped {
            project: flushed.project,
            elapsed_seconds: flushed.elapsed_seconds,
            total_seconds: flushed.total_seconds,
        })
    }

    /// Start when idle, stop otherwise.
    pub fn toggle(&mut self, project: &str, now: DateTime<Utc>) -> TrackerResult<Outcome> {
        if self.state.is_idle() {
            let total_seconds = self.begin_session(project, now);
            self.presenter.toggle_tracking(total_seconds);

            info!("Toggled tracking on for \"{}\"", project);
            return Ok(Outcome::Started {
                project: project.to_string(),
                total_seconds,
            });
        }

        let Some(flushed) = self.end_session(now, false) else {
            return Err(TrackerError::NotTracking);
        };

        self.presenter.update_time(flushed.total_seconds);
        if self.presenter.is_running() {
            self.presenter.toggle_tracking(flushed.total_seconds);
        }
        self.store
            .upsert_and_persist(&flushed.project, flushed.total_seconds)?;

        info!(
            "Toggled tracking off for \"{}\" after {}s",
            flushed.project, flushed.elapsed_seconds
        );
        Ok(Outcome::Stopped {
            project: flushed.project,
            elapsed_seconds: flushed.elapsed_seconds,
            total_seconds: flushed.total_seconds,
        })
    }

    /// Zero the stored total. A running session keeps its start instant.
    pub fn reset(&mut self, project: &str) -> TrackerResult<Outcome> {
        if self.store.get(project).is_none() {
            warn!("Reset requested for unknown project \"{}\"", project);
            return Err(TrackerError::UnknownProject(project.to_string()));
        }

        if self.state.project().map_or(true, |p| p == project) {
            self.presenter.update_time(0);
        }
        self.store.upsert_and_persist(project, 0)?;

        info!("Reset total for \"{}\"", project);
        Ok(Outcome::Reset {
            project: project.to_string(),
        })
    }

    /// Flush the running session and wait for activity.
    pub fn pause_for_inactivity(&mut self, now: DateTime<Utc>) -> TrackerResult<Outcome> {
        if !self.state.is_active() {
            return Err(TrackerError::NotTracking);
        }

        let Some(flushed) = self.end_session(now, true) else {
            return Err(TrackerError::NotTracking);
        };

        self.presenter.update_time(flushed.total_seconds);
        self.presenter.stop_timer();
        self.store
            .upsert_and_persist(&flushed.project, flushed.total_seconds)?;

        info!(
            "Paused \"{}\" for inactivity after {}s",
            flushed.project, flushed.elapsed_seconds
        );
        Ok(Outcome::Paused {
            project: flushed.project,
            elapsed_seconds: flushed.elapsed_seconds,
            total_seconds: flushed.total_seconds,
        })
    }

    pub fn resume_from_inactivity(&mut self, now: DateTime<Utc>) -> TrackerResult<Outcome> {
        let TrackingState::PausedForInactivity { project } = &self.state else {
            return Err(TrackerError::NotPaused);
        };
        let project = project.clone();

        self.state = TrackingState::Idle;
        let total_seconds = self.begin_session(&project, now);
        self.presenter.start_timer(total_seconds);

        info!("Resumed \"{}\" after inactivity", project);
        Ok(Outcome::Resumed {
            project,
            total_seconds,
        })
    }

    /// Any activity signal. Resumes a paused session.
    pub fn record_activity(
        &mut self,
        source: ActivitySource,
        now: DateTime<Utc>,
    ) -> TrackerResult<Option<Outcome>> {
        debug!("Activity from {:?}", source);
        self.monitor.record_activity(now);

        if self.state.is_paused() {
            return self.resume_from_inactivity(now).map(Some);
        }
        Ok(None)
    }

    /// The idle alarm with `alarm_id` went off. Alarms that were replaced or
    /// cancelled in the meantime are ignored.
    pub fn on_idle_alarm(&mut self, alarm_id: u64, now: DateTime<Utc>) -> TrackerResult<Option<Outcome>> {
        if !self.monitor.is_current(alarm_id) {
            debug!("Ignoring stale idle alarm {}", alarm_id);
            return Ok(None);
        }

        if !self.state.is_active() {
            warn!("Idle alarm fired while {}, disarming", self.state.label());
            self.monitor.disarm();
            return Ok(None);
        }

        self.pause_for_inactivity(now).map(Some)
    }

    /// Periodic check, for when no alarm task runs or an alarm was missed.
    pub fn poll_inactivity(&mut self, now: DateTime<Utc>) -> TrackerResult<Option<Outcome>> {
        if self.state.is_active() && self.monitor.idle_exceeded(now) {
            debug!("Inactivity poll found the session idle");
            return self.pause_for_inactivity(now).map(Some);
        }
        Ok(None)
    }

    /// The active project changed (or went away). Ends any session; starts
    /// the new project only when `auto_start` is set.
    ///
    /// A failed flush of the old session does not keep the new project from
    /// starting; the write error is returned once the switch is done.
    pub fn on_project_context_change(
        &mut self,
        new_project: Option<&str>,
        auto_start: bool,
        now: DateTime<Utc>,
    ) -> TrackerResult<Vec<Outcome>> {
        let mut outcomes = Vec::new();

        let flushed = if self.state.is_idle() {
            Ok(())
        } else {
            self.stop(now).map(|outcome| outcomes.push(outcome))
        };
        if let Err(e) = &flushed {
            warn!("Flushing the previous project failed: {}", e);
        }

        match new_project {
            Some(project) if auto_start => outcomes.push(self.start(project, now)?),
            Some(project) => {
                let stored = self.store.total_for(project).unwrap_or(0);
                self.presenter.update_time(stored);
            }
            None => self.presenter.update_time(0),
        }

        flushed.map(|()| outcomes)
    }

    pub fn set_inactivity_timeout(&mut self, minutes: u32, now: DateTime<Utc>) {
        info!("Inactivity timeout set to {} minutes", minutes);
        self.monitor
            .set_timeout(chrono::Duration::minutes(i64::from(minutes)), now);
    }

    fn begin_session(&mut self, project: &str, now: DateTime<Utc>) -> u64 {
        debug_assert!(self.state.is_idle());
        let total = self.store.ensure(project);
        self.state = TrackingState::Active {
            project: project.to_string(),
            started_at: now,
        };
        self.monitor.arm(now);
        total
    }

    /// End the current session and work out the new total. The caller
    /// updates the presenter, then writes the total to the store.
    fn end_session(&mut self, now: DateTime<Utc>, pause: bool) -> Option<Flushed> {
        let previous = std::mem::replace(&mut self.state, TrackingState::Idle);
        self.monitor.disarm();

        let (project, elapsed) = match previous {
            TrackingState::Idle => return None,
            TrackingState::Active { project, started_at } => {
                (project, elapsed_seconds(started_at, now))
            }
            TrackingState::PausedForInactivity { project } => (project, 0),
        };

        let total = self
            .store
            .total_for(&project)
            .unwrap_or(0)
            .saturating_add(elapsed);

        if pause {
            self.state = TrackingState::PausedForInactivity {
                project: project.clone(),
            };
        }

        Some(Flushed {
            project,
            elapsed_seconds: elapsed,
            total_seconds: total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::presenter::NullPresenter;
    use chrono::{Duration, TimeZone};
    use std::{
        fs,
        path::Path,
        sync::{Arc, Mutex},
    };
    use tempfile::TempDir;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn at_ms(millis: i64) -> DateTime<Utc> {
        at(0) + Duration::milliseconds(millis)
    }

    fn service() -> TrackingService {
        TrackingService::new(
            DurationStore::in_memory(),
            ActivityMonitor::from_minutes(5),
            Box::new(NullPresenter::default()),
        )
    }

    fn service_at(path: &Path) -> TrackingService {
        TrackingService::new(
            DurationStore::load(path),
            ActivityMonitor::from_minutes(5),
            Box::new(NullPresenter::default()),
        )
    }

    /// Store location that cannot be written: a directory sits where the
    /// file goes.
    fn blocked_store(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("projects.json");
        fs::create_dir(&path).unwrap();
        path
    }

    /// Records every presenter call for assertions
    #[derive(Clone, Default)]
    struct Calls(Arc<Mutex<Vec<String>>>);

    struct RecordingPresenter {
        calls: Calls,
        running: bool,
    }

    impl Presenter for RecordingPresenter {
        fn update_time(&mut self, seconds: u64) {
            self.calls.0.lock().unwrap().push(format!("update {seconds}"));
        }
        fn start_timer(&mut self, initial_seconds: u64) {
            self.running = true;
            self.calls.0.lock().unwrap().push(format!("start {initial_seconds}"));
        }
        fn stop_timer(&mut self) {
            self.running = false;
            self.calls.0.lock().unwrap().push("stop".to_string());
        }
        fn is_running(&self) -> bool {
            self.running
        }
    }

    fn recording_service() -> (TrackingService, Calls) {
        let calls = Calls::default();
        let presenter = RecordingPresenter {
            calls: calls.clone(),
            running: false,
        };
        let svc = TrackingService::new(
            DurationStore::in_memory(),
            ActivityMonitor::from_minutes(5),
            Box::new(presenter),
        );
        (svc, calls)
    }

    #[test]
    fn elapsed_rounds_half_up() {
        assert_eq!(elapsed_seconds(at(0), at_ms(1_499)), 1);
        assert_eq!(elapsed_seconds(at(0), at_ms(1_500)), 2);
        assert_eq!(elapsed_seconds(at(0), at_ms(499)), 0);
        assert_eq!(elapsed_seconds(at(10), at(0)), 0);
    }

    #[test]
    fn start_stop_accumulates_rounded_sessions() {
        let mut svc = service();
        let sessions = [(0, 10_400), (20_000, 21_600), (30_000, 30_499)];
        for (begin, end) in sessions {
            svc.start("proj", at_ms(begin)).unwrap();
            svc.stop(at_ms(end)).unwrap();
        }
        // 10 + 2 + 0
        assert_eq!(svc.total_for("proj"), Some(12));
        assert!(svc.state().is_idle());
    }

    #[test]
    fn double_start_is_a_harmless_warning() {
        let mut svc = service();
        svc.start("proj", at(0)).unwrap();
        let err = svc.start("proj", at(5)).unwrap_err();
        assert!(matches!(err, TrackerError::AlreadyTracking(ref p) if p == "proj"));

        let outcome = svc.stop(at(10)).unwrap();
        assert_eq!(
            outcome,
            Outcome::Stopped {
                project: "proj".into(),
                elapsed_seconds: 10,
                total_seconds: 10
            }
        );
    }

    #[test]
    fn stop_while_idle_changes_nothing() {
        let mut svc = service();
        assert!(matches!(svc.stop(at(0)), Err(TrackerError::NotTracking)));
        assert!(svc.records().is_empty());
        assert!(svc.state().is_idle());
    }

    #[test]
    fn toggle_twice_matches_start_then_stop() {
        let mut toggled = service();
        toggled.toggle("proj", at(0)).unwrap();
        toggled.toggle("proj", at(42)).unwrap();

        let mut explicit = service();
        explicit.start("proj", at(0)).unwrap();
        explicit.stop(at(42)).unwrap();

        assert_eq!(toggled.records(), explicit.records());
        assert_eq!(toggled.state(), explicit.state());
        assert_eq!(toggled.total_for("proj"), Some(42));
    }

    #[test]
    fn toggle_drives_presenter_timer() {
        let (mut svc, calls) = recording_service();
        svc.toggle("proj", at(0)).unwrap();
        svc.toggle("proj", at(3)).unwrap();
        assert_eq!(
            *calls.0.lock().unwrap(),
            vec!["start 0", "update 3", "stop"]
        );
    }

    #[test]
    fn reset_zeroes_and_later_cycles_start_from_zero() {
        let mut svc = service();
        svc.start("proj", at(0)).unwrap();
        svc.stop(at(125)).unwrap();
        assert_eq!(svc.total_for("proj"), Some(125));

        svc.reset("proj").unwrap();
        assert_eq!(svc.total_for("proj"), Some(0));

        svc.start("proj", at(200)).unwrap();
        svc.stop(at(230)).unwrap();
        assert_eq!(svc.total_for("proj"), Some(30));
    }

    #[test]
    fn reset_keeps_running_session() {
        let mut svc = service();
        svc.start("proj", at(0)).unwrap();
        svc.reset("proj").unwrap();
        assert!(svc.state().is_active());
        svc.stop(at(20)).unwrap();
        assert_eq!(svc.total_for("proj"), Some(20));
    }

    #[test]
    fn reset_unknown_project_warns() {
        let mut svc = service();
        let err = svc.reset("ghost").unwrap_err();
        assert!(matches!(err, TrackerError::UnknownProject(_)));
        assert!(svc.records().is_empty());
    }

    #[test]
    fn idle_alarm_pauses_once_and_activity_resumes_once() {
        let mut svc = service();
        svc.start("proj", at(0)).unwrap();
        let alarm = svc.monitor().pending_alarm().unwrap();
        assert_eq!(alarm.deadline, at(300));

        let paused = svc.on_idle_alarm(alarm.id, at(300)).unwrap();
        assert!(matches!(paused, Some(Outcome::Paused { elapsed_seconds: 300, .. })));
        assert!(svc.state().is_paused());
        assert!(svc.monitor().pending_alarm().is_none());

        // same alarm again, and a poll, must not pause twice
        assert_eq!(svc.on_idle_alarm(alarm.id, at(301)).unwrap(), None);
        assert_eq!(svc.poll_inactivity(at(900)).unwrap(), None);
        assert_eq!(svc.total_for("proj"), Some(300));

        let resumed = svc
            .record_activity(ActivitySource::DocumentEdit, at(1_000))
            .unwrap();
        assert!(matches!(resumed, Some(Outcome::Resumed { .. })));
        assert_eq!(
            svc.record_activity(ActivitySource::Selection, at(1_001)).unwrap(),
            None
        );

        svc.stop(at(1_060)).unwrap();
        // paused gap 300..1000 is not counted
        assert_eq!(svc.total_for("proj"), Some(360));
    }

    #[test]
    fn activity_cancels_pending_alarm() {
        let mut svc = service();
        svc.start("proj", at(0)).unwrap();
        let stale = svc.monitor().pending_alarm().unwrap();

        svc.record_activity(ActivitySource::EditorFocus, at(299))
            .unwrap();
        assert_eq!(svc.on_idle_alarm(stale.id, at(300)).unwrap(), None);
        assert!(svc.state().is_active());

        let fresh = svc.monitor().pending_alarm().unwrap();
        assert_eq!(fresh.deadline, at(599));
    }

    #[test]
    fn worked_example_with_polling() {
        let mut svc = service();
        svc.start("proj", at(0)).unwrap();
        svc.stop(at(125)).unwrap();
        assert_eq!(svc.total_for("proj"), Some(125));

        svc.reset("proj").unwrap();
        assert_eq!(svc.total_for("proj"), Some(0));

        svc.start("proj", at(200)).unwrap();
        assert_eq!(svc.poll_inactivity(at(499)).unwrap(), None);
        let outcome = svc.poll_inactivity(at(501)).unwrap();
        assert!(matches!(outcome, Some(Outcome::Paused { .. })));
        assert_eq!(svc.total_for("proj"), Some(301));
        assert_eq!(svc.poll_inactivity(at(600)).unwrap(), None);
    }

    #[test]
    fn stop_while_paused_returns_to_idle_without_adding_time() {
        let mut svc = service();
        svc.start("proj", at(0)).unwrap();
        svc.poll_inactivity(at(300)).unwrap();
        let outcome = svc.stop(at(5_000)).unwrap();
        assert!(matches!(outcome, Outcome::Stopped { elapsed_seconds: 0, total_seconds: 300, .. }));
        assert!(svc.state().is_idle());
        assert!(matches!(
            svc.resume_from_inactivity(at(5_001)),
            Err(TrackerError::NotPaused)
        ));
    }

    #[test]
    fn pause_requires_active_session() {
        let mut svc = service();
        assert!(svc.pause_for_inactivity(at(0)).is_err());
        assert_eq!(svc.poll_inactivity(at(10_000)).unwrap(), None);
    }

    #[test]
    fn timeout_change_rearms_running_session() {
        let mut svc = service();
        svc.start("proj", at(0)).unwrap();
        svc.set_inactivity_timeout(10, at(100));
        assert_eq!(svc.monitor().pending_alarm().unwrap().deadline, at(700));
    }

    #[test]
    fn context_change_flushes_without_implicit_start() {
        let mut svc = service();
        svc.start("old", at(0)).unwrap();
        let outcomes = svc
            .on_project_context_change(Some("new"), false, at(50))
            .unwrap();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(svc.total_for("old"), Some(50));
        assert!(svc.state().is_idle());
        assert!(svc.monitor().pending_alarm().is_none());
    }

    #[test]
    fn context_change_with_auto_start_tracks_new_project() {
        let mut svc = service();
        svc.start("old", at(0)).unwrap();
        svc.poll_inactivity(at(400)).unwrap();
        assert!(svc.state().is_paused());

        let outcomes = svc
            .on_project_context_change(Some("new"), true, at(500))
            .unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(svc.state().project(), Some("new"));
        assert_eq!(svc.total_for("old"), Some(400));
    }

    #[test]
    fn init_and_shutdown_lifecycle() {
        let (mut svc, calls) = recording_service();
        assert!(svc.init(Some("proj"), true, at(0)).unwrap().is_some());
        assert!(svc.state().is_active());

        let flushed = svc.shutdown(at(90)).unwrap();
        assert!(flushed.is_some());
        assert_eq!(svc.total_for("proj"), Some(90));
        assert!(svc.monitor().pending_alarm().is_none());
        assert_eq!(
            *calls.0.lock().unwrap(),
            vec!["update 0", "start 0", "update 90", "stop"]
        );
    }

    #[test]
    fn live_total_includes_running_session() {
        let mut svc = service();
        svc.start("proj", at(0)).unwrap();
        assert_eq!(svc.live_total("proj", at(61)), 61);
        assert_eq!(svc.live_total("other", at(61)), 0);
    }

    #[test]
    fn failed_stop_write_keeps_total_for_next_flush() {
        let dir = TempDir::new().unwrap();
        let path = blocked_store(&dir);
        let mut svc = service_at(&path);

        svc.start("proj", at(0)).unwrap();
        let err = svc.stop(at(125)).unwrap_err();
        assert!(matches!(err, TrackerError::PersistenceWrite { .. }));
        assert!(svc.state().is_idle());
        assert_eq!(svc.total_for("proj"), Some(125));

        fs::remove_dir(&path).unwrap();
        svc.start("proj", at(200)).unwrap();
        svc.stop(at(230)).unwrap();
        assert_eq!(DurationStore::load(&path).total_for("proj"), Some(155));
    }

    #[test]
    fn failed_pause_write_still_pauses() {
        let dir = TempDir::new().unwrap();
        let path = blocked_store(&dir);
        let mut svc = service_at(&path);

        svc.start("proj", at(0)).unwrap();
        let err = svc.pause_for_inactivity(at(300)).unwrap_err();
        assert!(matches!(err, TrackerError::PersistenceWrite { .. }));
        assert!(svc.state().is_paused());
        assert_eq!(svc.total_for("proj"), Some(300));

        fs::remove_dir(&path).unwrap();
        svc.record_activity(ActivitySource::DocumentEdit, at(400)).unwrap();
        svc.stop(at(410)).unwrap();
        assert_eq!(DurationStore::load(&path).total_for("proj"), Some(310));
    }

    #[test]
    fn context_change_auto_starts_even_when_flush_fails() {
        let dir = TempDir::new().unwrap();
        let path = blocked_store(&dir);
        let mut svc = service_at(&path);

        svc.start("old", at(0)).unwrap();
        let err = svc
            .on_project_context_change(Some("new"), true, at(60))
            .unwrap_err();
        assert!(matches!(err, TrackerError::PersistenceWrite { .. }));
        assert_eq!(svc.total_for("old"), Some(60));
        assert!(svc.state().is_active());
        assert_eq!(svc.state().project(), Some("new"));
    }
}
