//! Inactivity detection
//!
//! The monitor keeps the instant of the last activity signal and at most one
//! pending idle alarm. The alarm is published on a watch channel so the
//! alarm task can sleep until its deadline; replacing or clearing the alarm
//! is how it gets cancelled.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

/// Where an activity signal came from. All sources are treated the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivitySource {
    EditorFocus,
    Selection,
    DocumentEdit,
    WindowFocus,
    #[default]
    Other,
}

/// A scheduled idle alarm. Only the alarm with the current id may fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleAlarm {
    pub id: u64,
    pub deadline: DateTime<Utc>,
}

#[derive(Debug)]
pub struct ActivityMonitor {
    timeout: Duration,
    last_activity: Option<DateTime<Utc>>,
    alarm: Option<IdleAlarm>,
    next_alarm_id: u64,
    alarm_tx: watch::Sender<Option<IdleAlarm>>,
}

impl ActivityMonitor {
    pub fn new(timeout: Duration) -> Self {
        let (alarm_tx, _) = watch::channel(None);
        Self {
            timeout,
            last_activity: None,
            alarm: None,
            next_alarm_id: 0,
            alarm_tx,
        }
    }

    pub fn from_minutes(minutes: u32) -> Self {
        Self::new(Duration::minutes(i64::from(minutes)))
    }

    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.last_activity
    }

    pub fn pending_alarm(&self) -> Option<IdleAlarm> {
        self.alarm
    }

    /// Receiver that sees every alarm change, including cancellation (`None`).
    pub fn subscribe(&self) -> watch::Receiver<Option<IdleAlarm>> {
        self.alarm_tx.subscribe()
    }

    /// Start watching a new session: counts as activity at `now` and
    /// schedules a fresh alarm, cancelling any earlier one.
    pub fn arm(&mut self, now: DateTime<Utc>) {
        self.last_activity = Some(now);
        self.schedule(now);
    }

    /// Cancel the pending alarm, if any.
    pub fn disarm(&mut self) {
        if self.alarm.take().is_some() {
            debug!("Idle alarm cancelled");
        }
        self.alarm_tx.send_replace(None);
    }

    /// Record an activity signal. An armed alarm is pushed back to
    /// `now + timeout`.
    pub fn record_activity(&mut self, now: DateTime<Utc>) {
        self.last_activity = Some(now);
        if self.alarm.is_some() {
            self.schedule(now);
        }
    }

    /// Change the timeout. An armed alarm is rescheduled from `now`, not from
    /// the last activity.
    pub fn set_timeout(&mut self, timeout: Duration, now: DateTime<Utc>) {
        self.timeout = timeout;
        if self.alarm.is_some() {
            self.schedule(now);
        }
    }

    /// Whether `alarm_id` is the alarm currently pending.
    pub fn is_current(&self, alarm_id: u64) -> bool {
        self.alarm.is_some_and(|a| a.id == alarm_id)
    }

    /// Polling check: has the last activity been at least `timeout` ago?
    pub fn idle_exceeded(&self, now: DateTime<Utc>) -> bool {
        self.last_activity
            .is_some_and(|last| now.signed_duration_since(last) >= self.timeout)
    }

    fn schedule(&mut self, now: DateTime<Utc>) {
        self.next_alarm_id += 1;
        let alarm = IdleAlarm {
            id: self.next_alarm_id,
            deadline: now + self.timeout,
        };
        self.alarm = Some(alarm);
        self.alarm_tx.send_replace(Some(alarm));
    }
}
