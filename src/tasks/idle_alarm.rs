//! Idle alarm background task

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::state::AppState;

/// Sleeps until the pending idle alarm is due and fires it.
///
/// Every change on the alarm channel (rescheduled by activity, cancelled by
/// a stop) interrupts the sleep, so only the latest alarm can fire.
pub async fn idle_alarm_task(state: Arc<AppState>) {
    info!("Starting idle alarm task");

    let mut alarm_rx = state.subscribe_alarms();
    let mut last_fired: Option<u64> = None;

    loop {
        let pending = *alarm_rx.borrow_and_update();

        let alarm = match pending {
            Some(alarm) if last_fired != Some(alarm.id) => alarm,
            _ => {
                // Nothing armed, or this alarm was already handled
                if alarm_rx.changed().await.is_err() {
                    break;
                }
                continue;
            }
        };

        let wait = (alarm.deadline - Utc::now())
            .to_std()
            .unwrap_or(Duration::ZERO);
        debug!("Idle alarm {} due in {:?}", alarm.id, wait);

        tokio::select! {
            _ = sleep(wait) => {
                last_fired = Some(alarm.id);
                match state.fire_idle_alarm(alarm.id) {
                    Ok(Some(outcome)) => info!("{}", outcome.message()),
                    Ok(None) => debug!("Idle alarm {} was superseded", alarm.id),
                    Err(e) => error!("Failed to pause for inactivity: {}", e),
                }
            }

            changed = alarm_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                debug!("Idle alarm {} rescheduled or cancelled", alarm.id);
            }
        }
    }

    info!("Idle alarm task stopped");
}
