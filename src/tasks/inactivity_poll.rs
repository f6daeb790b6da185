//! Periodic inactivity check

use std::{sync::Arc, time::Duration};

use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use crate::state::AppState;

/// Compares the last activity against the timeout every `period`, as a
/// coarser second line behind the idle alarm.
pub async fn inactivity_poll_task(state: Arc<AppState>, period: Duration) {
    info!("Starting inactivity poll every {:?}", period);

    let mut interval = interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        match state.poll_inactivity() {
            Ok(Some(outcome)) => info!("{}", outcome.message()),
            Ok(None) => {}
            Err(e) => error!("Inactivity poll failed: {}", e),
        }
    }
}
