//! Once-per-second status display refresh

use std::{sync::Arc, time::Duration};

use tokio::time::interval;

use crate::state::AppState;

/// Advances the display's local copy of the seconds while its timer runs.
pub async fn display_ticker_task(state: Arc<AppState>) {
    let mut interval = interval(Duration::from_secs(1));
    // first tick completes immediately
    interval.tick().await;

    loop {
        interval.tick().await;
        state.display().tick();
    }
}
