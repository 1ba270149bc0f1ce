//! Wall-clock reconciliation background task

use std::{sync::Arc, time::Duration};
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::state::AppState;

/// Background task that keeps a session moving while the tick clock is down.
///
/// Only does work in degraded mode; each pass reconciles from the wall clock
/// and retries the tick clock.
pub async fn wall_clock_reconcile_task(state: Arc<AppState>, every: Duration) {
    info!("Starting wall-clock reconciliation task");

    let mut interval = interval(every);

    loop {
        interval.tick().await;

        match state.is_degraded() {
            Ok(true) => {
                debug!("Tick clock unavailable, reconciling from wall clock");
                if let Err(e) = state.reconcile() {
                    warn!("Failed to reconcile session: {}", e);
                }
                if let Ok(false) = state.is_degraded() {
                    info!("Tick clock is running again");
                }
            }
            Ok(false) => {
                // Ticks are flowing or there is no session, nothing to do
            }
            Err(e) => {
                warn!("Failed to check clock state: {}", e);
            }
        }
    }
}
