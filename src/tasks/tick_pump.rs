//! Tick pump background task

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::{clock::Tick, state::AppState};

/// Background task that delivers clock ticks to the session controller, one
/// at a time and in order
pub async fn tick_pump_task(state: Arc<AppState>, mut ticks: mpsc::UnboundedReceiver<Tick>) {
    info!("Starting tick pump task");

    while let Some(tick) = ticks.recv().await {
        if let Err(e) = state.handle_tick(tick) {
            error!("Failed to process tick: {}", e);
        }
    }

    info!("Tick channel closed, tick pump stopped");
}
