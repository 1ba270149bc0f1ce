//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::{Advisories, SessionSnapshot};
use crate::{
    clock::Tick,
    controller::SessionController,
    services::WorkoutProvider,
    utils::format_uptime,
};

/// Main application state that owns the session controller
pub struct AppState {
    /// The single session controller; every command and tick goes through it
    pub controller: Mutex<SessionController>,
    /// Workout definitions sessions are started from
    pub library: Arc<dyn WorkoutProvider>,
    /// Notices from failed side effects
    pub advisories: Advisories,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
}

impl AppState {
    pub fn new(
        controller: SessionController,
        library: Arc<dyn WorkoutProvider>,
        advisories: Advisories,
        port: u16,
        host: String,
    ) -> Self {
        Self {
            controller: Mutex::new(controller),
            library,
            advisories,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
        }
    }

    /// Run a user command against the controller
    pub fn command<F, R>(&self, action: &str, command: F) -> Result<R, String>
    where
        F: FnOnce(&mut SessionController) -> R,
    {
        let mut controller = self.controller.lock()
            .map_err(|e| format!("Failed to lock session controller: {}", e))?;

        let result = command(&mut *controller);
        drop(controller); // Release the lock early

        debug!("Command {} handled", action);
        Ok(result)
    }

    /// Record a command that changed the session as the last action
    pub fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Forward a clock tick to the controller
    pub fn handle_tick(&self, tick: Tick) -> Result<(), String> {
        let mut controller = self.controller.lock()
            .map_err(|e| format!("Failed to lock session controller: {}", e))?;
        controller.on_tick(tick);
        Ok(())
    }

    /// Reconcile the session from the wall clock
    pub fn reconcile(&self) -> Result<Option<SessionSnapshot>, String> {
        let mut controller = self.controller.lock()
            .map_err(|e| format!("Failed to lock session controller: {}", e))?;
        Ok(controller.on_foreground())
    }

    /// Current session snapshot, brought up to date first
    pub fn get_session(&self) -> Result<Option<SessionSnapshot>, String> {
        self.reconcile()
    }

    pub fn is_degraded(&self) -> Result<bool, String> {
        self.controller.lock()
            .map(|controller| controller.is_degraded() && controller.has_live_session())
            .map_err(|e| format!("Failed to lock session controller: {}", e))
    }

    /// Stop the clock and drop any session; used on shutdown
    pub fn teardown(&self) {
        match self.controller.lock() {
            Ok(mut controller) => {
                controller.teardown();
                info!("Session controller torn down");
            }
            Err(poisoned) => poisoned.into_inner().teardown(),
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        format_uptime(self.start_time.elapsed().as_secs())
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
