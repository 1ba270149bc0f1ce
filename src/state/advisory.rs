//! Non-blocking notices for the UI layer
//!
//! A failed side effect (a set that could not be saved, an alert that could
//! not be played) never interrupts a session. It is logged and kept here so
//! the UI can show a passive notice.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const MAX_ADVISORIES: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Advisory {
    pub component: String,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Shared, bounded list of advisories. Clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct Advisories {
    inner: Arc<Mutex<Vec<Advisory>>>,
}

impl Advisories {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Advisory>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record an advisory, dropping the oldest once the list is full
    pub fn push(&self, component: &str, message: impl Into<String>) {
        let message = message.into();
        warn!("Advisory from {}: {}", component, message);

        let mut list = self.lock();
        if list.len() >= MAX_ADVISORIES {
            list.remove(0);
        }
        list.push(Advisory {
            component: component.to_string(),
            message,
            at: Utc::now(),
        });
    }

    pub fn list(&self) -> Vec<Advisory> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) -> usize {
        let mut list = self.lock();
        let cleared = list.len();
        list.clear();
        cleared
    }

    /// Clear advisories raised by one component
    pub fn clear_for(&self, component: &str) -> usize {
        let mut list = self.lock();
        let initial_count = list.len();
        list.retain(|advisory| !advisory.component.eq_ignore_ascii_case(component));

        let cleared = initial_count - list.len();
        if cleared > 0 {
            info!("Cleared {} advisories for component: {}", cleared, component);
        }
        cleared
    }
}
