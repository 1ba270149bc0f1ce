//! External collaborator module
//!
//! The session controller talks to the outside world only through the traits
//! below: a workout library it reads definitions from, a set recorder and a
//! workout finalizer it hands records to, and a notifier that alerts the user.

pub mod journal;
pub mod library;
pub mod notifier;

use crate::state::{CompletedSetRecord, WorkoutDefinition, WorkoutSummary};

// Re-export main types
pub use journal::{Journal, JournalEntry};
pub use library::WorkoutLibrary;
pub use notifier::CommandNotifier;

/// Supplies workout definitions
pub trait WorkoutProvider: Send + Sync {
    fn workout(&self, id: &str) -> Option<WorkoutDefinition>;
    fn workouts(&self) -> Vec<WorkoutDefinition>;
}

/// Receives every completed set. Must not block.
pub trait SetRecorder: Send + Sync {
    fn record_set(&self, record: &CompletedSetRecord) -> anyhow::Result<()>;
}

/// Receives the summary of a completed session, once. Must not block.
pub trait WorkoutFinalizer: Send + Sync {
    fn finalize_workout(&self, summary: &WorkoutSummary) -> anyhow::Result<()>;
}

/// What the user is being alerted about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    RestExpired {
        workout_id: String,
        exercise_item_id: String,
        set_number: u32,
    },
}

/// Vibration/sound in the host app. Must not block.
pub trait Notifier: Send + Sync {
    fn alert(&self, alert: &Alert) -> anyhow::Result<()>;
}
