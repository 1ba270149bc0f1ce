//! Journal: hands completed sets and finished workouts to the writer task

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

use super::{SetRecorder, WorkoutFinalizer};
use crate::state::{CompletedSetRecord, WorkoutSummary};

/// One line of the journal file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum JournalEntry {
    Set(CompletedSetRecord),
    Workout(WorkoutSummary),
}

/// Enqueues journal entries without waiting for them to be written
#[derive(Debug, Clone)]
pub struct Journal {
    tx: mpsc::UnboundedSender<JournalEntry>,
}

impl Journal {
    /// Create a journal and the receiving end the writer task drains
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<JournalEntry>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn enqueue(&self, entry: JournalEntry) -> anyhow::Result<()> {
        self.tx
            .send(entry)
            .map_err(|_| anyhow!("journal writer is not running"))
    }
}

impl SetRecorder for Journal {
    fn record_set(&self, record: &CompletedSetRecord) -> anyhow::Result<()> {
        debug!(
            "Journaling set {} of {} in workout {}",
            record.set_number, record.exercise_item_id, record.workout_id
        );
        self.enqueue(JournalEntry::Set(record.clone()))
    }
}

impl WorkoutFinalizer for Journal {
    fn finalize_workout(&self, summary: &WorkoutSummary) -> anyhow::Result<()> {
        debug!("Journaling completion of workout {}", summary.workout_id);
        self.enqueue(JournalEntry::Workout(summary.clone()))
    }
}
