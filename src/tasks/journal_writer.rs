//! Journal writer background task

use std::path::{Path, PathBuf};

use anyhow::Context;
use tokio::{fs::OpenOptions, io::AsyncWriteExt, sync::mpsc};
use tracing::{debug, error, info};

use crate::{services::JournalEntry, state::Advisories};

/// Background task that appends journal entries to `path`, one JSON object
/// per line. A failed write is logged and surfaced as an advisory; the next
/// entry is attempted regardless.
pub async fn journal_writer_task(
    path: PathBuf,
    mut entries: mpsc::UnboundedReceiver<JournalEntry>,
    advisories: Advisories,
) {
    info!("Starting journal writer for {}", path.display());

    while let Some(entry) = entries.recv().await {
        match append_entry(&path, &entry).await {
            Ok(()) => debug!("Journal entry written"),
            Err(e) => {
                error!("Failed to write journal entry: {:#}", e);
                let what = match &entry {
                    JournalEntry::Set(record) => format!(
                        "set {} of {}",
                        record.set_number, record.exercise_item_id
                    ),
                    JournalEntry::Workout(summary) => format!("workout {}", summary.workout_id),
                };
                advisories.push("persistence", format!("Progress not saved for {}, retry later", what));
            }
        }
    }

    info!("Journal channel closed, writer stopped");
}

async fn append_entry(path: &Path, entry: &JournalEntry) -> anyhow::Result<()> {
    let mut line = serde_json::to_string(entry).context("Failed to serialize journal entry")?;
    line.push('\n');

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .with_context(|| format!("Failed to open journal {}", path.display()))?;
    file.write_all(line.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        services::{Journal, SetRecorder, WorkoutFinalizer},
        state::{CompletedSetRecord, WorkoutSummary},
    };
    use chrono::{TimeZone, Utc};

    fn record(set_number: u32) -> CompletedSetRecord {
        CompletedSetRecord {
            workout_id: "treino-c".to_string(),
            exercise_item_id: "agachamento".to_string(),
            set_number,
            reps: 8,
            weight: 80.0,
            rest_duration_seconds: 120,
            completed_at: Utc.with_ymd_and_hms(2026, 3, 1, 7, 5, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn writes_one_line_per_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.jsonl");
        let (journal, rx) = Journal::channel();
        let advisories = Advisories::new();

        journal.record_set(&record(1)).unwrap();
        journal.record_set(&record(2)).unwrap();
        journal
            .finalize_workout(&WorkoutSummary {
                workout_id: "treino-c".to_string(),
                total_duration_seconds: 1800,
                started_at: Utc.with_ymd_and_hms(2026, 3, 1, 7, 0, 0).unwrap(),
                completed_at: Utc.with_ymd_and_hms(2026, 3, 1, 7, 30, 0).unwrap(),
                sets_completed: 2,
                exercises_completed: 1,
            })
            .unwrap();
        drop(journal);

        journal_writer_task(path.clone(), rx, advisories.clone()).await;

        let written = tokio::fs::read_to_string(&path).await.unwrap();
        let entries: Vec<JournalEntry> = written
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1], JournalEntry::Set(record(2)));
        assert!(matches!(entries[2], JournalEntry::Workout(_)));
        assert!(advisories.is_empty());
    }

    #[tokio::test]
    async fn unwritable_journal_becomes_an_advisory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("journal.jsonl");
        let (journal, rx) = Journal::channel();
        let advisories = Advisories::new();

        journal.record_set(&record(1)).unwrap();
        drop(journal);
        journal_writer_task(path, rx, advisories.clone()).await;

        let list = advisories.list();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].component, "persistence");
        assert!(list[0].message.contains("set 1 of agachamento"));
    }
}
