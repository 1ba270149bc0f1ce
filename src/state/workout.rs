//! Workout definitions and the records a session emits

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// One entry in a workout's ordered exercise list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseItem {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub planned_sets: u32,
    pub planned_reps: u32,
    #[serde(default)]
    pub planned_weight: f64,
    pub rest_seconds: u64,
}

/// A workout as supplied by the workout library. Read-only for the timer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutDefinition {
    pub id: String,
    pub name: String,
    pub ordered_exercise_items: Vec<ExerciseItem>,
}

impl WorkoutDefinition {
    /// A session can only run through a workout with at least one exercise
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.ordered_exercise_items.is_empty() {
            return Err(SessionError::InvalidWorkout(format!(
                "workout {} has no exercise items",
                self.id
            )));
        }
        Ok(())
    }

    pub fn exercise(&self, index: usize) -> Option<&ExerciseItem> {
        self.ordered_exercise_items.get(index)
    }

    pub fn last_index(&self) -> usize {
        self.ordered_exercise_items.len().saturating_sub(1)
    }
}

/// Values the user actually performed for a set, overriding the plan
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformedSet {
    pub reps: Option<u32>,
    pub weight: Option<f64>,
}

/// Emitted once per completed set, handed off to set persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedSetRecord {
    pub workout_id: String,
    pub exercise_item_id: String,
    pub set_number: u32,
    pub reps: u32,
    pub weight: f64,
    pub rest_duration_seconds: u64,
    pub completed_at: DateTime<Utc>,
}

/// Emitted exactly once when a session completes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSummary {
    pub workout_id: String,
    pub total_duration_seconds: u64,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub sets_completed: u32,
    pub exercises_completed: u32,
}
