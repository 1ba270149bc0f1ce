//! Workout session state machine
//!
//! `Idle -> Workout <-> Rest -> ... -> Complete`. Transitions are synchronous
//! and never fail; a command that does not apply to the current phase is a
//! no-op and reports `false`/no events. Side effects are returned as
//! [`SessionEvent`]s for the controller to dispatch.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::workout::{
    CompletedSetRecord, ExerciseItem, PerformedSet, WorkoutDefinition, WorkoutSummary,
};
use crate::{clock::whole_seconds_between, error::SessionError, utils::format_duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Workout,
    Rest,
    Complete,
}

/// Something the outside world has to hear about
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SetCompleted(CompletedSetRecord),
    RestExpired,
    Completed(WorkoutSummary),
}

/// One run through a single workout's exercises
#[derive(Debug, Clone)]
pub struct WorkoutSession {
    workout: WorkoutDefinition,
    phase: Phase,
    is_running: bool,
    elapsed_workout_seconds: u64,
    rest_target_seconds: u64,
    rest_elapsed_seconds: u64,
    rest_expiry_signaled: bool,
    current_exercise_index: usize,
    current_set_number: u32,
    sets_completed: u32,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    /// Wall-clock instant up to which elapsed time has been applied
    accounted_until: Option<DateTime<Utc>>,
}

impl WorkoutSession {
    /// Create an idle session. Fails for a workout with no exercises.
    pub fn new(workout: WorkoutDefinition) -> Result<Self, SessionError> {
        workout.validate()?;
        Ok(Self {
            workout,
            phase: Phase::Idle,
            is_running: false,
            elapsed_workout_seconds: 0,
            rest_target_seconds: 0,
            rest_elapsed_seconds: 0,
            rest_expiry_signaled: false,
            current_exercise_index: 0,
            current_set_number: 1,
            sets_completed: 0,
            started_at: None,
            completed_at: None,
            accounted_until: None,
        })
    }

    pub fn start(&mut self, now: DateTime<Utc>) -> bool {
        if self.phase != Phase::Idle {
            return false;
        }
        self.phase = Phase::Workout;
        self.is_running = true;
        self.started_at = Some(now);
        self.accounted_until = Some(now);
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.phase != Phase::Workout || !self.is_running {
            return false;
        }
        self.is_running = false;
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.phase != Phase::Workout || self.is_running {
            return false;
        }
        self.is_running = true;
        true
    }

    /// Close the current set and start a rest countdown of `duration` seconds
    pub fn start_rest(
        &mut self,
        duration: u64,
        performed: PerformedSet,
        now: DateTime<Utc>,
    ) -> Vec<SessionEvent> {
        if self.phase != Phase::Workout {
            return Vec::new();
        }

        let item = self.current_exercise();
        let record = CompletedSetRecord {
            workout_id: self.workout.id.clone(),
            exercise_item_id: item.id.clone(),
            set_number: self.current_set_number,
            reps: performed.reps.unwrap_or(item.planned_reps),
            weight: performed.weight.unwrap_or(item.planned_weight),
            rest_duration_seconds: duration,
            completed_at: now,
        };
        let mut events = vec![SessionEvent::SetCompleted(record)];

        self.sets_completed += 1;
        self.phase = Phase::Rest;
        self.is_running = true;
        self.rest_target_seconds = duration;
        self.rest_elapsed_seconds = 0;
        self.rest_expiry_signaled = false;

        if duration == 0 {
            self.rest_expiry_signaled = true;
            events.push(SessionEvent::RestExpired);
        }
        events
    }

    /// Lengthen the current rest. Re-arms expiry if it had already fired.
    pub fn extend_rest(&mut self, seconds: u64) -> bool {
        if self.phase != Phase::Rest {
            return false;
        }
        self.rest_target_seconds = self.rest_target_seconds.saturating_add(seconds);
        if self.rest_elapsed_seconds < self.rest_target_seconds {
            self.rest_expiry_signaled = false;
        }
        true
    }

    /// End the rest and start the next set of the same exercise
    pub fn continue_workout(&mut self) -> bool {
        if self.phase != Phase::Rest {
            return false;
        }
        self.phase = Phase::Workout;
        self.is_running = true;
        self.current_set_number += 1;
        self.rest_target_seconds = 0;
        self.rest_elapsed_seconds = 0;
        self.rest_expiry_signaled = false;
        true
    }

    /// Move to the next exercise, or complete the session from the last one
    pub fn advance_exercise(&mut self, now: DateTime<Utc>) -> Option<SessionEvent> {
        if self.phase != Phase::Workout {
            return None;
        }

        if self.current_exercise_index < self.workout.last_index() {
            self.current_exercise_index += 1;
            self.current_set_number = 1;
            return None;
        }

        self.phase = Phase::Complete;
        self.is_running = false;
        self.completed_at = Some(now);
        let started_at = self.started_at.unwrap_or(now);
        Some(SessionEvent::Completed(WorkoutSummary {
            workout_id: self.workout.id.clone(),
            total_duration_seconds: (now - started_at).num_seconds().max(0) as u64,
            started_at,
            completed_at: now,
            sets_completed: self.sets_completed,
            exercises_completed: self.current_exercise_index as u32 + 1,
        }))
    }

    /// Apply `seconds` of elapsed time to the active counter
    pub fn advance(&mut self, seconds: u64) -> Option<SessionEvent> {
        match self.phase {
            Phase::Workout if self.is_running => {
                self.elapsed_workout_seconds += seconds;
                None
            }
            Phase::Rest => {
                self.rest_elapsed_seconds = self
                    .rest_elapsed_seconds
                    .saturating_add(seconds)
                    .min(self.rest_target_seconds);
                if self.rest_elapsed_seconds >= self.rest_target_seconds
                    && !self.rest_expiry_signaled
                {
                    self.rest_expiry_signaled = true;
                    return Some(SessionEvent::RestExpired);
                }
                None
            }
            _ => None,
        }
    }

    /// Apply whatever wall-clock time has passed since the last catch-up
    pub fn catch_up(&mut self, now: DateTime<Utc>) -> Option<SessionEvent> {
        if matches!(self.phase, Phase::Idle | Phase::Complete) {
            return None;
        }
        let accounted = self.accounted_until?;
        let seconds = whole_seconds_between(accounted, now);
        if seconds == 0 {
            return None;
        }
        self.accounted_until = Some(accounted + Duration::seconds(seconds as i64));
        self.advance(seconds)
    }

    pub fn workout(&self) -> &WorkoutDefinition {
        &self.workout
    }

    pub fn current_exercise(&self) -> &ExerciseItem {
        // validated non-empty and the index never passes the last item
        &self.workout.ordered_exercise_items[self.current_exercise_index]
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    pub fn elapsed_workout_seconds(&self) -> u64 {
        self.elapsed_workout_seconds
    }

    pub fn rest_target_seconds(&self) -> u64 {
        self.rest_target_seconds
    }

    pub fn rest_remaining_seconds(&self) -> u64 {
        self.rest_target_seconds.saturating_sub(self.rest_elapsed_seconds)
    }

    pub fn current_exercise_index(&self) -> usize {
        self.current_exercise_index
    }

    pub fn current_set_number(&self) -> u32 {
        self.current_set_number
    }

    pub fn sets_completed(&self) -> u32 {
        self.sets_completed
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let item = self.current_exercise();
        SessionSnapshot {
            workout_id: self.workout.id.clone(),
            workout_name: self.workout.name.clone(),
            phase: self.phase,
            is_running: self.is_running,
            elapsed_workout_seconds: self.elapsed_workout_seconds,
            elapsed_display: format_duration(self.elapsed_workout_seconds),
            rest_target_seconds: self.rest_target_seconds,
            rest_remaining_seconds: self.rest_remaining_seconds(),
            rest_display: format_duration(self.rest_remaining_seconds()),
            rest_expired: self.phase == Phase::Rest && self.rest_expiry_signaled,
            current_exercise_index: self.current_exercise_index,
            current_exercise_id: item.id.clone(),
            current_exercise_name: item.name.clone(),
            current_set_number: self.current_set_number,
            planned_sets: item.planned_sets,
            exercise_count: self.workout.ordered_exercise_items.len(),
            sets_completed: self.sets_completed,
            started_at: self.started_at,
            completed_at: self.completed_at,
        }
    }
}

/// What the UI renders after every transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub workout_id: String,
    pub workout_name: String,
    pub phase: Phase,
    pub is_running: bool,
    pub elapsed_workout_seconds: u64,
    pub elapsed_display: String,
    pub rest_target_seconds: u64,
    pub rest_remaining_seconds: u64,
    pub rest_display: String,
    pub rest_expired: bool,
    pub current_exercise_index: usize,
    pub current_exercise_id: String,
    pub current_exercise_name: String,
    pub current_set_number: u32,
    pub planned_sets: u32,
    pub exercise_count: usize,
    pub sets_completed: u32,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}
