//! Session controller
//!
//! Bridges user commands and platform side effects to the workout session
//! state machine. State transitions always go through; collaborator failures
//! are logged and turned into advisories without touching the session.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    clock::{ClockSource, Tick, TickSink, WallClock},
    error::SessionError,
    services::{Alert, Notifier, SetRecorder, WorkoutFinalizer},
    state::{
        Advisories, PerformedSet, Phase, SessionEvent, SessionSnapshot, WorkoutDefinition,
        WorkoutSession, WorkoutSummary,
    },
};

/// Result of a next-exercise command
#[derive(Debug, Clone, PartialEq)]
pub enum ExerciseAdvance {
    /// Not in a workout phase; nothing changed
    Ignored,
    Advanced,
    Completed(WorkoutSummary),
}

impl ExerciseAdvance {
    pub fn summary(self) -> Option<WorkoutSummary> {
        match self {
            Self::Completed(summary) => Some(summary),
            _ => None,
        }
    }
}

/// Outbound collaborators, injected at construction
#[derive(Clone)]
pub struct Collaborators {
    pub recorder: Arc<dyn SetRecorder>,
    pub finalizer: Arc<dyn WorkoutFinalizer>,
    pub notifier: Arc<dyn Notifier>,
}

pub struct SessionController {
    session: Option<WorkoutSession>,
    clock: Box<dyn ClockSource>,
    wall: Arc<dyn WallClock>,
    ticks: TickSink,
    collaborators: Collaborators,
    advisories: Advisories,
    /// The tick clock could not be started; time only moves on reconciliation
    degraded: bool,
}

impl SessionController {
    pub fn new(
        clock: Box<dyn ClockSource>,
        wall: Arc<dyn WallClock>,
        ticks: TickSink,
        collaborators: Collaborators,
        advisories: Advisories,
    ) -> Self {
        Self {
            session: None,
            clock,
            wall,
            ticks,
            collaborators,
            advisories,
            degraded: false,
        }
    }

    /// Start a session for `workout`. A completed session is replaced, a
    /// running one is not.
    pub fn begin(&mut self, workout: WorkoutDefinition) -> Result<SessionSnapshot, SessionError> {
        if let Some(active) = self.live_session() {
            return Err(SessionError::SessionActive(active.workout().id.clone()));
        }

        let mut session = WorkoutSession::new(workout)?;
        session.start(self.wall.now());
        info!(
            "Session started for workout {} with {} exercises",
            session.workout().id,
            session.workout().ordered_exercise_items.len()
        );
        let snapshot = session.snapshot();
        self.session = Some(session);
        self.start_clock();

        Ok(snapshot)
    }

    pub fn pause(&mut self) -> bool {
        self.catch_up();
        let applied = self.live_session_mut().is_some_and(|s| s.pause());
        if applied {
            debug!("Session paused");
        }
        applied
    }

    pub fn resume(&mut self) -> bool {
        self.catch_up();
        let applied = self.live_session_mut().is_some_and(|s| s.resume());
        if applied {
            debug!("Session resumed");
        }
        applied
    }

    /// Close the current set, hand it to set persistence and start resting
    pub fn complete_set_and_rest(&mut self, rest_seconds: u64, performed: PerformedSet) -> bool {
        self.catch_up();
        let now = self.wall.now();
        let events = match self.live_session_mut() {
            Some(session) => session.start_rest(rest_seconds, performed, now),
            None => return false,
        };
        if events.is_empty() {
            return false;
        }
        debug!("Resting for {}s", rest_seconds);
        self.dispatch(events);
        true
    }

    pub fn extend_rest(&mut self, seconds: u64) -> bool {
        self.catch_up();
        let applied = self.live_session_mut().is_some_and(|s| s.extend_rest(seconds));
        if applied {
            debug!("Rest extended by {}s", seconds);
        }
        applied
    }

    pub fn skip_rest(&mut self) -> bool {
        self.catch_up();
        let applied = self.live_session_mut().is_some_and(|s| s.continue_workout());
        if applied {
            debug!("Rest ended, next set");
        }
        applied
    }

    /// Move to the next exercise, completing the session from the last one
    pub fn next_exercise(&mut self) -> ExerciseAdvance {
        self.catch_up();
        let now = self.wall.now();
        let Some(session) = self.live_session_mut() else {
            return ExerciseAdvance::Ignored;
        };
        if session.phase() != Phase::Workout {
            return ExerciseAdvance::Ignored;
        }

        let Some(SessionEvent::Completed(summary)) = session.advance_exercise(now) else {
            debug!("Moved to exercise {}", session.current_exercise().id);
            return ExerciseAdvance::Advanced;
        };

        self.clock.stop();
        info!(
            "Workout {} complete in {}s ({} sets)",
            summary.workout_id, summary.total_duration_seconds, summary.sets_completed
        );
        self.dispatch(vec![SessionEvent::Completed(summary.clone())]);
        ExerciseAdvance::Completed(summary)
    }

    /// Discard the active session without persisting anything
    pub fn abandon(&mut self) -> bool {
        self.clock.stop();
        match self.live_session() {
            Some(session) => {
                info!("Session for workout {} abandoned", session.workout().id);
                self.session = None;
                true
            }
            None => false,
        }
    }

    /// The host is going away: stop ticking and drop whatever is left
    pub fn teardown(&mut self) {
        self.clock.stop();
        if self.session.take().is_some() {
            debug!("Session discarded on teardown");
        }
    }

    /// Process one tick from the clock source
    pub fn on_tick(&mut self, tick: Tick) {
        let Some(session) = self.live_session_mut() else {
            debug!("Ignoring tick with no live session");
            return;
        };
        if let Some(event) = session.catch_up(tick.at) {
            self.dispatch(vec![event]);
        }
    }

    /// The host came back to the foreground: reconcile from the wall clock
    /// and, if the tick clock had failed, try to start it again.
    pub fn on_foreground(&mut self) -> Option<SessionSnapshot> {
        self.catch_up();
        if self.degraded && self.live_session().is_some() {
            self.start_clock();
        }
        self.snapshot()
    }

    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        self.session.as_ref().map(WorkoutSession::snapshot)
    }

    pub fn has_live_session(&self) -> bool {
        self.live_session().is_some()
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Planned rest for the exercise currently being trained
    pub fn planned_rest_seconds(&self) -> Option<u64> {
        self.live_session().map(|s| s.current_exercise().rest_seconds)
    }

    fn live_session(&self) -> Option<&WorkoutSession> {
        self.session.as_ref().filter(|s| !s.is_complete())
    }

    fn live_session_mut(&mut self) -> Option<&mut WorkoutSession> {
        self.session.as_mut().filter(|s| !s.is_complete())
    }

    fn catch_up(&mut self) {
        let now = self.wall.now();
        let event = self.live_session_mut().and_then(|s| s.catch_up(now));
        if let Some(event) = event {
            self.dispatch(vec![event]);
        }
    }

    fn start_clock(&mut self) {
        match self.clock.start(self.ticks.clone()) {
            Ok(()) => {
                if self.degraded {
                    info!("Tick clock recovered");
                    self.advisories.clear_for("clock");
                }
                self.degraded = false;
            }
            Err(e) => {
                if self.degraded {
                    debug!("Tick clock still unavailable: {}", e);
                    return;
                }
                warn!("Tick clock unavailable, falling back to wall-clock reconciliation: {}", e);
                self.degraded = true;
                self.advisories
                    .push("clock", format!("Live timer unavailable, times refresh on return: {}", e));
            }
        }
    }

    fn dispatch(&self, events: Vec<SessionEvent>) {
        for event in events {
            match event {
                SessionEvent::SetCompleted(record) => {
                    if let Err(e) = self.collaborators.recorder.record_set(&record) {
                        warn!(
                            "Failed to record set {} of {}: {:#}",
                            record.set_number, record.exercise_item_id, e
                        );
                        self.advisories.push(
                            "persistence",
                            format!(
                                "Progress not saved for set {} of {}, retry later",
                                record.set_number, record.exercise_item_id
                            ),
                        );
                    }
                }
                SessionEvent::RestExpired => {
                    let Some(session) = self.session.as_ref() else {
                        continue;
                    };
                    let alert = Alert::RestExpired {
                        workout_id: session.workout().id.clone(),
                        exercise_item_id: session.current_exercise().id.clone(),
                        set_number: session.current_set_number(),
                    };
                    if let Err(e) = self.collaborators.notifier.alert(&alert) {
                        warn!("Failed to notify rest expiry: {:#}", e);
                        self.advisories.push("notification", "Rest is over, but the alert could not be played");
                    }
                }
                SessionEvent::Completed(summary) => {
                    if let Err(e) = self.collaborators.finalizer.finalize_workout(&summary) {
                        warn!("Failed to finalize workout {}: {:#}", summary.workout_id, e);
                        self.advisories.push(
                            "persistence",
                            format!("Workout {} was not saved, retry later", summary.workout_id),
                        );
                    }
                }
            }
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.clock.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::FakeClock,
        state::{CompletedSetRecord, ExerciseItem},
    };
    use anyhow::anyhow;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    };
    use tokio::sync::mpsc;

    #[derive(Default)]
    struct Recorded {
        sets: Mutex<Vec<CompletedSetRecord>>,
        summaries: Mutex<Vec<WorkoutSummary>>,
        alerts: Mutex<Vec<Alert>>,
        fail_persistence: AtomicBool,
        fail_alerts: AtomicBool,
    }

    impl Recorded {
        fn sets(&self) -> usize {
            self.sets.lock().unwrap().len()
        }
        fn summaries(&self) -> usize {
            self.summaries.lock().unwrap().len()
        }
        fn alerts(&self) -> usize {
            self.alerts.lock().unwrap().len()
        }
    }

    impl SetRecorder for Recorded {
        fn record_set(&self, record: &CompletedSetRecord) -> anyhow::Result<()> {
            if self.fail_persistence.load(Ordering::SeqCst) {
                return Err(anyhow!("storage offline"));
            }
            self.sets.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    impl WorkoutFinalizer for Recorded {
        fn finalize_workout(&self, summary: &WorkoutSummary) -> anyhow::Result<()> {
            if self.fail_persistence.load(Ordering::SeqCst) {
                return Err(anyhow!("storage offline"));
            }
            self.summaries.lock().unwrap().push(summary.clone());
            Ok(())
        }
    }

    impl Notifier for Recorded {
        fn alert(&self, alert: &Alert) -> anyhow::Result<()> {
            if self.fail_alerts.load(Ordering::SeqCst) {
                return Err(anyhow!("no speaker"));
            }
            self.alerts.lock().unwrap().push(alert.clone());
            Ok(())
        }
    }

    struct Harness {
        controller: SessionController,
        clock: FakeClock,
        ticks: mpsc::UnboundedReceiver<Tick>,
        recorded: Arc<Recorded>,
        advisories: Advisories,
    }

    impl Harness {
        fn with_clock(clock: FakeClock) -> Self {
            let recorded = Arc::new(Recorded::default());
            let advisories = Advisories::new();
            let (tx, ticks) = mpsc::unbounded_channel();
            let controller = SessionController::new(
                Box::new(clock.clone()),
                Arc::new(clock.clone()),
                tx,
                Collaborators {
                    recorder: recorded.clone(),
                    finalizer: recorded.clone(),
                    notifier: recorded.clone(),
                },
                advisories.clone(),
            );
            Self { controller, clock, ticks, recorded, advisories }
        }

        fn new() -> Self {
            Self::with_clock(FakeClock::new(t0()))
        }

        /// Advance the fake clock and feed every emitted tick to the controller
        fn tick(&mut self, seconds: u64) {
            self.clock.advance(seconds);
            while let Ok(tick) = self.ticks.try_recv() {
                self.controller.on_tick(tick);
            }
        }

        fn snapshot(&self) -> SessionSnapshot {
            self.controller.snapshot().expect("session snapshot")
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 7, 0, 0).unwrap()
    }

    fn workout(exercises: usize) -> WorkoutDefinition {
        WorkoutDefinition {
            id: "treino-a".to_string(),
            name: "Treino A".to_string(),
            ordered_exercise_items: (0..exercises)
                .map(|i| ExerciseItem {
                    id: format!("ex-{}", i),
                    name: format!("Exercise {}", i),
                    planned_sets: 3,
                    planned_reps: 10,
                    planned_weight: 20.0,
                    rest_seconds: 60,
                })
                .collect(),
        }
    }

    #[test]
    fn begin_starts_a_running_workout() {
        let mut h = Harness::new();
        let snapshot = h.controller.begin(workout(2)).unwrap();
        assert_eq!(snapshot.phase, Phase::Workout);
        assert!(snapshot.is_running);
        assert_eq!(snapshot.current_exercise_index, 0);
        assert_eq!(snapshot.current_set_number, 1);
        assert_eq!(snapshot.elapsed_workout_seconds, 0);
        assert!(h.clock.is_started());
        assert!(!h.controller.is_degraded());
    }

    #[test]
    fn begin_rejects_empty_workout() {
        let mut h = Harness::new();
        let err = h.controller.begin(workout(0)).unwrap_err();
        assert!(matches!(err, SessionError::InvalidWorkout(_)));
        assert!(h.controller.snapshot().is_none());
        assert!(!h.clock.is_started());
    }

    #[test]
    fn only_one_live_session() {
        let mut h = Harness::new();
        h.controller.begin(workout(1)).unwrap();
        assert_eq!(
            h.controller.begin(workout(2)),
            Err(SessionError::SessionActive("treino-a".to_string()))
        );
    }

    #[test]
    fn ticks_only_count_while_running() {
        let mut h = Harness::new();
        h.controller.begin(workout(1)).unwrap();
        h.tick(10);
        assert!(h.controller.pause());
        assert!(!h.controller.pause());
        h.tick(20);
        assert_eq!(h.snapshot().elapsed_workout_seconds, 10);
        assert!(h.controller.resume());
        h.tick(5);
        assert_eq!(h.snapshot().elapsed_workout_seconds, 15);
    }

    #[test]
    fn pause_and_resume_are_noops_during_rest() {
        let mut h = Harness::new();
        h.controller.begin(workout(1)).unwrap();
        h.controller.complete_set_and_rest(60, PerformedSet::default());
        assert!(!h.controller.pause());
        assert!(!h.controller.resume());
        assert!(h.snapshot().is_running);
    }

    #[test]
    fn complete_set_records_once_and_rests() {
        let mut h = Harness::new();
        h.controller.begin(workout(1)).unwrap();
        assert!(h.controller.complete_set_and_rest(75, PerformedSet::default()));
        let snapshot = h.snapshot();
        assert_eq!(snapshot.phase, Phase::Rest);
        assert_eq!(snapshot.rest_remaining_seconds, 75);
        assert_eq!(h.recorded.sets(), 1);

        // A second call while resting does nothing
        assert!(!h.controller.complete_set_and_rest(75, PerformedSet::default()));
        assert_eq!(h.recorded.sets(), 1);
    }

    #[test]
    fn rest_expiry_alerts_once_and_waits() {
        let mut h = Harness::new();
        h.controller.begin(workout(1)).unwrap();
        h.controller.complete_set_and_rest(5, PerformedSet::default());
        h.tick(4);
        assert_eq!(h.recorded.alerts(), 0);
        h.tick(1);
        assert_eq!(h.recorded.alerts(), 1);
        h.tick(30);
        assert_eq!(h.recorded.alerts(), 1);

        let snapshot = h.snapshot();
        assert_eq!(snapshot.phase, Phase::Rest);
        assert_eq!(snapshot.rest_remaining_seconds, 0);
        assert!(snapshot.rest_expired);
    }

    #[test]
    fn extend_adds_thirty_seconds() {
        let mut h = Harness::new();
        h.controller.begin(workout(1)).unwrap();
        h.controller.complete_set_and_rest(60, PerformedSet::default());
        h.tick(20);
        let before = h.snapshot().rest_remaining_seconds;
        assert!(h.controller.extend_rest(30));
        assert_eq!(h.snapshot().rest_remaining_seconds, before + 30);
    }

    #[test]
    fn extend_after_expiry_alerts_again() {
        let mut h = Harness::new();
        h.controller.begin(workout(1)).unwrap();
        h.controller.complete_set_and_rest(10, PerformedSet::default());
        h.tick(10);
        h.controller.extend_rest(30);
        h.tick(30);
        assert_eq!(h.recorded.alerts(), 2);
    }

    #[test]
    fn two_exercise_scenario() {
        let mut h = Harness::new();
        h.controller.begin(workout(2)).unwrap();

        h.controller.complete_set_and_rest(60, PerformedSet::default());
        h.tick(60);
        assert_eq!(h.recorded.alerts(), 1);

        assert!(h.controller.skip_rest());
        let snapshot = h.snapshot();
        assert_eq!(snapshot.phase, Phase::Workout);
        assert_eq!(snapshot.current_set_number, 2);

        assert_eq!(h.controller.next_exercise(), ExerciseAdvance::Advanced);
        let snapshot = h.snapshot();
        assert_eq!(snapshot.phase, Phase::Workout);
        assert_eq!(snapshot.current_exercise_index, 1);
        assert_eq!(snapshot.current_set_number, 1);

        h.controller.complete_set_and_rest(60, PerformedSet::default());
        h.controller.skip_rest();
        let summary = h.controller.next_exercise().summary().expect("workout completes");

        assert_eq!(h.snapshot().phase, Phase::Complete);
        assert_eq!(h.recorded.sets(), 2);
        assert_eq!(h.recorded.summaries(), 1);
        assert_eq!(summary.total_duration_seconds, 60);
        assert_eq!(summary.sets_completed, 2);
        assert!(!h.clock.is_started());
    }

    #[test]
    fn commands_after_completion_are_noops() {
        let mut h = Harness::new();
        h.controller.begin(workout(1)).unwrap();
        assert!(matches!(h.controller.next_exercise(), ExerciseAdvance::Completed(_)));
        let done = h.snapshot();

        assert_eq!(h.controller.next_exercise(), ExerciseAdvance::Ignored);
        assert!(!h.controller.pause());
        assert!(!h.controller.resume());
        assert!(!h.controller.complete_set_and_rest(30, PerformedSet::default()));
        assert!(!h.controller.extend_rest(30));
        assert!(!h.controller.skip_rest());
        assert!(!h.controller.abandon());
        h.tick(10);

        assert_eq!(h.snapshot(), done);
        assert_eq!(h.recorded.summaries(), 1);
    }

    #[test]
    fn completed_session_can_be_replaced() {
        let mut h = Harness::new();
        h.controller.begin(workout(1)).unwrap();
        h.controller.next_exercise();
        assert!(h.controller.begin(workout(2)).is_ok());
        assert_eq!(h.snapshot().exercise_count, 2);
    }

    #[test]
    fn abandon_stops_the_clock_and_ignores_late_ticks() {
        let mut h = Harness::new();
        h.controller.begin(workout(2)).unwrap();
        h.tick(3);
        assert!(h.controller.abandon());
        assert!(!h.clock.is_started());
        assert!(h.controller.snapshot().is_none());

        // Nothing more is emitted, and a stale tick is harmless
        assert_eq!(h.clock.advance(5), 0);
        h.controller.on_tick(Tick { at: t0() + Duration::seconds(100) });
        assert!(h.controller.snapshot().is_none());
        assert_eq!(h.recorded.sets(), 0);
        assert_eq!(h.recorded.summaries(), 0);

        assert!(!h.controller.abandon());
    }

    #[test]
    fn teardown_stops_the_clock() {
        let mut h = Harness::new();
        h.controller.begin(workout(1)).unwrap();
        h.controller.teardown();
        assert!(!h.clock.is_started());
        assert!(!h.controller.has_live_session());
    }

    #[test]
    fn background_gap_is_reconciled_on_next_tick() {
        let mut h = Harness::new();
        h.controller.begin(workout(1)).unwrap();
        h.tick(10);
        h.clock.jump(300);
        h.tick(1);
        assert_eq!(h.snapshot().elapsed_workout_seconds, 311);
    }

    #[test]
    fn rest_expiring_in_background_alerts_on_return() {
        let mut h = Harness::new();
        h.controller.begin(workout(1)).unwrap();
        h.controller.complete_set_and_rest(60, PerformedSet::default());
        h.clock.jump(600);
        let snapshot = h.controller.on_foreground().unwrap();
        assert_eq!(snapshot.rest_remaining_seconds, 0);
        assert_eq!(h.recorded.alerts(), 1);
    }

    #[test]
    fn clock_failure_degrades_to_wall_clock() {
        let mut h = Harness::with_clock(FakeClock::refusing_start(t0()));
        h.controller.begin(workout(1)).unwrap();
        assert!(h.controller.is_degraded());
        assert_eq!(h.advisories.list()[0].component, "clock");

        h.clock.jump(42);
        let snapshot = h.controller.on_foreground().unwrap();
        assert_eq!(snapshot.elapsed_workout_seconds, 42);
        assert!(h.controller.is_degraded());
    }

    #[test]
    fn clock_recovery_clears_its_advisory() {
        let mut h = Harness::with_clock(FakeClock::refusing_start(t0()));
        h.controller.begin(workout(1)).unwrap();
        h.advisories.push("persistence", "journal unavailable");
        assert_eq!(h.advisories.len(), 2);

        h.clock.allow_start();
        h.controller.on_foreground();
        assert!(!h.controller.is_degraded());
        assert!(h.clock.is_started());
        let advisories = h.advisories.list();
        assert_eq!(advisories.len(), 1);
        assert_eq!(advisories[0].component, "persistence");

        h.tick(3);
        assert_eq!(h.snapshot().elapsed_workout_seconds, 3);
    }

    #[test]
    fn persistence_failure_does_not_block_training() {
        let mut h = Harness::new();
        h.recorded.fail_persistence.store(true, Ordering::SeqCst);
        h.controller.begin(workout(1)).unwrap();

        assert!(h.controller.complete_set_and_rest(60, PerformedSet::default()));
        assert_eq!(h.snapshot().phase, Phase::Rest);
        assert_eq!(h.advisories.list()[0].component, "persistence");

        h.controller.skip_rest();
        assert!(matches!(h.controller.next_exercise(), ExerciseAdvance::Completed(_)));
        assert_eq!(h.snapshot().phase, Phase::Complete);
        assert_eq!(h.advisories.len(), 2);
    }

    #[test]
    fn notification_failure_is_an_advisory() {
        let mut h = Harness::new();
        h.recorded.fail_alerts.store(true, Ordering::SeqCst);
        h.controller.begin(workout(1)).unwrap();
        h.controller.complete_set_and_rest(1, PerformedSet::default());
        h.tick(1);
        assert_eq!(h.advisories.list()[0].component, "notification");
        assert!(h.controller.skip_rest());
    }

    #[test]
    fn planned_rest_follows_current_exercise() {
        let mut h = Harness::new();
        assert_eq!(h.controller.planned_rest_seconds(), None);
        h.controller.begin(workout(1)).unwrap();
        assert_eq!(h.controller.planned_rest_seconds(), Some(60));
    }
}
