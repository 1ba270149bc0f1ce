//! State management module
//! 
//! This module contains the workout data model, the session state machine and
//! the application state that hosts the session controller.

pub mod advisory;
pub mod app_state;
pub mod session;
pub mod workout;

// Re-export main types
pub use advisory::{Advisories, Advisory};
pub use app_state::AppState;
pub use session::{Phase, SessionEvent, SessionSnapshot, WorkoutSession};
pub use workout::{
    CompletedSetRecord, ExerciseItem, PerformedSet, WorkoutDefinition, WorkoutSummary,
};
