//! Treino Timer - a workout session timer service
//! 
//! This library tracks a workout session: elapsed workout time, rest-interval
//! countdowns and progress through a workout's exercises and sets. A UI layer
//! drives it over HTTP; completed sets and workouts are journaled.

pub mod api;
pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use controller::{Collaborators, ExerciseAdvance, SessionController};
pub use error::{ClockError, SessionError};
pub use state::AppState;
pub use utils::signals::shutdown_signal;
