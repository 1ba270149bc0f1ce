//! HTTP API module
//! 
//! This module contains all HTTP endpoint handlers and response structures.
//! The UI layer drives a session only through these endpoints.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/session", get(session_handler))
        .route("/session/begin", post(begin_handler))
        .route("/session/pause", post(pause_handler))
        .route("/session/resume", post(resume_handler))
        .route("/session/complete-set", post(complete_set_handler))
        .route("/session/extend-rest", post(extend_rest_handler))
        .route("/session/skip-rest", post(skip_rest_handler))
        .route("/session/next-exercise", post(next_exercise_handler))
        .route("/session/abandon", post(abandon_handler))
        .route("/session/foreground", post(foreground_handler))
        .route("/workouts", get(workouts_handler))
        .route("/workouts/:id", get(workout_handler))
        .route("/advisories", delete(clear_advisories_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
