//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::{
    controller::{ExerciseAdvance, SessionController},
    error::SessionError,
    state::{AppState, PerformedSet, SessionSnapshot, WorkoutDefinition},
};
use super::responses::{
    ApiError, BeginRequest, CommandResponse, CompleteSetRequest, ExtendRestRequest,
    HealthResponse, StatusResponse,
};

/// Rest added by the "+30s" button
pub const DEFAULT_REST_EXTENSION_SECONDS: u64 = 30;

/// Read an optional JSON body. No body at all means the default request; a
/// body that does not parse is rejected before the session is touched.
fn request_or_default<T: Default>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match body {
        Ok(Json(request)) => Ok(request),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(rejection) => {
            warn!("Rejected request body: {}", rejection.body_text());
            Err(ApiError::new(rejection.status(), rejection.body_text()))
        }
    }
}

/// Run a command that either applies to the current phase or is ignored
fn session_command<F>(
    state: &AppState,
    action: &str,
    command: F,
    applied_message: &str,
    ignored_message: &str,
) -> Result<Json<CommandResponse>, ApiError>
where
    F: FnOnce(&mut SessionController) -> bool,
{
    let (applied, session) = state
        .command(action, |controller| {
            let applied = command(controller);
            (applied, controller.snapshot())
        })
        .map_err(|e| {
            error!("Failed to run {}: {}", action, e);
            ApiError::internal(e)
        })?;

    let advisories = state.advisories.list();
    if applied {
        state.record_action(action);
        info!("{} endpoint called - {}", action, applied_message);
        Ok(Json(CommandResponse::applied(applied_message.to_string(), session, advisories)))
    } else {
        Ok(Json(CommandResponse::ignored(ignored_message.to_string(), session, advisories)))
    }
}

/// Handle POST /session/begin - Start a session for a workout
pub async fn begin_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<BeginRequest>, JsonRejection>,
) -> Result<Json<CommandResponse>, ApiError> {
    let request = request_or_default(body)?;

    let workout = match (request.workout, request.workout_id) {
        (Some(workout), _) => workout,
        (None, Some(id)) => state
            .library
            .workout(&id)
            .ok_or(SessionError::UnknownWorkout(id))?,
        (None, None) => {
            return Err(ApiError::new(
                StatusCode::BAD_REQUEST,
                "either workoutId or workout is required",
            ))
        }
    };

    let workout_name = workout.name.clone();
    let session = state
        .command("begin", |controller| controller.begin(workout))
        .map_err(ApiError::internal)??;

    state.record_action("begin");
    info!("Begin endpoint called - session started for {}", workout_name);
    Ok(Json(CommandResponse::applied(
        format!("Session started for {}", workout_name),
        Some(session),
        state.advisories.list(),
    )))
}

/// Handle POST /session/pause - Pause the workout clock
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> Result<Json<CommandResponse>, ApiError> {
    session_command(
        &state,
        "pause",
        SessionController::pause,
        "Workout paused",
        "Nothing to pause",
    )
}

/// Handle POST /session/resume - Resume the workout clock
pub async fn resume_handler(State(state): State<Arc<AppState>>) -> Result<Json<CommandResponse>, ApiError> {
    session_command(
        &state,
        "resume",
        SessionController::resume,
        "Workout resumed",
        "Nothing to resume",
    )
}

/// Handle POST /session/complete-set - Record the set and start resting
pub async fn complete_set_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CompleteSetRequest>, JsonRejection>,
) -> Result<Json<CommandResponse>, ApiError> {
    let request = request_or_default(body)?;
    let performed = PerformedSet {
        reps: request.reps,
        weight: request.weight,
    };

    session_command(
        &state,
        "complete-set",
        |controller| {
            let rest_seconds = request
                .rest_seconds
                .or_else(|| controller.planned_rest_seconds())
                .unwrap_or(0);
            controller.complete_set_and_rest(rest_seconds, performed)
        },
        "Set recorded, resting",
        "No set in progress",
    )
}

/// Handle POST /session/extend-rest - Add time to the rest countdown
pub async fn extend_rest_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ExtendRestRequest>, JsonRejection>,
) -> Result<Json<CommandResponse>, ApiError> {
    let seconds = request_or_default(body)?
        .seconds
        .unwrap_or(DEFAULT_REST_EXTENSION_SECONDS);

    session_command(
        &state,
        "extend-rest",
        |controller| controller.extend_rest(seconds),
        &format!("Rest extended by {}s", seconds),
        "Not resting",
    )
}

/// Handle POST /session/skip-rest - End the rest and start the next set
pub async fn skip_rest_handler(State(state): State<Arc<AppState>>) -> Result<Json<CommandResponse>, ApiError> {
    session_command(
        &state,
        "skip-rest",
        SessionController::skip_rest,
        "Rest over, next set",
        "Not resting",
    )
}

/// Handle POST /session/next-exercise - Advance or complete the workout
pub async fn next_exercise_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CommandResponse>, ApiError> {
    let (advance, session) = state
        .command("next-exercise", |controller| {
            let advance = controller.next_exercise();
            (advance, controller.snapshot())
        })
        .map_err(ApiError::internal)?;

    let advisories = state.advisories.list();
    let response = match advance {
        ExerciseAdvance::Ignored => {
            CommandResponse::ignored("Finish resting first".to_string(), session, advisories)
        }
        ExerciseAdvance::Advanced => {
            state.record_action("next-exercise");
            info!("Next-exercise endpoint called - moved to next exercise");
            CommandResponse::applied("Next exercise".to_string(), session, advisories)
        }
        ExerciseAdvance::Completed(summary) => {
            state.record_action("next-exercise");
            info!("Next-exercise endpoint called - workout complete");
            CommandResponse::completed(
                format!("Workout complete in {}s", summary.total_duration_seconds),
                session,
                summary,
                advisories,
            )
        }
    };
    Ok(Json(response))
}

/// Handle POST /session/abandon - Discard the session without saving
pub async fn abandon_handler(State(state): State<Arc<AppState>>) -> Result<Json<CommandResponse>, ApiError> {
    session_command(
        &state,
        "abandon",
        SessionController::abandon,
        "Session abandoned",
        "No active session",
    )
}

/// Handle POST /session/foreground - The app came back, reconcile from the wall clock
pub async fn foreground_handler(State(state): State<Arc<AppState>>) -> Result<Json<CommandResponse>, ApiError> {
    let session = state
        .command("foreground", SessionController::on_foreground)
        .map_err(ApiError::internal)?;
    state.record_action("foreground");
    Ok(Json(CommandResponse::applied(
        "Session reconciled".to_string(),
        session,
        state.advisories.list(),
    )))
}

/// Handle GET /session - Current session snapshot
pub async fn session_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Option<SessionSnapshot>>, ApiError> {
    let session = state.get_session().map_err(|e| {
        error!("Failed to get session: {}", e);
        ApiError::internal(e)
    })?;
    Ok(Json(session))
}

/// Handle GET /workouts - List workout definitions
pub async fn workouts_handler(State(state): State<Arc<AppState>>) -> Json<Vec<WorkoutDefinition>> {
    Json(state.library.workouts())
}

/// Handle GET /workouts/:id - One workout definition
pub async fn workout_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<WorkoutDefinition>, ApiError> {
    state
        .library
        .workout(&id)
        .map(Json)
        .ok_or_else(|| SessionError::UnknownWorkout(id).into())
}

/// Handle DELETE /advisories - Dismiss all advisories
pub async fn clear_advisories_handler(State(state): State<Arc<AppState>>) -> StatusCode {
    let cleared = state.advisories.clear();
    info!("Cleared {} advisories", cleared);
    StatusCode::NO_CONTENT
}

/// Handle GET /status - Return current service status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, ApiError> {
    let session = state.get_session().map_err(|e| {
        error!("Failed to get session: {}", e);
        ApiError::internal(e)
    })?;
    let clock_degraded = state.is_degraded().map_err(|e| {
        error!("Failed to get clock state: {}", e);
        ApiError::internal(e)
    })?;

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        session,
        clock_degraded,
        advisories: state.advisories.list(),
        workouts_available: state.library.workouts().len(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
