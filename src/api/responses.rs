//! API request and response structures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::SessionError,
    state::{Advisory, SessionSnapshot, WorkoutDefinition, WorkoutSummary},
};

/// Body of POST /session/begin: a library workout id or an inline definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeginRequest {
    pub workout_id: Option<String>,
    pub workout: Option<WorkoutDefinition>,
}

/// Body of POST /session/complete-set. Everything is optional; the plan fills the gaps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteSetRequest {
    pub rest_seconds: Option<u64>,
    pub reps: Option<u32>,
    pub weight: Option<f64>,
}

/// Body of POST /session/extend-rest
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtendRestRequest {
    pub seconds: Option<u64>,
}

/// Response to every session command
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub session: Option<SessionSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<WorkoutSummary>,
    pub advisories: Vec<Advisory>,
}

impl CommandResponse {
    /// Create a new command response
    pub fn new(
        status: &str,
        message: String,
        session: Option<SessionSnapshot>,
        advisories: Vec<Advisory>,
    ) -> Self {
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            session,
            summary: None,
            advisories,
        }
    }

    /// The command changed the session
    pub fn applied(message: String, session: Option<SessionSnapshot>, advisories: Vec<Advisory>) -> Self {
        Self::new("applied", message, session, advisories)
    }

    /// The command does not apply to the current phase and was ignored
    pub fn ignored(message: String, session: Option<SessionSnapshot>, advisories: Vec<Advisory>) -> Self {
        Self::new("ignored", message, session, advisories)
    }

    /// The session just completed
    pub fn completed(
        message: String,
        session: Option<SessionSnapshot>,
        summary: WorkoutSummary,
        advisories: Vec<Advisory>,
    ) -> Self {
        Self {
            summary: Some(summary),
            ..Self::new("complete", message, session, advisories)
        }
    }
}

/// Enhanced status response with session information
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub session: Option<SessionSnapshot>,
    pub clock_degraded: bool,
    pub advisories: Vec<Advisory>,
    pub workouts_available: usize,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Error body returned with a non-2xx status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Handler error: a status code plus a message
#[derive(Debug)]
pub struct ApiError {
    pub code: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        let code = match err {
            SessionError::InvalidWorkout(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SessionError::UnknownWorkout(_) => StatusCode::NOT_FOUND,
            SessionError::SessionActive(_) => StatusCode::CONFLICT,
        };
        Self::new(code, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            status: "error".to_string(),
            message: self.message,
            timestamp: Utc::now(),
        };
        (self.code, Json(body)).into_response()
    }
}
