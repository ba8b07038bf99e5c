use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::{
    dao::storage::StorageError,
    scoring::{
        gate::GateError,
        scorecard::ScoreCardError,
        values::{HoleNumber, ValueError},
    },
    state::{
        AbortError, ApplyError, PlanError,
        state_machine::{GroupEvent, GroupPhase, InvalidTransition},
    },
};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A hole was confirmed while some members have no score.
    #[error("incomplete hole {hole}: fill in every player's score before confirming")]
    IncompleteHole {
        /// Hole being confirmed.
        hole: HoleNumber,
        /// Members without a value.
        missing: Vec<Uuid>,
    },
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Write lost against a concurrent writer or a locked hole.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Persisted data could not be turned back into domain values.
    #[error("corrupted record: {0}")]
    Corrupted(String),
    /// Operation exceeded its timeout limit.
    #[error("operation timed out")]
    Timeout,
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict { message } => ServiceError::Conflict(message),
            unavailable => ServiceError::Unavailable(unavailable),
        }
    }
}

impl From<ValueError> for ServiceError {
    fn from(err: ValueError) -> Self {
        ServiceError::InvalidInput(err.to_string())
    }
}

impl From<ScoreCardError> for ServiceError {
    fn from(err: ScoreCardError) -> Self {
        ServiceError::InvalidInput(err.to_string())
    }
}

impl From<GateError> for ServiceError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::Incomplete { hole, missing } => {
                ServiceError::IncompleteHole { hole, missing }
            }
            GateError::Locked { .. } => ServiceError::Conflict(err.to_string()),
            GateError::StepOutOfRange { .. }
            | GateError::OutOfSequence { .. }
            | GateError::Card(_) => ServiceError::InvalidInput(err.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Hole confirmation refused because some members have no score.
    #[error("bad request: {message}")]
    IncompleteHole {
        /// Human readable reason.
        message: String,
        /// Members still missing a value.
        missing_players: Vec<Uuid>,
    },
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Degraded => AppError::ServiceUnavailable("degraded mode".into()),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::IncompleteHole { hole, missing } => AppError::IncompleteHole {
                message: ServiceError::IncompleteHole {
                    hole,
                    missing: Vec::new(),
                }
                .to_string(),
                missing_players: missing,
            },
            ServiceError::InvalidState(message) => AppError::Conflict(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::Conflict(message) => AppError::Conflict(message),
            ServiceError::Corrupted(message) => AppError::Internal(message),
            ServiceError::Timeout => AppError::ServiceUnavailable("operation timed out".into()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    missing_players: Option<Vec<Uuid>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) | AppError::IncompleteHole { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = self.to_string();
        let missing_players = match self {
            AppError::IncompleteHole {
                missing_players, ..
            } => Some(missing_players),
            _ => None,
        };

        let payload = Json(ErrorBody {
            message,
            missing_players,
        });

        (status, payload).into_response()
    }
}

impl From<PlanError> for ServiceError {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::AlreadyPending => {
                ServiceError::InvalidState("state transition already pending".into())
            }
            PlanError::InvalidTransition(invalid) => {
                debug!(from = ?invalid.from, event = ?invalid.event, "transition refused");
                ServiceError::InvalidState(refused_transition_message(&invalid).into())
            }
        }
    }
}

/// Scorer-facing explanation of a refused phase change.
fn refused_transition_message(invalid: &InvalidTransition) -> &'static str {
    match (invalid.from, invalid.event) {
        (GroupPhase::Completed, GroupEvent::HoleConfirmed { .. }) => {
            "card is completed; re-open it to edit"
        }
        (GroupPhase::Completed, _) => "card is completed and not being edited",
        (GroupPhase::CompletedEditing, _) => "card is being edited; save the edits to close it",
        (GroupPhase::InProgress { .. }, GroupEvent::Finish) => {
            "round is not finished; confirm every hole first"
        }
        (GroupPhase::InProgress { .. }, GroupEvent::Reopen) => {
            "only a completed card can be re-opened"
        }
        (GroupPhase::InProgress { .. }, _) => "card is still being scored",
    }
}

impl From<ApplyError> for ServiceError {
    fn from(err: ApplyError) -> Self {
        match err {
            ApplyError::NoPending => ServiceError::InvalidState("no transition is pending".into()),
            ApplyError::IdMismatch { .. } => {
                ServiceError::InvalidState("pending transition does not match".into())
            }
            ApplyError::PhaseMismatch { expected, actual } => {
                debug!(?expected, ?actual, "phase changed during transition");
                ServiceError::InvalidState("card changed during the update; reload it".into())
            }
            ApplyError::VersionMismatch { expected, actual } => {
                ServiceError::InvalidState(format!(
                    "state version mismatch during transition (expected {expected}, got {actual})"
                ))
            }
        }
    }
}

impl From<AbortError> for ServiceError {
    fn from(err: AbortError) -> Self {
        match err {
            AbortError::NoPending => ServiceError::InvalidState("no pending transition".into()),
            AbortError::IdMismatch { .. } => {
                ServiceError::InvalidState("transition plan does not match".into())
            }
        }
    }
}
