use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

use crate::store::StoreError;

/// Caller-facing failure taxonomy for the engine commands.
///
/// `StoreError::Conflict` never appears here directly: the engine retries
/// conflicted writes internally and surfaces `Store` only once the retry
/// budget is spent.
#[derive(Debug, Display)]
pub enum EngineError {
    #[display(fmt = "missing required field: {}", field)]
    Validation { field: &'static str },

    #[display(fmt = "roll number {} is already registered", roll)]
    DuplicateStudent { roll: String },

    #[display(fmt = "student not found")]
    NotFound,

    #[display(fmt = "storage failure: {}", _0)]
    Store(StoreError),
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => EngineError::NotFound,
            other => EngineError::Store(other),
        }
    }
}

impl ResponseError for EngineError {
    fn status_code(&self) -> StatusCode {
        match self {
            EngineError::Validation { .. } => StatusCode::BAD_REQUEST,
            EngineError::DuplicateStudent { .. } => StatusCode::CONFLICT,
            EngineError::NotFound => StatusCode::NOT_FOUND,
            EngineError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            // Do not leak backend detail to clients.
            EngineError::Store(e) => {
                tracing::error!(error = %e, "Storage failure surfaced to client");
                "Something went wrong, Contact with system admin".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}
