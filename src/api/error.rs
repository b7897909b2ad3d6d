use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use tracing::error;

use crate::workflow::WorkflowError;

impl ResponseError for WorkflowError {
    fn status_code(&self) -> StatusCode {
        match self {
            WorkflowError::NotFound => StatusCode::NOT_FOUND,
            WorkflowError::Forbidden => StatusCode::FORBIDDEN,
            WorkflowError::InvalidTransition { .. } => StatusCode::CONFLICT,
            WorkflowError::MissingRejectionReason | WorkflowError::InvalidDateRange => {
                StatusCode::BAD_REQUEST
            }
            WorkflowError::NoAssignedFaculty | WorkflowError::NoAssignedHod => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            WorkflowError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            WorkflowError::Store(e) => {
                error!(error = %e, "Leave store failure");
                "Something went wrong, contact the system admin".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}
