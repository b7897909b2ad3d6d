use crate::model::leave_application::ApplicationStatus;

use super::state::LeaveAction;
use super::store::StoreError;

/// Typed failures of the workflow. None of them leaves a partial write behind.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("leave application not found")]
    NotFound,
    #[error("operation not permitted for this user")]
    Forbidden,
    #[error("cannot {action} an application that is {from}")]
    InvalidTransition {
        from: ApplicationStatus,
        action: LeaveAction,
    },
    #[error("a rejection reason is required")]
    MissingRejectionReason,
    #[error("no unique faculty reviewer is assigned to this student")]
    NoAssignedFaculty,
    #[error("no unique head of department is assigned to this department")]
    NoAssignedHod,
    #[error("to_date must not be before from_date")]
    InvalidDateRange,
    #[error(transparent)]
    Store(#[from] StoreError),
}
