use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

use crate::model::leave_application::ApplicationStatus;
use crate::model::role::Role;

use super::error::WorkflowError;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveAction {
    Approve,
    Reject,
}

/// Transition table of the approval pipeline.
///
/// Only the reviewer role that owns the current stage may move an application
/// forward; everything else, terminal states included, is `InvalidTransition`.
pub fn next_status(
    current: ApplicationStatus,
    role: Role,
    action: LeaveAction,
) -> Result<ApplicationStatus, WorkflowError> {
    use ApplicationStatus::*;

    match (current, role, action) {
        (PendingFaculty, Role::Faculty, LeaveAction::Approve) => Ok(PendingHod),
        (PendingFaculty, Role::Faculty, LeaveAction::Reject) => Ok(Rejected),
        (PendingHod, Role::Hod, LeaveAction::Approve) => Ok(Approved),
        (PendingHod, Role::Hod, LeaveAction::Reject) => Ok(Rejected),
        (from, _, action) => Err(WorkflowError::InvalidTransition { from, action }),
    }
}
