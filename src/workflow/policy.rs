use crate::model::leave_application::LeaveApplication;
use crate::model::role::Role;

use super::actor::Actor;
use super::error::WorkflowError;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Capability {
    Create,
    Read,
    Transition,
}

/// Role-level capability table. Record-level scoping is `ApplicationScope`.
pub fn permits(role: Role, capability: Capability) -> bool {
    matches!(
        (role, capability),
        (Role::Student, Capability::Create | Capability::Read)
            | (Role::Faculty, Capability::Read | Capability::Transition)
            | (Role::Hod, Capability::Read | Capability::Transition)
    )
}

pub fn require(actor: &Actor, capability: Capability) -> Result<(), WorkflowError> {
    if permits(actor.role, capability) {
        Ok(())
    } else {
        Err(WorkflowError::Forbidden)
    }
}

/// Checks the role capability and that `application` lies within the actor's scope.
pub fn require_in_scope(
    actor: &Actor,
    capability: Capability,
    application: &LeaveApplication,
) -> Result<(), WorkflowError> {
    require(actor, capability)?;
    if ApplicationScope::for_actor(actor).contains(application) {
        Ok(())
    } else {
        Err(WorkflowError::Forbidden)
    }
}

/// The set of applications an actor may see.
///
/// Faculty see every application routed to them: an application can only leave
/// `PENDING_FACULTY` through its faculty's own decision, so this is exactly the
/// pending queue plus their review history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplicationScope {
    Student(u64),
    Faculty(u64),
    Department(String),
}

impl ApplicationScope {
    pub fn for_actor(actor: &Actor) -> Self {
        match actor.role {
            Role::Student => ApplicationScope::Student(actor.id),
            Role::Faculty => ApplicationScope::Faculty(actor.id),
            Role::Hod => ApplicationScope::Department(actor.department.clone()),
        }
    }

    pub fn contains(&self, application: &LeaveApplication) -> bool {
        match self {
            ApplicationScope::Student(id) => application.student_id == *id,
            ApplicationScope::Faculty(id) => application.faculty_id == *id,
            ApplicationScope::Department(department) => {
                application.department.eq_ignore_ascii_case(department)
            }
        }
    }
}
