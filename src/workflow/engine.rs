use chrono::{DateTime, FixedOffset, NaiveDate, SubsecRound, Utc};
use tracing::{debug, info, instrument, warn};

use crate::model::leave_application::{LeaveApplication, LeaveType, NewLeaveApplication};
use crate::model::role::Role;
use crate::model::user::User;

use super::actor::Actor;
use super::error::WorkflowError;
use super::policy::{self, ApplicationScope, Capability};
use super::state::{LeaveAction, next_status};
use super::store::{ApplicationStore, StatusPatch, UserDirectory};
use super::summary::{ApplicationSummary, summarize};

/// Content of a new leave application as submitted by a student.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaveRequest {
    pub leave_type: LeaveType,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub reason: String,
}

impl LeaveRequest {
    /// Inclusive day count of the requested range.
    pub fn number_of_days(&self) -> Result<u32, WorkflowError> {
        let days = (self.to_date - self.from_date).num_days() + 1;
        if days <= 0 {
            return Err(WorkflowError::InvalidDateRange);
        }
        u32::try_from(days).map_err(|_| WorkflowError::InvalidDateRange)
    }
}

pub struct LeaveWorkflow<S, D> {
    store: S,
    directory: D,
}

impl<S, D> LeaveWorkflow<S, D>
where
    S: ApplicationStore,
    D: UserDirectory,
{
    pub fn new(store: S, directory: D) -> Self {
        Self { store, directory }
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Files a new application for `student_id` and routes it to its reviewers.
    #[instrument(skip(self, actor, request), fields(actor_id = actor.id))]
    pub async fn create_application(
        &self,
        actor: &Actor,
        student_id: u64,
        request: LeaveRequest,
    ) -> Result<LeaveApplication, WorkflowError> {
        policy::require(actor, Capability::Create)?;
        if actor.id != student_id {
            return Err(WorkflowError::Forbidden);
        }

        let number_of_days = request.number_of_days()?;

        let student = self
            .directory
            .user(student_id)
            .await?
            .ok_or(WorkflowError::NotFound)?;
        if student.role() != Some(Role::Student) {
            return Err(WorkflowError::Forbidden);
        }

        let faculty = self.resolve_faculty(&student).await?;
        let hod = self.resolve_hod(&student.department).await?;

        let new = NewLeaveApplication {
            student_id,
            faculty_id: faculty.id,
            hod_id: hod.id,
            department: student.department,
            leave_type: request.leave_type,
            from_date: request.from_date,
            to_date: request.to_date,
            number_of_days,
            reason: request.reason,
            created_at: now(),
        };

        let application = self.store.insert(new).await?;
        info!(
            application_id = application.id,
            faculty_id = application.faculty_id,
            hod_id = application.hod_id,
            days = application.number_of_days,
            "Leave application submitted"
        );
        Ok(application)
    }

    async fn resolve_faculty(&self, student: &User) -> Result<User, WorkflowError> {
        let (Some(year), Some(section)) = (student.year, student.section.as_deref()) else {
            warn!(student_id = student.id, "Student has no year/section on record");
            return Err(WorkflowError::NoAssignedFaculty);
        };

        let candidates = self
            .directory
            .faculty_for(&student.department, year, section)
            .await?;
        exactly_one(candidates).ok_or_else(|| {
            warn!(
                student_id = student.id,
                department = %student.department,
                year,
                section,
                "Faculty assignment is missing or ambiguous"
            );
            WorkflowError::NoAssignedFaculty
        })
    }

    async fn resolve_hod(&self, department: &str) -> Result<User, WorkflowError> {
        let candidates = self.directory.hods_for(department).await?;
        exactly_one(candidates).ok_or_else(|| {
            warn!(department, "HOD assignment is missing or ambiguous");
            WorkflowError::NoAssignedHod
        })
    }

    pub async fn list_visible_applications(
        &self,
        actor: &Actor,
    ) -> Result<Vec<LeaveApplication>, WorkflowError> {
        policy::require(actor, Capability::Read)?;

        let scope = ApplicationScope::for_actor(actor);
        let mut applications = self.store.find(&scope).await?;
        applications.retain(|app| scope.contains(app));

        debug!(actor_id = actor.id, count = applications.len(), "Listed visible applications");
        Ok(applications)
    }

    pub async fn get_visible_application(
        &self,
        actor: &Actor,
        application_id: u64,
    ) -> Result<LeaveApplication, WorkflowError> {
        policy::require(actor, Capability::Read)?;

        let application = self
            .store
            .get(application_id)
            .await?
            .ok_or(WorkflowError::NotFound)?;
        policy::require_in_scope(actor, Capability::Read, &application)?;
        Ok(application)
    }

    /// Applies a review decision.
    ///
    /// The write is conditioned on the status read here; if another request
    /// moved the application in between, this one fails with `InvalidTransition`
    /// and the stored record is left as the winner wrote it.
    #[instrument(skip(self, actor, rejection_reason), fields(actor_id = actor.id, role = %actor.role))]
    pub async fn transition(
        &self,
        actor: &Actor,
        application_id: u64,
        action: LeaveAction,
        rejection_reason: Option<String>,
    ) -> Result<LeaveApplication, WorkflowError> {
        policy::require(actor, Capability::Transition)?;

        let current = self
            .store
            .get(application_id)
            .await?
            .ok_or(WorkflowError::NotFound)?;
        policy::require_in_scope(actor, Capability::Transition, &current)?;

        let next = next_status(current.status, actor.role, action)?;

        let rejection_reason = match action {
            LeaveAction::Approve => None,
            LeaveAction::Reject => {
                let reason = rejection_reason
                    .map(|r| r.trim().to_string())
                    .filter(|r| !r.is_empty())
                    .ok_or(WorkflowError::MissingRejectionReason)?;
                Some(reason)
            }
        };

        let patch = StatusPatch {
            status: next,
            rejection_reason,
            updated_at: now(),
        };

        let applied = self
            .store
            .conditional_update(application_id, current.status, &patch)
            .await?;
        if !applied {
            warn!(
                application_id,
                expected = %current.status,
                "Lost transition race, status changed concurrently"
            );
            return Err(WorkflowError::InvalidTransition {
                from: current.status,
                action,
            });
        }

        let from = current.status;
        let updated = patch.applied_to(current);
        info!(
            application_id,
            from = %from,
            to = %updated.status,
            "Leave application transitioned"
        );
        Ok(updated)
    }

    pub async fn summarize_visible(
        &self,
        actor: &Actor,
        now: DateTime<Utc>,
        offset: FixedOffset,
    ) -> Result<ApplicationSummary, WorkflowError> {
        let applications = self.list_visible_applications(actor).await?;
        Ok(summarize(&applications, now, offset))
    }

    /// Number of faculty in the actor's department; only reported to HODs.
    pub async fn department_faculty_count(
        &self,
        actor: &Actor,
    ) -> Result<Option<u64>, WorkflowError> {
        if actor.role != Role::Hod {
            return Ok(None);
        }
        let count = self.directory.faculty_count(&actor.department).await?;
        Ok(Some(count))
    }
}

// Stored timestamps have microsecond precision.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn exactly_one<T>(candidates: Vec<T>) -> Option<T> {
    let mut iter = candidates.into_iter();
    match (iter.next(), iter.next()) {
        (Some(only), None) => Some(only),
        _ => None,
    }
}
