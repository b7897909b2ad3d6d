use chrono::{DateTime, Utc};

use crate::model::leave_application::{ApplicationStatus, LeaveApplication, NewLeaveApplication};
use crate::model::user::User;

use super::policy::ApplicationScope;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("stored record {id} is unreadable: {detail}")]
    Corrupt { id: u64, detail: String },
}

/// Fields written by a status transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPatch {
    pub status: ApplicationStatus,
    pub rejection_reason: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl StatusPatch {
    /// The record as this patch leaves it.
    pub fn applied_to(&self, application: LeaveApplication) -> LeaveApplication {
        LeaveApplication {
            status: self.status,
            rejection_reason: self.rejection_reason.clone(),
            updated_at: self.updated_at,
            ..application
        }
    }
}

/// Durable storage for leave applications.
#[allow(async_fn_in_trait)]
pub trait ApplicationStore {
    async fn insert(&self, new: NewLeaveApplication) -> Result<LeaveApplication, StoreError>;

    async fn get(&self, id: u64) -> Result<Option<LeaveApplication>, StoreError>;

    /// Newest first.
    async fn find(&self, scope: &ApplicationScope) -> Result<Vec<LeaveApplication>, StoreError>;

    /// Applies `patch` only while the stored status still equals `expected`.
    ///
    /// Returns `false` when the precondition no longer holds, which is how a
    /// concurrent writer that got there first shows up.
    async fn conditional_update(
        &self,
        id: u64,
        expected: ApplicationStatus,
        patch: &StatusPatch,
    ) -> Result<bool, StoreError>;
}

/// Read-only view of registered users, used to resolve reviewers.
#[allow(async_fn_in_trait)]
pub trait UserDirectory {
    async fn user(&self, id: u64) -> Result<Option<User>, StoreError>;

    /// Active faculty whose assignment covers `(department, year, section)`.
    async fn faculty_for(
        &self,
        department: &str,
        year: u8,
        section: &str,
    ) -> Result<Vec<User>, StoreError>;

    async fn hods_for(&self, department: &str) -> Result<Vec<User>, StoreError>;

    async fn faculty_count(&self, department: &str) -> Result<u64, StoreError>;
}
