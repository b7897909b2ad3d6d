use chrono::{DateTime, Datelike, FixedOffset, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::leave_application::{ApplicationStatus, LeaveApplication};

/// Status buckets of a set of applications. Always derived, never stored.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ApplicationSummary {
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
    pub total: u64,
    /// Applications whose status changed on the current local day.
    pub today_count: u64,
    /// Applications created in the current local month.
    pub this_month: u64,
}

/// `PENDING_HOD` counts as pending for every caller, faculty included.
pub fn summarize(
    applications: &[LeaveApplication],
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> ApplicationSummary {
    let local_now = now.with_timezone(&offset);
    let today = local_now.date_naive();

    applications
        .iter()
        .fold(ApplicationSummary::default(), |mut summary, app| {
            match app.status {
                ApplicationStatus::PendingFaculty | ApplicationStatus::PendingHod => {
                    summary.pending += 1
                }
                ApplicationStatus::Approved => summary.approved += 1,
                ApplicationStatus::Rejected => summary.rejected += 1,
            }
            summary.total += 1;

            if app.updated_at > app.created_at
                && app.updated_at.with_timezone(&offset).date_naive() == today
            {
                summary.today_count += 1;
            }

            let created = app.created_at.with_timezone(&offset);
            if created.year() == local_now.year() && created.month() == local_now.month() {
                summary.this_month += 1;
            }

            summary
        })
}
