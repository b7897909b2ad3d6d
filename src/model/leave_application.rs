use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveType {
    Sick,
    Casual,
    Medical,
    Personal,
    Emergency,
    OnDuty,
}

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Display, EnumString,
    AsRefStr, EnumIter, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    PendingFaculty,
    PendingHod,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "student_id": 1000,
    "faculty_id": 2000,
    "hod_id": 3000,
    "department": "CSE",
    "leave_type": "SICK",
    "from_date": "2024-03-01",
    "to_date": "2024-03-03",
    "number_of_days": 3,
    "reason": "fever",
    "status": "PENDING_FACULTY",
    "rejection_reason": null,
    "created_at": "2024-02-28T09:00:00Z",
    "updated_at": "2024-02-28T09:00:00Z"
}))]
pub struct LeaveApplication {
    pub id: u64,
    pub student_id: u64,
    pub faculty_id: u64,
    pub hod_id: u64,
    pub department: String,
    pub leave_type: LeaveType,
    #[schema(format = "date", value_type = String)]
    pub from_date: NaiveDate,
    #[schema(format = "date", value_type = String)]
    pub to_date: NaiveDate,
    pub number_of_days: u32,
    pub reason: String,
    pub status: ApplicationStatus,
    pub rejection_reason: Option<String>,
    #[schema(format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(format = "date-time", value_type = String)]
    pub updated_at: DateTime<Utc>,
}

/// Application content fixed at creation, before the store assigns an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLeaveApplication {
    pub student_id: u64,
    pub faculty_id: u64,
    pub hod_id: u64,
    pub department: String,
    pub leave_type: LeaveType,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub number_of_days: u32,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl NewLeaveApplication {
    pub fn into_application(self, id: u64) -> LeaveApplication {
        LeaveApplication {
            id,
            student_id: self.student_id,
            faculty_id: self.faculty_id,
            hod_id: self.hod_id,
            department: self.department,
            leave_type: self.leave_type,
            from_date: self.from_date,
            to_date: self.to_date,
            number_of_days: self.number_of_days,
            reason: self.reason,
            status: ApplicationStatus::PendingFaculty,
            rejection_reason: None,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}
