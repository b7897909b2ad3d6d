use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, MySqlPool};

use crate::model::leave_application::{
    ApplicationStatus, LeaveApplication, LeaveType, NewLeaveApplication,
};
use crate::workflow::{ApplicationScope, ApplicationStore, StatusPatch, StoreError};

const SELECT_COLUMNS: &str = r#"
    SELECT id, student_id, faculty_id, hod_id, department, leave_type,
           from_date, to_date, number_of_days, reason, status,
           rejection_reason, created_at, updated_at
    FROM leave_applications
"#;

#[derive(FromRow)]
struct LeaveApplicationRow {
    id: u64,
    student_id: u64,
    faculty_id: u64,
    hod_id: u64,
    department: String,
    leave_type: String,
    from_date: NaiveDate,
    to_date: NaiveDate,
    number_of_days: u32,
    reason: String,
    status: String,
    rejection_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<LeaveApplicationRow> for LeaveApplication {
    type Error = StoreError;

    fn try_from(row: LeaveApplicationRow) -> Result<Self, Self::Error> {
        let corrupt = |detail: String| StoreError::Corrupt { id: row.id, detail };

        let leave_type = LeaveType::from_str(&row.leave_type)
            .map_err(|_| corrupt(format!("unknown leave type {:?}", row.leave_type)))?;
        let status = ApplicationStatus::from_str(&row.status)
            .map_err(|_| corrupt(format!("unknown status {:?}", row.status)))?;

        Ok(LeaveApplication {
            id: row.id,
            student_id: row.student_id,
            faculty_id: row.faculty_id,
            hod_id: row.hod_id,
            department: row.department,
            leave_type,
            from_date: row.from_date,
            to_date: row.to_date,
            number_of_days: row.number_of_days,
            reason: row.reason,
            status,
            rejection_reason: row.rejection_reason,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
}

#[derive(Clone)]
pub struct MySqlApplicationStore {
    pool: MySqlPool,
}

impl MySqlApplicationStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

impl ApplicationStore for MySqlApplicationStore {
    async fn insert(&self, new: NewLeaveApplication) -> Result<LeaveApplication, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO leave_applications
                (student_id, faculty_id, hod_id, department, leave_type, from_date, to_date,
                 number_of_days, reason, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.student_id)
        .bind(new.faculty_id)
        .bind(new.hod_id)
        .bind(&new.department)
        .bind(new.leave_type.as_ref())
        .bind(new.from_date)
        .bind(new.to_date)
        .bind(new.number_of_days)
        .bind(&new.reason)
        .bind(ApplicationStatus::PendingFaculty.as_ref())
        .bind(new.created_at)
        .bind(new.created_at)
        .execute(&self.pool)
        .await?;

        Ok(new.into_application(result.last_insert_id()))
    }

    async fn get(&self, id: u64) -> Result<Option<LeaveApplication>, StoreError> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?");
        let row = sqlx::query_as::<_, LeaveApplicationRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(LeaveApplication::try_from).transpose()
    }

    async fn find(&self, scope: &ApplicationScope) -> Result<Vec<LeaveApplication>, StoreError> {
        let (column, value) = match scope {
            ApplicationScope::Student(id) => ("student_id", FilterValue::U64(*id)),
            ApplicationScope::Faculty(id) => ("faculty_id", FilterValue::U64(*id)),
            ApplicationScope::Department(department) => {
                ("department", FilterValue::Str(department.as_str()))
            }
        };
        let sql = format!("{SELECT_COLUMNS} WHERE {column} = ? ORDER BY created_at DESC, id DESC");

        let query = sqlx::query_as::<_, LeaveApplicationRow>(&sql);
        let query = match value {
            FilterValue::U64(v) => query.bind(v),
            FilterValue::Str(s) => query.bind(s),
        };

        query
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(LeaveApplication::try_from)
            .collect()
    }

    async fn conditional_update(
        &self,
        id: u64,
        expected: ApplicationStatus,
        patch: &StatusPatch,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE leave_applications
            SET status = ?, rejection_reason = ?, updated_at = ?
            WHERE id = ?
            AND status = ?
            "#,
        )
        .bind(patch.status.as_ref())
        .bind(patch.rejection_reason.as_deref())
        .bind(patch.updated_at)
        .bind(id)
        .bind(expected.as_ref())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
