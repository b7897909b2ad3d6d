use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{NaiveDate, TimeZone, Utc};

use crate::model::leave_application::{
    ApplicationStatus, LeaveApplication, LeaveType, NewLeaveApplication,
};
use crate::model::role::Role;
use crate::model::user::User;
use crate::workflow::{
    ApplicationScope, ApplicationStore, LeaveRequest, LeaveWorkflow, StatusPatch, StoreError,
    UserDirectory,
};

pub(crate) const STUDENT: u64 = 100;
pub(crate) const OTHER_STUDENT: u64 = 101;
pub(crate) const UNASSIGNED_STUDENT: u64 = 102;
pub(crate) const ECE_STUDENT: u64 = 103;
pub(crate) const MECH_STUDENT: u64 = 104;
pub(crate) const FACULTY: u64 = 200;
pub(crate) const OTHER_FACULTY: u64 = 201;
pub(crate) const HOD: u64 = 300;
pub(crate) const OTHER_HOD: u64 = 301;

#[derive(Default)]
pub(crate) struct MemoryStore {
    records: Mutex<BTreeMap<u64, LeaveApplication>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub(crate) fn snapshot(&self, id: u64) -> Option<LeaveApplication> {
        self.records.lock().unwrap().get(&id).cloned()
    }

    pub(crate) fn overwrite(&self, application: LeaveApplication) {
        self.records
            .lock()
            .unwrap()
            .insert(application.id, application);
    }
}

impl ApplicationStore for MemoryStore {
    async fn insert(&self, new: NewLeaveApplication) -> Result<LeaveApplication, StoreError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let application = new.into_application(id);
        self.records.lock().unwrap().insert(id, application.clone());
        Ok(application)
    }

    async fn get(&self, id: u64) -> Result<Option<LeaveApplication>, StoreError> {
        Ok(self.snapshot(id))
    }

    async fn find(&self, scope: &ApplicationScope) -> Result<Vec<LeaveApplication>, StoreError> {
        let mut found: Vec<_> = self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|app| scope.contains(app))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(found)
    }

    async fn conditional_update(
        &self,
        id: u64,
        expected: ApplicationStatus,
        patch: &StatusPatch,
    ) -> Result<bool, StoreError> {
        let mut records = self.records.lock().unwrap();
        match records.get_mut(&id) {
            Some(app) if app.status == expected => {
                *app = patch.applied_to(app.clone());
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[derive(Default)]
pub(crate) struct MemoryDirectory {
    users: Vec<User>,
}

impl MemoryDirectory {
    pub(crate) fn with(mut self, user: User) -> Self {
        self.users.push(user);
        self
    }

    fn active(&self, role: Role) -> impl Iterator<Item = &User> {
        self.users
            .iter()
            .filter(move |u| u.is_active && u.role() == Some(role))
    }
}

impl UserDirectory for MemoryDirectory {
    async fn user(&self, id: u64) -> Result<Option<User>, StoreError> {
        Ok(self.users.iter().find(|u| u.id == id).cloned())
    }

    async fn faculty_for(
        &self,
        department: &str,
        year: u8,
        section: &str,
    ) -> Result<Vec<User>, StoreError> {
        Ok(self
            .active(Role::Faculty)
            .filter(|u| {
                u.department.eq_ignore_ascii_case(department)
                    && u.assigned_year == Some(year)
                    && u
                        .assigned_section
                        .as_deref()
                        .is_some_and(|s| s.eq_ignore_ascii_case(section))
            })
            .cloned()
            .collect())
    }

    async fn hods_for(&self, department: &str) -> Result<Vec<User>, StoreError> {
        Ok(self
            .active(Role::Hod)
            .filter(|u| u.department.eq_ignore_ascii_case(department))
            .cloned()
            .collect())
    }

    async fn faculty_count(&self, department: &str) -> Result<u64, StoreError> {
        Ok(self
            .active(Role::Faculty)
            .filter(|u| u.department.eq_ignore_ascii_case(department))
            .count() as u64)
    }
}

fn user(id: u64, role: Role, department: &str) -> User {
    User {
        id,
        college_email: format!("user{id}@college.edu"),
        password: String::new(),
        name: format!("User {id}"),
        role_id: role.id(),
        department: department.to_string(),
        year: None,
        section: None,
        roll_no: None,
        degree: None,
        assigned_year: None,
        assigned_section: None,
        is_active: true,
    }
}

pub(crate) fn student_user(id: u64, department: &str, year: u8, section: &str) -> User {
    User {
        year: Some(year),
        section: Some(section.to_string()),
        roll_no: Some(format!("R{id}")),
        degree: Some("B.Tech".to_string()),
        ..user(id, Role::Student, department)
    }
}

pub(crate) fn faculty_user(id: u64, department: &str, year: u8, section: &str) -> User {
    User {
        assigned_year: Some(year),
        assigned_section: Some(section.to_string()),
        ..user(id, Role::Faculty, department)
    }
}

pub(crate) fn hod_user(id: u64, department: &str) -> User {
    user(id, Role::Hod, department)
}

/// CSE has a complete roster; section 2-B has no faculty; ECE has no HOD;
/// MECH 3-C has two faculty claiming it.
pub(crate) fn directory() -> MemoryDirectory {
    MemoryDirectory::default()
        .with(student_user(STUDENT, "CSE", 2, "A"))
        .with(student_user(OTHER_STUDENT, "CSE", 2, "A"))
        .with(student_user(UNASSIGNED_STUDENT, "CSE", 2, "B"))
        .with(student_user(ECE_STUDENT, "ECE", 1, "A"))
        .with(student_user(MECH_STUDENT, "MECH", 3, "C"))
        .with(faculty_user(FACULTY, "CSE", 2, "A"))
        .with(faculty_user(OTHER_FACULTY, "CSE", 3, "A"))
        .with(faculty_user(210, "ECE", 1, "A"))
        .with(faculty_user(220, "MECH", 3, "C"))
        .with(faculty_user(221, "MECH", 3, "C"))
        .with(hod_user(HOD, "CSE"))
        .with(hod_user(OTHER_HOD, "MECH"))
}

pub(crate) fn workflow() -> LeaveWorkflow<MemoryStore, MemoryDirectory> {
    LeaveWorkflow::new(MemoryStore::default(), directory())
}

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub(crate) fn request(from: NaiveDate, to: NaiveDate) -> LeaveRequest {
    LeaveRequest {
        leave_type: LeaveType::Sick,
        from_date: from,
        to_date: to,
        reason: "fever".to_string(),
    }
}

/// A pending application with fixed timestamps, for pure helpers.
pub(crate) fn application(
    id: u64,
    student_id: u64,
    faculty_id: u64,
    hod_id: u64,
    department: &str,
) -> LeaveApplication {
    let created_at = Utc
        .with_ymd_and_hms(2024, 2, 28, 9, 0, 0)
        .single()
        .expect("valid timestamp");
    LeaveApplication {
        id,
        student_id,
        faculty_id,
        hod_id,
        department: department.to_string(),
        leave_type: LeaveType::Casual,
        from_date: date(2024, 3, 1),
        to_date: date(2024, 3, 3),
        number_of_days: 3,
        reason: "family function".to_string(),
        status: ApplicationStatus::PendingFaculty,
        rejection_reason: None,
        created_at,
        updated_at: created_at,
    }
}

pub(crate) fn assert_status_invariant(application: &LeaveApplication) {
    assert_eq!(
        application.rejection_reason.is_some(),
        application.status == ApplicationStatus::Rejected,
        "rejection_reason must be present iff REJECTED: {application:?}"
    );
}
