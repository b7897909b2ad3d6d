use serde::{Deserialize, Serialize};

use super::role::Role;
use crate::workflow::Actor;

/// Identity record as stored in `users`. Scoping attributes depend on the role:
/// students carry `year`/`section`, faculty carry `assigned_year`/`assigned_section`,
/// and everyone carries a `department`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: u64,
    pub college_email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub name: String,
    pub role_id: u8,
    pub department: String,
    pub year: Option<u8>,
    pub section: Option<String>,
    pub roll_no: Option<String>,
    pub degree: Option<String>,
    pub assigned_year: Option<u8>,
    pub assigned_section: Option<String>,
    pub is_active: bool,
}

impl User {
    pub fn role(&self) -> Option<Role> {
        Role::from_id(self.role_id)
    }

    pub fn actor(&self) -> Option<Actor> {
        Some(Actor {
            id: self.id,
            role: self.role()?,
            department: self.department.clone(),
            year: self.year,
            section: self.section.clone(),
            assigned_year: self.assigned_year,
            assigned_section: self.assigned_section.clone(),
        })
    }
}
