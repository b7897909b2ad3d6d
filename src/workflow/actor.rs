use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::role::Role;

/// The authenticated identity attempting an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Actor {
    pub id: u64,
    pub role: Role,
    pub department: String,
    pub year: Option<u8>,
    pub section: Option<String>,
    pub assigned_year: Option<u8>,
    pub assigned_section: Option<String>,
}

#[cfg(test)]
impl Actor {
    pub fn student(id: u64, department: &str, year: u8, section: &str) -> Self {
        Self {
            id,
            role: Role::Student,
            department: department.to_string(),
            year: Some(year),
            section: Some(section.to_string()),
            assigned_year: None,
            assigned_section: None,
        }
    }

    pub fn faculty(id: u64, department: &str, assigned_year: u8, assigned_section: &str) -> Self {
        Self {
            id,
            role: Role::Faculty,
            department: department.to_string(),
            year: None,
            section: None,
            assigned_year: Some(assigned_year),
            assigned_section: Some(assigned_section.to_string()),
        }
    }

    pub fn hod(id: u64, department: &str) -> Self {
        Self {
            id,
            role: Role::Hod,
            department: department.to_string(),
            year: None,
            section: None,
            assigned_year: None,
            assigned_section: None,
        }
    }
}
