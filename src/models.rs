use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::role::Role;
use crate::model::user::User;
use crate::workflow::Actor;

#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({
    "role": "STUDENT",
    "college_email": "asha@college.edu",
    "password": "correct horse",
    "name": "Asha",
    "department": "CSE",
    "year": 2,
    "section": "A",
    "roll_no": "21CS042",
    "degree": "B.Tech"
}))]
pub struct RegisterReq {
    pub role: Role,
    pub college_email: String,
    pub password: String,
    pub name: String,
    pub department: String,
    pub year: Option<u8>,
    pub section: Option<String>,
    pub roll_no: Option<String>,
    pub degree: Option<String>,
    pub assigned_year: Option<u8>,
    pub assigned_section: Option<String>,
}

impl RegisterReq {
    /// Checks the attributes the approval workflow relies on for each role.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.college_email.trim().is_empty() || self.password.is_empty() {
            return Err("college_email and password must not be empty");
        }
        if self.name.trim().is_empty() || self.department.trim().is_empty() {
            return Err("name and department must not be empty");
        }
        let blank = |v: &Option<String>| v.as_deref().is_none_or(|s| s.trim().is_empty());
        match self.role {
            Role::Student if self.year.is_none() || blank(&self.section) => {
                Err("students must provide year and section")
            }
            Role::Faculty if self.assigned_year.is_none() || blank(&self.assigned_section) => {
                Err("faculty must provide assigned_year and assigned_section")
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginReqDto {
    pub college_email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    pub sub: String,
    pub role: u8, // role id
    pub exp: usize,
    pub jti: String,

    pub token_type: TokenType,

    pub department: String,
    pub year: Option<u8>,
    pub section: Option<String>,
    pub assigned_year: Option<u8>,
    pub assigned_section: Option<String>,
}

impl Claims {
    pub fn for_user(user: &User, token_type: TokenType, exp: usize, jti: String) -> Self {
        Self {
            user_id: user.id,
            sub: user.college_email.clone(),
            role: user.role_id,
            exp,
            jti,
            token_type,
            department: user.department.clone(),
            year: user.year,
            section: user.section.clone(),
            assigned_year: user.assigned_year,
            assigned_section: user.assigned_section.clone(),
        }
    }

    /// Same identity, fresh expiry and jti.
    pub fn reissue(&self, token_type: TokenType, exp: usize, jti: String) -> Self {
        Self {
            token_type,
            exp,
            jti,
            ..self.clone()
        }
    }

    /// `None` when the role id is unknown.
    pub fn actor(&self) -> Option<Actor> {
        Some(Actor {
            id: self.user_id,
            role: Role::from_id(self.role)?,
            department: self.department.clone(),
            year: self.year,
            section: self.section.clone(),
            assigned_year: self.assigned_year,
            assigned_section: self.assigned_section.clone(),
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}
