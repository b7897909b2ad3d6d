use sqlx::MySqlPool;

use crate::model::role::Role;
use crate::model::user::User;
use crate::workflow::{StoreError, UserDirectory};

pub const USER_COLUMNS: &str = r#"
    SELECT id, college_email, password, name, role_id, department, year, section,
           roll_no, degree, assigned_year, assigned_section, is_active
    FROM users
"#;

#[derive(Clone)]
pub struct MySqlUserDirectory {
    pool: MySqlPool,
}

impl MySqlUserDirectory {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

impl UserDirectory for MySqlUserDirectory {
    async fn user(&self, id: u64) -> Result<Option<User>, StoreError> {
        let sql = format!("{USER_COLUMNS} WHERE id = ?");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn faculty_for(
        &self,
        department: &str,
        year: u8,
        section: &str,
    ) -> Result<Vec<User>, StoreError> {
        let sql = format!(
            "{USER_COLUMNS} WHERE role_id = ? AND is_active = TRUE \
             AND department = ? AND assigned_year = ? AND assigned_section = ?"
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(Role::Faculty.id())
            .bind(department.trim())
            .bind(year)
            .bind(section.trim())
            .fetch_all(&self.pool)
            .await?)
    }

    async fn hods_for(&self, department: &str) -> Result<Vec<User>, StoreError> {
        let sql = format!("{USER_COLUMNS} WHERE role_id = ? AND is_active = TRUE AND department = ?");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(Role::Hod.id())
            .bind(department.trim())
            .fetch_all(&self.pool)
            .await?)
    }

    async fn faculty_count(&self, department: &str) -> Result<u64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE role_id = ? AND is_active = TRUE AND department = ?",
        )
        .bind(Role::Faculty.id())
        .bind(department.trim())
        .fetch_one(&self.pool)
        .await?;

        Ok(count.max(0) as u64)
    }
}
