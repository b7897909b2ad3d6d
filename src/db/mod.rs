use anyhow::Context;
use sqlx::MySqlPool;
use tracing::info;

pub mod applications;
pub mod users;

pub use applications::MySqlApplicationStore;
pub use users::MySqlUserDirectory;

pub async fn init_db(database_url: &str) -> anyhow::Result<MySqlPool> {
    let pool = MySqlPool::connect(database_url)
        .await
        .context("failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run database migrations")?;
    info!("Database migrations applied");

    Ok(pool)
}
