use anyhow::Context;
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection, sqlx::PgPool};

pub async fn setup_database(db_url: &str) -> anyhow::Result<(DatabaseConnection, PgPool)> {
    let db = Database::connect(db_url)
        .await
        .context("cannot connect to database")?;
    Migrator::up(&db, None).await.context("migrations failed")?;

    let pool = PgPool::connect(db_url).await?;

    Ok((db, pool))
}
