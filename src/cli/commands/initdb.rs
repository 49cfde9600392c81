use anyhow::Result;
use migration::{Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;
use tracing::{debug, error, info, trace};

/// Connect to `database_url` and apply every pending migration.
pub async fn migrated_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Database URL: {}", database_url);

    let db = match store::connect(database_url).await {
        Ok(connection) => connection,
        Err(e) => {
            error!("Failed to connect to database '{}': {}", database_url, e);
            return Err(e.into());
        }
    };

    info!("Running database migrations");
    trace!("Executing migration up command");
    if let Err(e) = Migrator::up(&db, None).await {
        error!("Failed to run database migrations: {}", e);
        return Err(e.into());
    }
    debug!("All pending migrations have been applied");

    Ok(db)
}

pub async fn init_database(database_url: &str) -> Result<()> {
    info!("Initializing database");
    migrated_connection(database_url).await?;
    info!("Database initialization completed successfully!");
    Ok(())
}
