use anyhow::Result;
use tracing::info;

use super::initdb::migrated_connection;

pub async fn seed_database(database_url: &str) -> Result<()> {
    let db = migrated_connection(database_url).await?;

    let inserted = store::category::seed_defaults(&db).await?;
    store::settings::load(&db).await?;

    info!("Seeding finished, {} default categories inserted", inserted);
    println!("Inserted {inserted} default categories");
    Ok(())
}
