use anyhow::{Context, Result};

use super::initdb::migrated_connection;

pub async fn print_settings(database_url: &str) -> Result<()> {
    let db = migrated_connection(database_url).await?;
    let settings = store::settings::load(&db).await?;

    let json = serde_json::to_string_pretty(&settings).context("Failed to render settings")?;
    println!("{json}");
    Ok(())
}
