//! CRUD operations over the finance tracker's entities.
//!
//! Every write runs inside one database transaction. Drafts are validated
//! before they touch the database, and references are resolved in the same
//! transaction as the write.

pub mod account;
pub mod budget;
pub mod category;
pub mod error;
pub mod financial_goal;
pub mod investment;
pub mod regular_payment;
pub mod settings;
pub mod transaction;

mod validation;

#[cfg(test)]
mod testing;

pub use error::{Result, StoreError};

use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, DbBackend, EntityTrait, PrimaryKeyTrait,
};
use tracing::{debug, info, warn};

/// Connect to the store at `database_url`.
///
/// Foreign key enforcement is switched on for SQLite.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url).await?;

    if db.get_database_backend() == DbBackend::Sqlite {
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;
    }

    info!("Successfully connected to database");
    Ok(db)
}

/// Fetch a record that the operation targets, or fail with `NotFound`.
pub(crate) async fn find_required<E, C>(conn: &C, entity: &'static str, id: &str) -> Result<E::Model>
where
    E: EntityTrait,
    C: ConnectionTrait,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<String>,
{
    match E::find_by_id(id.to_owned()).one(conn).await? {
        Some(model) => Ok(model),
        None => {
            warn!("{} {} not found", entity, id);
            Err(StoreError::not_found(entity, id))
        }
    }
}

/// Check that a record referenced by a draft exists.
///
/// A dangling reference is a malformed draft, so it fails with `Validation`.
pub(crate) async fn ensure_reference<E, C>(conn: &C, entity: &'static str, id: &str) -> Result<()>
where
    E: EntityTrait,
    C: ConnectionTrait,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<String>,
{
    match E::find_by_id(id.to_owned()).one(conn).await? {
        Some(_) => Ok(()),
        None => {
            warn!("Referenced {} {} does not exist", entity, id);
            Err(StoreError::Validation(format!(
                "{} with ID {} does not exist",
                entity, id
            )))
        }
    }
}
