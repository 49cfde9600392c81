use chrono::NaiveDate;
use migration::{Migrator, MigratorTrait};
use model::entities::{account, category};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;

use crate::account::NewAccount;
use crate::category::NewCategory;

/// Create an in-memory SQLite database with all migrations applied.
pub async fn setup_db() -> DatabaseConnection {
    let db = crate::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

pub async fn groceries(db: &DatabaseConnection) -> category::Model {
    crate::category::create(
        db,
        NewCategory::expense("Groceries", category::ExpenseType::Variable),
    )
    .await
    .expect("Failed to create category")
}

pub async fn salary(db: &DatabaseConnection) -> category::Model {
    crate::category::create(db, NewCategory::income("Salary"))
        .await
        .expect("Failed to create category")
}

pub async fn main_account(db: &DatabaseConnection) -> account::Model {
    crate::account::create(
        db,
        NewAccount::new("Main", account::AccountType::Main).with_balance(Decimal::new(1000, 0)),
    )
    .await
    .expect("Failed to create account")
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}
