use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Primary key of the only settings row.
pub const SINGLETON_ID: &str = "settings";

/// UI colour scheme.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[sea_orm(string_value = "light")]
    Light,
    #[sea_orm(string_value = "dark")]
    Dark,
}

/// Application configuration. The table holds exactly one row, keyed by
/// [`SINGLETON_ID`].
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(column_type = "Decimal(Some((16, 6)))")]
    pub rub_to_usd_rate: Decimal,
    pub theme: Theme,
    // Income distribution, in percent.
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub mandatory_percent: Decimal,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub variable_percent: Decimal,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub savings_percent: Decimal,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub investments_percent: Decimal,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

stamped_behavior!();

impl Model {
    /// Whether a password has been configured.
    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }
}
