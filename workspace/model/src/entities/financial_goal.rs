use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::account;

/// A savings target, optionally tracked against an account.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "financial_goals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub target_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub current_amount: Decimal,
    #[sea_orm(default_value = "RUB")]
    pub currency: String,
    pub deadline: Option<NaiveDate>,
    pub account_id: Option<String>,
    #[sea_orm(default_value = "false")]
    pub is_completed: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "account::Entity",
        from = "Column::AccountId",
        to = "account::Column::Id",
        on_delete = "Restrict"
    )]
    Account,
}

impl Related<account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

stamped_behavior!();
