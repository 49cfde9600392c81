use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{financial_goal, transaction};

/// The kind of account
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    #[sea_orm(string_value = "main")]
    Main,
    #[sea_orm(string_value = "savings")]
    Savings,
    #[sea_orm(string_value = "cash")]
    Cash,
    #[sea_orm(string_value = "investment")]
    Investment,
}

/// Represents a financial holding, like a bank account, a savings pot or cash.
///
/// `balance` is maintained on its own. Recording a transaction against the
/// account does not change it.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    #[sea_orm(column_name = "type")]
    pub kind: AccountType,
    /// ISO 4217 currency code, e.g., "RUB", "USD".
    #[sea_orm(default_value = "RUB")]
    pub currency: String,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub balance: Decimal,
    pub color: Option<String>,
    pub icon: Option<String>,
    #[sea_orm(default_value = "true")]
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transaction,
    #[sea_orm(has_many = "super::financial_goal::Entity")]
    FinancialGoal,
}

impl Related<transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl Related<financial_goal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinancialGoal.def()
    }
}

stamped_behavior!();
