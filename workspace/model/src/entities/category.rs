use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub use super::transaction::TransactionType;

/// How discretionary an expense category is.
/// Only meaningful for expense categories.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ExpenseType {
    #[sea_orm(string_value = "mandatory")]
    Mandatory,
    #[sea_orm(string_value = "variable")]
    Variable,
    #[sea_orm(string_value = "discretionary")]
    Discretionary,
}

/// Classification bucket for transactions, budgets and regular payments.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    /// Set on categories inserted by the starter seed.
    #[sea_orm(default_value = "false")]
    pub is_default: bool,
    #[sea_orm(column_name = "type")]
    pub kind: TransactionType,
    /// `None` for income categories.
    pub expense_type: Option<ExpenseType>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transaction,
    #[sea_orm(has_many = "super::budget::Entity")]
    Budget,
    #[sea_orm(has_many = "super::regular_payment::Entity")]
    RegularPayment,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl Related<super::budget::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budget.def()
    }
}

impl Related<super::regular_payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RegularPayment.def()
    }
}

stamped_behavior!();
