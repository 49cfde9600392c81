//! Accounts and their delete policies.
//!
//! `balance` is stored as given. Nothing in this crate derives it from
//! transactions.

use chrono::Utc;
use model::DEFAULT_CURRENCY;
use model::entities::account::{self, AccountType};
use model::entities::{financial_goal, transaction};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::validation::{currency_code, not_blank};
use crate::{Result, StoreError, find_required};

const ENTITY: &str = "Account";

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct NewAccount {
    #[validate(custom(function = "not_blank"), length(max = 100))]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AccountType,
    #[serde(default = "default_currency")]
    #[validate(custom(function = "currency_code"))]
    pub currency: String,
    #[serde(default)]
    pub balance: Decimal,
    #[validate(length(max = 32))]
    pub color: Option<String>,
    #[validate(length(max = 32))]
    pub icon: Option<String>,
    #[serde(default = "active")]
    pub is_active: bool,
}

impl NewAccount {
    pub fn new(name: &str, kind: AccountType) -> Self {
        Self {
            name: name.to_string(),
            kind,
            currency: default_currency(),
            balance: Decimal::ZERO,
            color: None,
            icon: None,
            is_active: true,
        }
    }

    pub fn with_balance(mut self, balance: Decimal) -> Self {
        self.balance = balance;
        self
    }

    fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self
    }

    fn assign(self, active: &mut account::ActiveModel) {
        active.name = Set(self.name);
        active.kind = Set(self.kind);
        active.currency = Set(self.currency);
        active.balance = Set(self.balance);
        active.color = Set(self.color);
        active.icon = Set(self.icon);
        active.is_active = Set(self.is_active);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AccountPatch {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<AccountType>,
    pub currency: Option<String>,
    pub balance: Option<Decimal>,
    pub color: Option<Option<String>>,
    pub icon: Option<Option<String>>,
    pub is_active: Option<bool>,
}

impl AccountPatch {
    fn apply(self, current: &account::Model) -> NewAccount {
        NewAccount {
            name: self.name.unwrap_or_else(|| current.name.clone()),
            kind: self.kind.unwrap_or(current.kind),
            currency: self.currency.unwrap_or_else(|| current.currency.clone()),
            balance: self.balance.unwrap_or(current.balance),
            color: self.color.unwrap_or_else(|| current.color.clone()),
            icon: self.icon.unwrap_or_else(|| current.icon.clone()),
            is_active: self.is_active.unwrap_or(current.is_active),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountFilter {
    pub kind: Option<AccountType>,
    pub is_active: Option<bool>,
}

/// Records that point at an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dependents {
    pub transactions: u64,
    pub financial_goals: u64,
}

impl Dependents {
    pub fn is_empty(&self) -> bool {
        self.transactions == 0 && self.financial_goals == 0
    }
}

async fn count_dependents<C: ConnectionTrait>(conn: &C, id: &str) -> Result<Dependents> {
    Ok(Dependents {
        transactions: transaction::Entity::find()
            .filter(transaction::Column::AccountId.eq(id))
            .count(conn)
            .await?,
        financial_goals: financial_goal::Entity::find()
            .filter(financial_goal::Column::AccountId.eq(id))
            .count(conn)
            .await?,
    })
}

#[instrument(skip(db))]
pub async fn create(db: &DatabaseConnection, new: NewAccount) -> Result<account::Model> {
    debug!("Creating account: {}", new.name);
    let new = new.normalized();
    new.validate()?;

    let mut active = account::ActiveModel {
        ..Default::default()
    };
    new.assign(&mut active);
    let txn = db.begin().await?;
    let created = active.insert(&txn).await?;
    txn.commit().await?;

    info!("Account created successfully with ID: {}", created.id);
    Ok(created)
}

#[instrument(skip(db))]
pub async fn get(db: &DatabaseConnection, id: &str) -> Result<account::Model> {
    find_required::<account::Entity, _>(db, ENTITY, id).await
}

#[instrument(skip(db))]
pub async fn update(
    db: &DatabaseConnection,
    id: &str,
    patch: AccountPatch,
) -> Result<account::Model> {
    debug!("Updating account with ID: {}", id);
    let txn = db.begin().await?;

    let current = find_required::<account::Entity, _>(&txn, ENTITY, id).await?;
    let draft = patch.apply(&current).normalized();
    draft.validate()?;

    let mut active: account::ActiveModel = current.into();
    draft.assign(&mut active);
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    info!("Account {} updated successfully", id);
    Ok(updated)
}

#[instrument(skip(db))]
pub async fn list(db: &DatabaseConnection, filter: AccountFilter) -> Result<Vec<account::Model>> {
    let mut query = account::Entity::find();
    if let Some(kind) = filter.kind {
        query = query.filter(account::Column::Kind.eq(kind));
    }
    if let Some(is_active) = filter.is_active {
        query = query.filter(account::Column::IsActive.eq(is_active));
    }

    let accounts = query
        .order_by_asc(account::Column::CreatedAt)
        .order_by_asc(account::Column::Id)
        .all(db)
        .await?;
    debug!("Retrieved {} accounts", accounts.len());
    Ok(accounts)
}

/// Count the records that reference the account.
#[instrument(skip(db))]
pub async fn dependents(db: &DatabaseConnection, id: &str) -> Result<Dependents> {
    find_required::<account::Entity, _>(db, ENTITY, id).await?;
    count_dependents(db, id).await
}

/// Delete an account nothing refers to.
///
/// Fails with `ConstraintViolation` while transactions or goals point at it.
#[instrument(skip(db))]
pub async fn delete(db: &DatabaseConnection, id: &str) -> Result<()> {
    debug!("Deleting account with ID: {}", id);
    let txn = db.begin().await?;

    let existing = find_required::<account::Entity, _>(&txn, ENTITY, id).await?;
    let dependents = count_dependents(&txn, id).await?;
    if !dependents.is_empty() {
        warn!(?dependents, "Account {} is still referenced", id);
        return Err(StoreError::ConstraintViolation(format!(
            "Account {} is referenced by {} transactions and {} financial goals",
            id, dependents.transactions, dependents.financial_goals
        )));
    }

    existing.delete(&txn).await?;
    txn.commit().await?;

    info!("Account {} deleted successfully", id);
    Ok(())
}

/// Clear the account reference on its transactions and goals, then delete it.
///
/// Returns how many records were detached.
#[instrument(skip(db))]
pub async fn delete_detaching(db: &DatabaseConnection, id: &str) -> Result<Dependents> {
    let txn = db.begin().await?;
    let existing = find_required::<account::Entity, _>(&txn, ENTITY, id).await?;
    let now = Utc::now();

    let transactions = transaction::Entity::update_many()
        .col_expr(transaction::Column::AccountId, Expr::value(Option::<String>::None))
        .col_expr(transaction::Column::UpdatedAt, Expr::value(now))
        .filter(transaction::Column::AccountId.eq(id))
        .exec(&txn)
        .await?
        .rows_affected;
    let financial_goals = financial_goal::Entity::update_many()
        .col_expr(financial_goal::Column::AccountId, Expr::value(Option::<String>::None))
        .col_expr(financial_goal::Column::UpdatedAt, Expr::value(now))
        .filter(financial_goal::Column::AccountId.eq(id))
        .exec(&txn)
        .await?
        .rows_affected;

    existing.delete(&txn).await?;
    txn.commit().await?;

    let detached = Dependents {
        transactions,
        financial_goals,
    };
    info!(?detached, "Account {} deleted", id);
    Ok(detached)
}
