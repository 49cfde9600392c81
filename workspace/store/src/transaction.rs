//! Income and expense transactions.
//!
//! Recording a transaction never changes the balance of its account.

use chrono::{NaiveDate, Utc};
use model::DEFAULT_CURRENCY;
use model::entities::transaction::{self, TransactionType};
use model::entities::{account, category};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::validation::{currency_code, positive};
use crate::{Result, StoreError, ensure_reference, find_required};

const ENTITY: &str = "Transaction";

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// Fields of a transaction to be recorded.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct NewTransaction {
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[validate(custom(function = "positive"))]
    pub amount: Decimal,
    #[serde(default = "default_currency")]
    #[validate(custom(function = "currency_code"))]
    pub currency: String,
    pub category_id: String,
    pub account_id: Option<String>,
    pub date: NaiveDate,
    #[validate(length(max = 500))]
    pub comment: Option<String>,
}

impl NewTransaction {
    pub fn expense(amount: Decimal, category_id: &str, date: NaiveDate) -> Self {
        Self {
            kind: TransactionType::Expense,
            amount,
            currency: default_currency(),
            category_id: category_id.to_string(),
            account_id: None,
            date,
            comment: None,
        }
    }

    pub fn income(amount: Decimal, category_id: &str, date: NaiveDate) -> Self {
        Self {
            kind: TransactionType::Income,
            ..Self::expense(amount, category_id, date)
        }
    }

    pub fn with_account(mut self, account_id: &str) -> Self {
        self.account_id = Some(account_id.to_string());
        self
    }

    async fn check_references<C: ConnectionTrait>(&self, conn: &C) -> Result<()> {
        ensure_reference::<category::Entity, _>(conn, "Category", &self.category_id).await?;
        if let Some(account_id) = &self.account_id {
            ensure_reference::<account::Entity, _>(conn, "Account", account_id).await?;
        }
        Ok(())
    }

    fn assign(self, active: &mut transaction::ActiveModel) {
        active.kind = Set(self.kind);
        active.amount = Set(self.amount);
        active.currency = Set(self.currency);
        active.category_id = Set(self.category_id);
        active.account_id = Set(self.account_id);
        active.date = Set(self.date);
        active.comment = Set(self.comment);
    }
}

/// Changes to an existing transaction. `None` leaves a field untouched;
/// `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TransactionPatch {
    #[serde(rename = "type")]
    pub kind: Option<TransactionType>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub category_id: Option<String>,
    pub account_id: Option<Option<String>>,
    pub date: Option<NaiveDate>,
    pub comment: Option<Option<String>>,
}

impl TransactionPatch {
    fn apply(self, current: &transaction::Model) -> NewTransaction {
        NewTransaction {
            kind: self.kind.unwrap_or(current.kind),
            amount: self.amount.unwrap_or(current.amount),
            currency: self.currency.unwrap_or_else(|| current.currency.clone()),
            category_id: self.category_id.unwrap_or_else(|| current.category_id.clone()),
            account_id: self.account_id.unwrap_or_else(|| current.account_id.clone()),
            date: self.date.unwrap_or(current.date),
            comment: self.comment.unwrap_or_else(|| current.comment.clone()),
        }
    }
}

/// Selects transactions. Date bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    pub kind: Option<TransactionType>,
    pub category_id: Option<String>,
    pub account_id: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[instrument(skip(db))]
pub async fn create(db: &DatabaseConnection, new: NewTransaction) -> Result<transaction::Model> {
    debug!("Creating {:?} transaction of {}", new.kind, new.amount);
    new.validate()?;

    let txn = db.begin().await?;
    new.check_references(&txn).await?;

    let mut active = transaction::ActiveModel {
        ..Default::default()
    };
    new.assign(&mut active);
    let created = active.insert(&txn).await?;
    txn.commit().await?;

    info!("Transaction created successfully with ID: {}", created.id);
    Ok(created)
}

#[instrument(skip(db))]
pub async fn get(db: &DatabaseConnection, id: &str) -> Result<transaction::Model> {
    find_required::<transaction::Entity, _>(db, ENTITY, id).await
}

#[instrument(skip(db))]
pub async fn update(
    db: &DatabaseConnection,
    id: &str,
    patch: TransactionPatch,
) -> Result<transaction::Model> {
    debug!("Updating transaction with ID: {}", id);
    let txn = db.begin().await?;

    let current = find_required::<transaction::Entity, _>(&txn, ENTITY, id).await?;
    let draft = patch.apply(&current);
    draft.validate()?;
    draft.check_references(&txn).await?;

    let mut active: transaction::ActiveModel = current.into();
    draft.assign(&mut active);
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    info!("Transaction {} updated successfully", id);
    Ok(updated)
}

#[instrument(skip(db))]
pub async fn delete(db: &DatabaseConnection, id: &str) -> Result<()> {
    debug!("Deleting transaction with ID: {}", id);
    let txn = db.begin().await?;

    let existing = find_required::<transaction::Entity, _>(&txn, ENTITY, id).await?;
    existing.delete(&txn).await?;
    txn.commit().await?;

    info!("Transaction {} deleted successfully", id);
    Ok(())
}

/// List transactions, newest first.
#[instrument(skip(db))]
pub async fn list(
    db: &DatabaseConnection,
    filter: TransactionFilter,
) -> Result<Vec<transaction::Model>> {
    let mut query = transaction::Entity::find();
    if let Some(kind) = filter.kind {
        query = query.filter(transaction::Column::Kind.eq(kind));
    }
    if let Some(category_id) = filter.category_id {
        query = query.filter(transaction::Column::CategoryId.eq(category_id));
    }
    if let Some(account_id) = filter.account_id {
        query = query.filter(transaction::Column::AccountId.eq(account_id));
    }
    if let Some(from) = filter.from {
        query = query.filter(transaction::Column::Date.gte(from));
    }
    if let Some(to) = filter.to {
        query = query.filter(transaction::Column::Date.lte(to));
    }

    let transactions = query
        .order_by_desc(transaction::Column::Date)
        .order_by_desc(transaction::Column::CreatedAt)
        .all(db)
        .await?;
    debug!("Retrieved {} transactions", transactions.len());
    Ok(transactions)
}

/// Move every transaction of category `from` to category `to`.
///
/// Returns the number of transactions moved.
#[instrument(skip(db))]
pub async fn reassign_category(db: &DatabaseConnection, from: &str, to: &str) -> Result<u64> {
    if from == to {
        warn!("Refusing to reassign category {} to itself", from);
        return Err(StoreError::Validation(
            "Source and target category must differ".to_string(),
        ));
    }

    let txn = db.begin().await?;
    find_required::<category::Entity, _>(&txn, "Category", from).await?;
    find_required::<category::Entity, _>(&txn, "Category", to).await?;

    let moved = transaction::Entity::update_many()
        .col_expr(transaction::Column::CategoryId, Expr::value(to))
        .col_expr(transaction::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(transaction::Column::CategoryId.eq(from))
        .exec(&txn)
        .await?
        .rows_affected;
    txn.commit().await?;

    info!("Moved {} transactions from category {} to {}", moved, from, to);
    Ok(moved)
}
