//! Monthly spending limits, at most one per category and month.

use model::DEFAULT_CURRENCY;
use model::entities::{budget, category};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::validation::{currency_code, month, positive};
use crate::{Result, StoreError, ensure_reference, find_required};

const ENTITY: &str = "Budget";

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct NewBudget {
    pub category_id: String,
    #[validate(custom(function = "positive"))]
    pub amount: Decimal,
    #[serde(default = "default_currency")]
    #[validate(custom(function = "currency_code"))]
    pub currency: String,
    /// Calendar month as `YYYY-MM`.
    #[validate(custom(function = "month"))]
    pub month: String,
}

impl NewBudget {
    pub fn new(category_id: &str, month: &str, amount: Decimal) -> Self {
        Self {
            category_id: category_id.to_string(),
            amount,
            currency: default_currency(),
            month: month.to_string(),
        }
    }

    /// Fail if another budget already covers this category and month.
    async fn ensure_unique<C: ConnectionTrait>(&self, conn: &C, except: Option<&str>) -> Result<()> {
        let mut query = budget::Entity::find()
            .filter(budget::Column::CategoryId.eq(self.category_id.as_str()))
            .filter(budget::Column::Month.eq(self.month.as_str()));
        if let Some(id) = except {
            query = query.filter(budget::Column::Id.ne(id));
        }

        if let Some(existing) = query.one(conn).await? {
            warn!(
                "Budget {} already covers category {} for {}",
                existing.id, self.category_id, self.month
            );
            return Err(StoreError::ConstraintViolation(format!(
                "A budget for category {} in {} already exists",
                self.category_id, self.month
            )));
        }
        Ok(())
    }

    fn assign(self, active: &mut budget::ActiveModel) {
        active.category_id = Set(self.category_id);
        active.amount = Set(self.amount);
        active.currency = Set(self.currency);
        active.month = Set(self.month);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BudgetPatch {
    pub category_id: Option<String>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub month: Option<String>,
}

impl BudgetPatch {
    fn apply(self, current: &budget::Model) -> NewBudget {
        NewBudget {
            category_id: self.category_id.unwrap_or_else(|| current.category_id.clone()),
            amount: self.amount.unwrap_or(current.amount),
            currency: self.currency.unwrap_or_else(|| current.currency.clone()),
            month: self.month.unwrap_or_else(|| current.month.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BudgetFilter {
    pub month: Option<String>,
    pub category_id: Option<String>,
}

#[instrument(skip(db))]
pub async fn create(db: &DatabaseConnection, new: NewBudget) -> Result<budget::Model> {
    debug!("Creating budget for category {} in {}", new.category_id, new.month);
    new.validate()?;

    let txn = db.begin().await?;
    ensure_reference::<category::Entity, _>(&txn, "Category", &new.category_id).await?;
    new.ensure_unique(&txn, None).await?;

    let mut active = budget::ActiveModel {
        ..Default::default()
    };
    new.assign(&mut active);
    let created = active.insert(&txn).await?;
    txn.commit().await?;

    info!("Budget created successfully with ID: {}", created.id);
    Ok(created)
}

#[instrument(skip(db))]
pub async fn get(db: &DatabaseConnection, id: &str) -> Result<budget::Model> {
    find_required::<budget::Entity, _>(db, ENTITY, id).await
}

#[instrument(skip(db))]
pub async fn update(db: &DatabaseConnection, id: &str, patch: BudgetPatch) -> Result<budget::Model> {
    debug!("Updating budget with ID: {}", id);
    let txn = db.begin().await?;

    let current = find_required::<budget::Entity, _>(&txn, ENTITY, id).await?;
    let draft = patch.apply(&current);
    draft.validate()?;
    ensure_reference::<category::Entity, _>(&txn, "Category", &draft.category_id).await?;
    draft.ensure_unique(&txn, Some(id)).await?;

    let mut active: budget::ActiveModel = current.into();
    draft.assign(&mut active);
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    info!("Budget {} updated successfully", id);
    Ok(updated)
}

#[instrument(skip(db))]
pub async fn delete(db: &DatabaseConnection, id: &str) -> Result<()> {
    let txn = db.begin().await?;
    let existing = find_required::<budget::Entity, _>(&txn, ENTITY, id).await?;
    existing.delete(&txn).await?;
    txn.commit().await?;

    info!("Budget {} deleted successfully", id);
    Ok(())
}

/// List budgets by month, oldest first.
#[instrument(skip(db))]
pub async fn list(db: &DatabaseConnection, filter: BudgetFilter) -> Result<Vec<budget::Model>> {
    let mut query = budget::Entity::find();
    if let Some(month) = filter.month {
        query = query.filter(budget::Column::Month.eq(month));
    }
    if let Some(category_id) = filter.category_id {
        query = query.filter(budget::Column::CategoryId.eq(category_id));
    }

    let budgets = query
        .order_by_asc(budget::Column::Month)
        .order_by_asc(budget::Column::CreatedAt)
        .all(db)
        .await?;
    debug!("Retrieved {} budgets", budgets.len());
    Ok(budgets)
}
