use chrono::NaiveDate;
use model::DEFAULT_CURRENCY;
use model::entities::account;
use model::entities::financial_goal;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use tracing::{debug, info, instrument};
use validator::Validate;

use crate::validation::{currency_code, non_negative, not_blank, positive};
use crate::{Result, ensure_reference, find_required};

const ENTITY: &str = "FinancialGoal";

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct NewFinancialGoal {
    #[validate(custom(function = "not_blank"), length(max = 100))]
    pub name: String,
    #[validate(custom(function = "positive"))]
    pub target_amount: Decimal,
    #[serde(default)]
    #[validate(custom(function = "non_negative"))]
    pub current_amount: Decimal,
    #[serde(default = "default_currency")]
    #[validate(custom(function = "currency_code"))]
    pub currency: String,
    pub deadline: Option<NaiveDate>,
    pub account_id: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
}

impl NewFinancialGoal {
    pub fn new(name: &str, target_amount: Decimal) -> Self {
        Self {
            name: name.to_string(),
            target_amount,
            current_amount: Decimal::ZERO,
            currency: default_currency(),
            deadline: None,
            account_id: None,
            is_completed: false,
        }
    }

    pub fn with_account(mut self, account_id: &str) -> Self {
        self.account_id = Some(account_id.to_string());
        self
    }

    pub fn due_by(mut self, deadline: NaiveDate) -> Self {
        self.deadline = Some(deadline);
        self
    }

    fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self
    }

    fn assign(self, active: &mut financial_goal::ActiveModel) {
        active.name = Set(self.name);
        active.target_amount = Set(self.target_amount);
        active.current_amount = Set(self.current_amount);
        active.currency = Set(self.currency);
        active.deadline = Set(self.deadline);
        active.account_id = Set(self.account_id);
        active.is_completed = Set(self.is_completed);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FinancialGoalPatch {
    pub name: Option<String>,
    pub target_amount: Option<Decimal>,
    pub current_amount: Option<Decimal>,
    pub currency: Option<String>,
    pub deadline: Option<Option<NaiveDate>>,
    pub account_id: Option<Option<String>>,
    pub is_completed: Option<bool>,
}

impl FinancialGoalPatch {
    fn apply(self, current: &financial_goal::Model) -> NewFinancialGoal {
        NewFinancialGoal {
            name: self.name.unwrap_or_else(|| current.name.clone()),
            target_amount: self.target_amount.unwrap_or(current.target_amount),
            current_amount: self.current_amount.unwrap_or(current.current_amount),
            currency: self.currency.unwrap_or_else(|| current.currency.clone()),
            deadline: self.deadline.unwrap_or(current.deadline),
            account_id: self.account_id.unwrap_or_else(|| current.account_id.clone()),
            is_completed: self.is_completed.unwrap_or(current.is_completed),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinancialGoalFilter {
    pub account_id: Option<String>,
    pub is_completed: Option<bool>,
}

#[instrument(skip(db))]
pub async fn create(
    db: &DatabaseConnection,
    new: NewFinancialGoal,
) -> Result<financial_goal::Model> {
    debug!("Creating financial goal: {}", new.name);
    let new = new.normalized();
    new.validate()?;

    let txn = db.begin().await?;
    if let Some(account_id) = &new.account_id {
        ensure_reference::<account::Entity, _>(&txn, "Account", account_id).await?;
    }

    let mut active = financial_goal::ActiveModel {
        ..Default::default()
    };
    new.assign(&mut active);
    let created = active.insert(&txn).await?;
    txn.commit().await?;

    info!("Financial goal created successfully with ID: {}", created.id);
    Ok(created)
}

#[instrument(skip(db))]
pub async fn get(db: &DatabaseConnection, id: &str) -> Result<financial_goal::Model> {
    find_required::<financial_goal::Entity, _>(db, ENTITY, id).await
}

#[instrument(skip(db))]
pub async fn update(
    db: &DatabaseConnection,
    id: &str,
    patch: FinancialGoalPatch,
) -> Result<financial_goal::Model> {
    debug!("Updating financial goal with ID: {}", id);
    let txn = db.begin().await?;

    let current = find_required::<financial_goal::Entity, _>(&txn, ENTITY, id).await?;
    let draft = patch.apply(&current).normalized();
    draft.validate()?;
    if let Some(account_id) = &draft.account_id {
        ensure_reference::<account::Entity, _>(&txn, "Account", account_id).await?;
    }

    let mut active: financial_goal::ActiveModel = current.into();
    draft.assign(&mut active);
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    info!("Financial goal {} updated successfully", id);
    Ok(updated)
}

#[instrument(skip(db))]
pub async fn delete(db: &DatabaseConnection, id: &str) -> Result<()> {
    let txn = db.begin().await?;
    let existing = find_required::<financial_goal::Entity, _>(&txn, ENTITY, id).await?;
    existing.delete(&txn).await?;
    txn.commit().await?;

    info!("Financial goal {} deleted successfully", id);
    Ok(())
}

/// List goals by deadline. Goals without a deadline come last.
#[instrument(skip(db))]
pub async fn list(
    db: &DatabaseConnection,
    filter: FinancialGoalFilter,
) -> Result<Vec<financial_goal::Model>> {
    let mut query = financial_goal::Entity::find();
    if let Some(account_id) = filter.account_id {
        query = query.filter(financial_goal::Column::AccountId.eq(account_id));
    }
    if let Some(is_completed) = filter.is_completed {
        query = query.filter(financial_goal::Column::IsCompleted.eq(is_completed));
    }

    let goals = query
        .order_by_asc(Expr::col(financial_goal::Column::Deadline).is_null())
        .order_by_asc(financial_goal::Column::Deadline)
        .order_by_asc(financial_goal::Column::CreatedAt)
        .all(db)
        .await?;
    debug!("Retrieved {} financial goals", goals.len());
    Ok(goals)
}
