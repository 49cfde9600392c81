//! Recurring payment templates.

use model::DEFAULT_CURRENCY;
use model::entities::category;
use model::entities::regular_payment::{self, Period};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use tracing::{debug, info, instrument};
use validator::Validate;

use crate::validation::{currency_code, not_blank, positive};
use crate::{Result, ensure_reference, find_required};

const ENTITY: &str = "RegularPayment";

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct NewRegularPayment {
    #[validate(custom(function = "not_blank"), length(max = 100))]
    pub name: String,
    #[validate(custom(function = "positive"))]
    pub amount: Decimal,
    #[serde(default = "default_currency")]
    #[validate(custom(function = "currency_code"))]
    pub currency: String,
    pub category_id: String,
    pub period: Period,
    #[validate(range(min = 1, max = 31))]
    pub due_date: Option<i32>,
    #[serde(default = "active")]
    pub is_active: bool,
}

impl NewRegularPayment {
    pub fn new(name: &str, amount: Decimal, category_id: &str, period: Period) -> Self {
        Self {
            name: name.to_string(),
            amount,
            currency: default_currency(),
            category_id: category_id.to_string(),
            period,
            due_date: None,
            is_active: true,
        }
    }

    pub fn due_on(mut self, day: i32) -> Self {
        self.due_date = Some(day);
        self
    }

    fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self
    }

    fn assign(self, active: &mut regular_payment::ActiveModel) {
        active.name = Set(self.name);
        active.amount = Set(self.amount);
        active.currency = Set(self.currency);
        active.category_id = Set(self.category_id);
        active.period = Set(self.period);
        active.due_date = Set(self.due_date);
        active.is_active = Set(self.is_active);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RegularPaymentPatch {
    pub name: Option<String>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub category_id: Option<String>,
    pub period: Option<Period>,
    pub due_date: Option<Option<i32>>,
    pub is_active: Option<bool>,
}

impl RegularPaymentPatch {
    fn apply(self, current: &regular_payment::Model) -> NewRegularPayment {
        NewRegularPayment {
            name: self.name.unwrap_or_else(|| current.name.clone()),
            amount: self.amount.unwrap_or(current.amount),
            currency: self.currency.unwrap_or_else(|| current.currency.clone()),
            category_id: self.category_id.unwrap_or_else(|| current.category_id.clone()),
            period: self.period.unwrap_or(current.period),
            due_date: self.due_date.unwrap_or(current.due_date),
            is_active: self.is_active.unwrap_or(current.is_active),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegularPaymentFilter {
    pub category_id: Option<String>,
    pub is_active: Option<bool>,
    pub period: Option<Period>,
}

#[instrument(skip(db))]
pub async fn create(
    db: &DatabaseConnection,
    new: NewRegularPayment,
) -> Result<regular_payment::Model> {
    debug!("Creating regular payment: {}", new.name);
    let new = new.normalized();
    new.validate()?;

    let txn = db.begin().await?;
    ensure_reference::<category::Entity, _>(&txn, "Category", &new.category_id).await?;

    let mut active = regular_payment::ActiveModel {
        ..Default::default()
    };
    new.assign(&mut active);
    let created = active.insert(&txn).await?;
    txn.commit().await?;

    info!("Regular payment created successfully with ID: {}", created.id);
    Ok(created)
}

#[instrument(skip(db))]
pub async fn get(db: &DatabaseConnection, id: &str) -> Result<regular_payment::Model> {
    find_required::<regular_payment::Entity, _>(db, ENTITY, id).await
}

#[instrument(skip(db))]
pub async fn update(
    db: &DatabaseConnection,
    id: &str,
    patch: RegularPaymentPatch,
) -> Result<regular_payment::Model> {
    debug!("Updating regular payment with ID: {}", id);
    let txn = db.begin().await?;

    let current = find_required::<regular_payment::Entity, _>(&txn, ENTITY, id).await?;
    let draft = patch.apply(&current).normalized();
    draft.validate()?;
    ensure_reference::<category::Entity, _>(&txn, "Category", &draft.category_id).await?;

    let mut active: regular_payment::ActiveModel = current.into();
    draft.assign(&mut active);
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    info!("Regular payment {} updated successfully", id);
    Ok(updated)
}

#[instrument(skip(db))]
pub async fn delete(db: &DatabaseConnection, id: &str) -> Result<()> {
    let txn = db.begin().await?;
    let existing = find_required::<regular_payment::Entity, _>(&txn, ENTITY, id).await?;
    existing.delete(&txn).await?;
    txn.commit().await?;

    info!("Regular payment {} deleted successfully", id);
    Ok(())
}

#[instrument(skip(db))]
pub async fn list(
    db: &DatabaseConnection,
    filter: RegularPaymentFilter,
) -> Result<Vec<regular_payment::Model>> {
    let mut query = regular_payment::Entity::find();
    if let Some(category_id) = filter.category_id {
        query = query.filter(regular_payment::Column::CategoryId.eq(category_id));
    }
    if let Some(is_active) = filter.is_active {
        query = query.filter(regular_payment::Column::IsActive.eq(is_active));
    }
    if let Some(period) = filter.period {
        query = query.filter(regular_payment::Column::Period.eq(period));
    }

    let payments = query
        .order_by_asc(regular_payment::Column::Name)
        .order_by_asc(regular_payment::Column::CreatedAt)
        .all(db)
        .await?;
    debug!("Retrieved {} regular payments", payments.len());
    Ok(payments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreError;
    use crate::testing::{groceries, setup_db};

    #[tokio::test]
    async fn create_defaults_to_active() {
        let db = setup_db().await;
        let category = groceries(&db).await;

        let rent = create(
            &db,
            NewRegularPayment::new("Rent", Decimal::new(30000, 0), &category.id, Period::Monthly)
                .due_on(5),
        )
        .await
        .unwrap();

        assert!(rent.is_active);
        assert_eq!(rent.due_date, Some(5));
        assert_eq!(rent.period, Period::Monthly);
        assert_eq!(get(&db, &rent.id).await.unwrap(), rent);
    }

    #[tokio::test]
    async fn due_date_must_be_a_day_of_month() {
        let db = setup_db().await;
        let category = groceries(&db).await;

        for day in [0, 32, -1] {
            let result = create(
                &db,
                NewRegularPayment::new("Rent", Decimal::ONE, &category.id, Period::Monthly)
                    .due_on(day),
            )
            .await;
            assert!(matches!(result, Err(StoreError::Validation(_))), "{day}");
        }
    }

    #[tokio::test]
    async fn blank_name_and_dangling_category_are_rejected() {
        let db = setup_db().await;
        let category = groceries(&db).await;

        let blank = NewRegularPayment::new("  ", Decimal::ONE, &category.id, Period::Weekly);
        assert!(matches!(
            create(&db, blank).await,
            Err(StoreError::Validation(_))
        ));

        let dangling = NewRegularPayment::new("Gym", Decimal::ONE, "nonexistent", Period::Weekly);
        assert!(matches!(
            create(&db, dangling).await,
            Err(StoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn deactivate_and_filter() {
        let db = setup_db().await;
        let category = groceries(&db).await;
        let gym = create(
            &db,
            NewRegularPayment::new("Gym", Decimal::new(2000, 0), &category.id, Period::Monthly),
        )
        .await
        .unwrap();
        create(
            &db,
            NewRegularPayment::new("Cloud", Decimal::new(300, 0), &category.id, Period::Yearly),
        )
        .await
        .unwrap();

        let paused = update(
            &db,
            &gym.id,
            RegularPaymentPatch {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(!paused.is_active);

        let active_payments = list(
            &db,
            RegularPaymentFilter {
                is_active: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(active_payments.len(), 1);
        assert_eq!(active_payments[0].name, "Cloud");

        let all = list(&db, RegularPaymentFilter::default()).await.unwrap();
        let names: Vec<_> = all.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Cloud", "Gym"]);
    }

    #[tokio::test]
    async fn delete_missing_payment_is_not_found() {
        let db = setup_db().await;

        let result = delete(&db, "missing").await;

        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }
}
