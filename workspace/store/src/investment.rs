//! Manual investment ledger.

use chrono::NaiveDate;
use model::entities::investment::{self, InvestmentType};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use tracing::{debug, info, instrument};
use validator::{Validate, ValidationError};

use crate::{Result, find_required};

const ENTITY: &str = "Investment";

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
#[validate(schema(function = "check_amount"))]
pub struct NewInvestment {
    #[serde(rename = "type")]
    pub kind: InvestmentType,
    pub amount: Decimal,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub date: NaiveDate,
}

/// Deposits and withdrawals carry a positive amount. Adjustments carry a
/// signed, non-zero one.
fn check_amount(draft: &NewInvestment) -> std::result::Result<(), ValidationError> {
    let valid = match draft.kind {
        InvestmentType::Adjustment => !draft.amount.is_zero(),
        InvestmentType::Deposit | InvestmentType::Withdraw => {
            !draft.amount.is_zero() && draft.amount.is_sign_positive()
        }
    };
    if valid {
        Ok(())
    } else {
        let mut error = ValidationError::new("amount");
        error.message = Some(format!("invalid amount {} for {:?}", draft.amount, draft.kind).into());
        Err(error)
    }
}

impl NewInvestment {
    pub fn new(kind: InvestmentType, amount: Decimal, date: NaiveDate) -> Self {
        Self {
            kind,
            amount,
            description: None,
            date,
        }
    }

    fn assign(self, active: &mut investment::ActiveModel) {
        active.kind = Set(self.kind);
        active.amount = Set(self.amount);
        active.description = Set(self.description);
        active.date = Set(self.date);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InvestmentPatch {
    #[serde(rename = "type")]
    pub kind: Option<InvestmentType>,
    pub amount: Option<Decimal>,
    pub description: Option<Option<String>>,
    pub date: Option<NaiveDate>,
}

impl InvestmentPatch {
    fn apply(self, current: &investment::Model) -> NewInvestment {
        NewInvestment {
            kind: self.kind.unwrap_or(current.kind),
            amount: self.amount.unwrap_or(current.amount),
            description: self.description.unwrap_or_else(|| current.description.clone()),
            date: self.date.unwrap_or(current.date),
        }
    }
}

/// Date bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvestmentFilter {
    pub kind: Option<InvestmentType>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[instrument(skip(db))]
pub async fn create(db: &DatabaseConnection, new: NewInvestment) -> Result<investment::Model> {
    debug!("Recording {:?} of {}", new.kind, new.amount);
    new.validate()?;

    let mut active = investment::ActiveModel {
        ..Default::default()
    };
    new.assign(&mut active);
    let txn = db.begin().await?;
    let created = active.insert(&txn).await?;
    txn.commit().await?;

    info!("Investment created successfully with ID: {}", created.id);
    Ok(created)
}

#[instrument(skip(db))]
pub async fn get(db: &DatabaseConnection, id: &str) -> Result<investment::Model> {
    find_required::<investment::Entity, _>(db, ENTITY, id).await
}

#[instrument(skip(db))]
pub async fn update(
    db: &DatabaseConnection,
    id: &str,
    patch: InvestmentPatch,
) -> Result<investment::Model> {
    let txn = db.begin().await?;

    let current = find_required::<investment::Entity, _>(&txn, ENTITY, id).await?;
    let draft = patch.apply(&current);
    draft.validate()?;

    let mut active: investment::ActiveModel = current.into();
    draft.assign(&mut active);
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    info!("Investment {} updated successfully", id);
    Ok(updated)
}

#[instrument(skip(db))]
pub async fn delete(db: &DatabaseConnection, id: &str) -> Result<()> {
    let txn = db.begin().await?;
    let existing = find_required::<investment::Entity, _>(&txn, ENTITY, id).await?;
    existing.delete(&txn).await?;
    txn.commit().await?;

    info!("Investment {} deleted successfully", id);
    Ok(())
}

#[instrument(skip(db))]
pub async fn list(
    db: &DatabaseConnection,
    filter: InvestmentFilter,
) -> Result<Vec<investment::Model>> {
    let mut query = investment::Entity::find();
    if let Some(kind) = filter.kind {
        query = query.filter(investment::Column::Kind.eq(kind));
    }
    if let Some(from) = filter.from {
        query = query.filter(investment::Column::Date.gte(from));
    }
    if let Some(to) = filter.to {
        query = query.filter(investment::Column::Date.lte(to));
    }

    let investments = query
        .order_by_desc(investment::Column::Date)
        .order_by_desc(investment::Column::CreatedAt)
        .all(db)
        .await?;
    debug!("Retrieved {} investments", investments.len());
    Ok(investments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreError;
    use crate::testing::{date, setup_db};

    #[tokio::test]
    async fn amount_sign_depends_on_kind() {
        let db = setup_db().await;
        let day = date(2024, 3, 1);

        let deposit = create(&db, NewInvestment::new(InvestmentType::Deposit, Decimal::new(1000, 0), day))
            .await
            .unwrap();
        assert_eq!(deposit.kind, InvestmentType::Deposit);

        let loss = create(
            &db,
            NewInvestment::new(InvestmentType::Adjustment, Decimal::new(-150, 0), day),
        )
        .await
        .unwrap();
        assert_eq!(loss.amount, Decimal::new(-150, 0));

        for (kind, amount) in [
            (InvestmentType::Withdraw, Decimal::new(-10, 0)),
            (InvestmentType::Deposit, Decimal::ZERO),
            (InvestmentType::Adjustment, Decimal::ZERO),
        ] {
            let result = create(&db, NewInvestment::new(kind, amount, day)).await;
            assert!(
                matches!(result, Err(StoreError::Validation(_))),
                "{kind:?} {amount}"
            );
        }
    }

    #[test]
    fn unknown_kind_is_rejected_at_the_boundary() {
        let parsed: std::result::Result<NewInvestment, _> =
            serde_json::from_str(r#"{"type": "dividend", "amount": "5", "date": "2024-03-01"}"#);
        assert!(parsed.is_err());
    }

    #[tokio::test]
    async fn update_revalidates_merged_record() {
        let db = setup_db().await;
        let adjustment = create(
            &db,
            NewInvestment::new(InvestmentType::Adjustment, Decimal::new(-20, 0), date(2024, 3, 1)),
        )
        .await
        .unwrap();

        let result = update(
            &db,
            &adjustment.id,
            InvestmentPatch {
                kind: Some(InvestmentType::Deposit),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(StoreError::Validation(_))));

        let described = update(
            &db,
            &adjustment.id,
            InvestmentPatch {
                description: Some(Some("Market dip".to_string())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(described.description.as_deref(), Some("Market dip"));
        assert_eq!(described.kind, InvestmentType::Adjustment);
    }

    #[tokio::test]
    async fn list_by_kind_and_dates() {
        let db = setup_db().await;
        for day in [1, 15, 28] {
            create(
                &db,
                NewInvestment::new(InvestmentType::Deposit, Decimal::ONE, date(2024, 2, day)),
            )
            .await
            .unwrap();
        }
        create(
            &db,
            NewInvestment::new(InvestmentType::Withdraw, Decimal::ONE, date(2024, 2, 20)),
        )
        .await
        .unwrap();

        let deposits = list(
            &db,
            InvestmentFilter {
                kind: Some(InvestmentType::Deposit),
                from: Some(date(2024, 2, 10)),
                to: Some(date(2024, 2, 28)),
            },
        )
        .await
        .unwrap();

        let dates: Vec<_> = deposits.iter().map(|i| i.date).collect();
        assert_eq!(dates, vec![date(2024, 2, 28), date(2024, 2, 15)]);
        assert_eq!(list(&db, InvestmentFilter::default()).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn delete_investment() {
        let db = setup_db().await;
        let entry = create(
            &db,
            NewInvestment::new(InvestmentType::Deposit, Decimal::ONE, date(2024, 2, 1)),
        )
        .await
        .unwrap();

        delete(&db, &entry.id).await.unwrap();

        assert!(matches!(
            get(&db, &entry.id).await,
            Err(StoreError::NotFound { .. })
        ));
    }
}
