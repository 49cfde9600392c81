//! Categories, their delete policies and the starter set of defaults.

use model::entities::category::{self, ExpenseType, TransactionType};
use model::entities::{budget, regular_payment, transaction};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use validator::{Validate, ValidationError};

use crate::validation::not_blank;
use crate::{Result, StoreError, find_required};

const ENTITY: &str = "Category";

/// Fields of a category to be created.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
#[validate(schema(function = "check_expense_type"))]
pub struct NewCategory {
    #[validate(custom(function = "not_blank"), length(max = 100))]
    pub name: String,
    #[validate(length(max = 32))]
    pub icon: Option<String>,
    #[validate(length(max = 32))]
    pub color: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: TransactionType,
    /// Defaults to `Variable` for expense categories.
    pub expense_type: Option<ExpenseType>,
}

fn default_kind() -> TransactionType {
    TransactionType::Expense
}

fn check_expense_type(draft: &NewCategory) -> std::result::Result<(), ValidationError> {
    if draft.kind == TransactionType::Income && draft.expense_type.is_some() {
        return Err(ValidationError::new("expense_type_on_income"));
    }
    Ok(())
}

impl NewCategory {
    pub fn expense(name: &str, expense_type: ExpenseType) -> Self {
        Self {
            name: name.to_string(),
            icon: None,
            color: None,
            is_default: false,
            kind: TransactionType::Expense,
            expense_type: Some(expense_type),
        }
    }

    pub fn income(name: &str) -> Self {
        Self {
            name: name.to_string(),
            icon: None,
            color: None,
            is_default: false,
            kind: TransactionType::Income,
            expense_type: None,
        }
    }

    fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        if self.kind == TransactionType::Expense && self.expense_type.is_none() {
            self.expense_type = Some(ExpenseType::Variable);
        }
        self
    }

    fn assign(self, active: &mut category::ActiveModel) {
        active.name = Set(self.name);
        active.icon = Set(self.icon);
        active.color = Set(self.color);
        active.is_default = Set(self.is_default);
        active.kind = Set(self.kind);
        active.expense_type = Set(self.expense_type);
    }
}

/// Changes to an existing category. `None` leaves a field untouched;
/// `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub icon: Option<Option<String>>,
    pub color: Option<Option<String>>,
    pub is_default: Option<bool>,
    #[serde(rename = "type")]
    pub kind: Option<TransactionType>,
    pub expense_type: Option<Option<ExpenseType>>,
}

impl CategoryPatch {
    fn apply(self, current: &category::Model) -> NewCategory {
        let kind = self.kind.unwrap_or(current.kind);
        let expense_type = match self.expense_type {
            Some(expense_type) => expense_type,
            // Switching to income drops the expense classification
            None if kind == TransactionType::Income => None,
            None => current.expense_type,
        };

        NewCategory {
            name: self.name.unwrap_or_else(|| current.name.clone()),
            icon: self.icon.unwrap_or_else(|| current.icon.clone()),
            color: self.color.unwrap_or_else(|| current.color.clone()),
            is_default: self.is_default.unwrap_or(current.is_default),
            kind,
            expense_type,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryFilter {
    pub kind: Option<TransactionType>,
    pub is_default: Option<bool>,
}

/// Records that still reference a category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dependents {
    pub transactions: u64,
    pub budgets: u64,
    pub regular_payments: u64,
}

impl Dependents {
    pub fn is_empty(&self) -> bool {
        self.transactions == 0 && self.budgets == 0 && self.regular_payments == 0
    }
}

#[instrument(skip(db))]
pub async fn create(db: &DatabaseConnection, new: NewCategory) -> Result<category::Model> {
    debug!("Creating category with name: {}", new.name);
    let new = new.normalized();
    new.validate()?;

    let mut active = category::ActiveModel {
        ..Default::default()
    };
    new.assign(&mut active);
    let txn = db.begin().await?;
    let created = active.insert(&txn).await?;
    txn.commit().await?;

    info!("Category created successfully with ID: {}", created.id);
    Ok(created)
}

#[instrument(skip(db))]
pub async fn get(db: &DatabaseConnection, id: &str) -> Result<category::Model> {
    find_required::<category::Entity, _>(db, ENTITY, id).await
}

#[instrument(skip(db))]
pub async fn update(
    db: &DatabaseConnection,
    id: &str,
    patch: CategoryPatch,
) -> Result<category::Model> {
    debug!("Updating category with ID: {}", id);
    let txn = db.begin().await?;

    let current = find_required::<category::Entity, _>(&txn, ENTITY, id).await?;
    let draft = patch.apply(&current).normalized();
    draft.validate()?;

    let mut active: category::ActiveModel = current.into();
    draft.assign(&mut active);
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    info!("Category {} updated successfully", id);
    Ok(updated)
}

#[instrument(skip(db))]
pub async fn list(db: &DatabaseConnection, filter: CategoryFilter) -> Result<Vec<category::Model>> {
    let mut query = category::Entity::find();
    if let Some(kind) = filter.kind {
        query = query.filter(category::Column::Kind.eq(kind));
    }
    if let Some(is_default) = filter.is_default {
        query = query.filter(category::Column::IsDefault.eq(is_default));
    }

    let categories = query
        .order_by_asc(category::Column::Name)
        .order_by_asc(category::Column::CreatedAt)
        .all(db)
        .await?;
    debug!("Retrieved {} categories", categories.len());
    Ok(categories)
}

async fn count_dependents<C: ConnectionTrait>(conn: &C, id: &str) -> Result<Dependents> {
    Ok(Dependents {
        transactions: transaction::Entity::find()
            .filter(transaction::Column::CategoryId.eq(id))
            .count(conn)
            .await?,
        budgets: budget::Entity::find()
            .filter(budget::Column::CategoryId.eq(id))
            .count(conn)
            .await?,
        regular_payments: regular_payment::Entity::find()
            .filter(regular_payment::Column::CategoryId.eq(id))
            .count(conn)
            .await?,
    })
}

/// Count the records that reference the category.
#[instrument(skip(db))]
pub async fn dependents(db: &DatabaseConnection, id: &str) -> Result<Dependents> {
    find_required::<category::Entity, _>(db, ENTITY, id).await?;
    count_dependents(db, id).await
}

/// Delete a category that nothing references.
///
/// Fails with `ConstraintViolation` while transactions, budgets or regular
/// payments still point at it.
#[instrument(skip(db))]
pub async fn delete(db: &DatabaseConnection, id: &str) -> Result<()> {
    debug!("Deleting category with ID: {}", id);
    let txn = db.begin().await?;

    let category = find_required::<category::Entity, _>(&txn, ENTITY, id).await?;
    let dependents = count_dependents(&txn, id).await?;
    if !dependents.is_empty() {
        warn!(?dependents, "Category {} is still referenced", id);
        return Err(StoreError::ConstraintViolation(format!(
            "Category {} is referenced by {} transactions, {} budgets and {} regular payments",
            id, dependents.transactions, dependents.budgets, dependents.regular_payments
        )));
    }

    category.delete(&txn).await?;
    txn.commit().await?;

    info!("Category {} deleted successfully", id);
    Ok(())
}

/// Delete a category together with every transaction, budget and regular
/// payment that references it.
#[instrument(skip(db))]
pub async fn delete_cascade(db: &DatabaseConnection, id: &str) -> Result<Dependents> {
    debug!("Deleting category with ID {} and its dependents", id);
    let txn = db.begin().await?;

    let category = find_required::<category::Entity, _>(&txn, ENTITY, id).await?;
    let removed = Dependents {
        transactions: transaction::Entity::delete_many()
            .filter(transaction::Column::CategoryId.eq(id))
            .exec(&txn)
            .await?
            .rows_affected,
        budgets: budget::Entity::delete_many()
            .filter(budget::Column::CategoryId.eq(id))
            .exec(&txn)
            .await?
            .rows_affected,
        regular_payments: regular_payment::Entity::delete_many()
            .filter(regular_payment::Column::CategoryId.eq(id))
            .exec(&txn)
            .await?
            .rows_affected,
    };
    category.delete(&txn).await?;
    txn.commit().await?;

    info!(?removed, "Category {} deleted with its dependents", id);
    Ok(removed)
}

fn default_categories() -> Vec<NewCategory> {
    let expense = |name, expense_type| NewCategory {
        is_default: true,
        ..NewCategory::expense(name, expense_type)
    };
    let income = |name| NewCategory {
        is_default: true,
        ..NewCategory::income(name)
    };

    vec![
        expense("Housing", ExpenseType::Mandatory),
        expense("Utilities", ExpenseType::Mandatory),
        expense("Groceries", ExpenseType::Variable),
        expense("Transport", ExpenseType::Variable),
        expense("Entertainment", ExpenseType::Discretionary),
        expense("Restaurants", ExpenseType::Discretionary),
        income("Salary"),
        income("Other income"),
    ]
}

/// Insert the starter categories unless default categories already exist.
///
/// Returns the number of categories inserted.
#[instrument(skip(db))]
pub async fn seed_defaults(db: &DatabaseConnection) -> Result<u64> {
    let txn = db.begin().await?;

    let existing = category::Entity::find()
        .filter(category::Column::IsDefault.eq(true))
        .count(&txn)
        .await?;
    if existing > 0 {
        debug!("{} default categories present, skipping seed", existing);
        return Ok(0);
    }

    let mut inserted = 0;
    for new in default_categories() {
        new.validate()?;
        let mut active = category::ActiveModel {
            ..Default::default()
        };
        new.assign(&mut active);
        active.insert(&txn).await?;
        inserted += 1;
    }
    txn.commit().await?;

    info!("Seeded {} default categories", inserted);
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::budget::NewBudget;
    use crate::regular_payment::NewRegularPayment;
    use crate::testing::{date, groceries, salary, setup_db};
    use crate::transaction::NewTransaction;
    use model::entities::regular_payment::Period;

    #[tokio::test]
    async fn create_category_succeeds() {
        let db = setup_db().await;

        let created = create(&db, NewCategory::expense("Groceries", ExpenseType::Variable))
            .await
            .unwrap();

        assert!(!created.id.is_empty());
        assert_eq!(created.name, "Groceries");
        assert_eq!(created.kind, TransactionType::Expense);
        assert_eq!(created.expense_type, Some(ExpenseType::Variable));
        assert!(!created.is_default);
        assert_eq!(get(&db, &created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn expense_category_defaults_to_variable() {
        let db = setup_db().await;
        let new = NewCategory {
            expense_type: None,
            ..NewCategory::expense("Pets", ExpenseType::Mandatory)
        };

        let created = create(&db, new).await.unwrap();

        assert_eq!(created.expense_type, Some(ExpenseType::Variable));
    }

    #[tokio::test]
    async fn income_category_rejects_expense_type() {
        let db = setup_db().await;
        let new = NewCategory {
            expense_type: Some(ExpenseType::Mandatory),
            ..NewCategory::income("Salary")
        };

        let result = create(&db, new).await;

        assert!(matches!(result, Err(StoreError::Validation(_))));
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let db = setup_db().await;

        let result = create(&db, NewCategory::income("  ")).await;

        assert!(matches!(result, Err(StoreError::Validation(_))));
        assert!(list(&db, CategoryFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn name_length_is_checked_after_trimming() {
        let db = setup_db().await;
        let padded = format!("  {}  ", "a".repeat(100));

        let created = create(&db, NewCategory::income(&padded)).await.unwrap();
        assert_eq!(created.name, "a".repeat(100));

        let too_long = format!(" {} ", "a".repeat(101));
        assert!(matches!(
            create(&db, NewCategory::income(&too_long)).await,
            Err(StoreError::Validation(_))
        ));
    }

    #[test]
    fn unknown_type_is_rejected_at_the_boundary() {
        let parsed: std::result::Result<NewCategory, _> =
            serde_json::from_str(r#"{"name": "Gifts", "type": "transfer"}"#);
        assert!(parsed.is_err());

        let parsed: std::result::Result<NewCategory, _> = serde_json::from_str(
            r#"{"name": "Gifts", "type": "expense", "expense_type": "sometimes"}"#,
        );
        assert!(parsed.is_err());

        let parsed: NewCategory = serde_json::from_str(r#"{"name": "Gifts"}"#).unwrap();
        assert_eq!(parsed.kind, TransactionType::Expense);
    }

    #[tokio::test]
    async fn get_with_unknown_id_returns_not_found() {
        let db = setup_db().await;

        let result = get(&db, "missing").await;

        assert!(matches!(
            result,
            Err(StoreError::NotFound { entity: "Category", .. })
        ));
    }

    #[tokio::test]
    async fn update_keeps_created_at_and_refreshes_updated_at() {
        let db = setup_db().await;
        let created = groceries(&db).await;

        let patch = CategoryPatch {
            name: Some("Food".to_string()),
            color: Some(Some("#00ff00".to_string())),
            ..Default::default()
        };
        let updated = update(&db, &created.id, patch).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Food");
        assert_eq!(updated.color.as_deref(), Some("#00ff00"));
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn update_to_income_drops_expense_type() {
        let db = setup_db().await;
        let created = groceries(&db).await;

        let patch = CategoryPatch {
            kind: Some(TransactionType::Income),
            ..Default::default()
        };
        let updated = update(&db, &created.id, patch).await.unwrap();

        assert_eq!(updated.kind, TransactionType::Income);
        assert_eq!(updated.expense_type, None);
    }

    #[tokio::test]
    async fn update_unknown_id_returns_not_found() {
        let db = setup_db().await;

        let result = update(&db, "missing", CategoryPatch::default()).await;

        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn list_filters_by_kind_and_orders_by_name() {
        let db = setup_db().await;
        create(&db, NewCategory::expense("Transport", ExpenseType::Variable))
            .await
            .unwrap();
        groceries(&db).await;
        salary(&db).await;

        let expenses = list(
            &db,
            CategoryFilter {
                kind: Some(TransactionType::Expense),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let names: Vec<_> = expenses.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Groceries", "Transport"]);
    }

    #[tokio::test]
    async fn delete_unreferenced_category_succeeds() {
        let db = setup_db().await;
        let created = groceries(&db).await;

        delete(&db, &created.id).await.unwrap();

        assert!(matches!(
            get(&db, &created.id).await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn delete_referenced_category_is_restricted() {
        let db = setup_db().await;
        let category = groceries(&db).await;
        crate::transaction::create(
            &db,
            NewTransaction::expense(Decimal::new(100, 0), &category.id, date(2024, 1, 3)),
        )
        .await
        .unwrap();

        let result = delete(&db, &category.id).await;

        assert!(matches!(result, Err(StoreError::ConstraintViolation(_))));
        assert!(get(&db, &category.id).await.is_ok());
        let dependents = dependents(&db, &category.id).await.unwrap();
        assert_eq!(dependents.transactions, 1);
    }

    #[tokio::test]
    async fn delete_category_with_budget_or_payment_is_restricted() {
        let db = setup_db().await;
        let with_budget = groceries(&db).await;
        crate::budget::create(
            &db,
            NewBudget::new(&with_budget.id, "2024-01", Decimal::new(500, 0)),
        )
        .await
        .unwrap();
        let with_payment = salary(&db).await;
        crate::regular_payment::create(
            &db,
            NewRegularPayment::new("Rent", Decimal::new(30000, 0), &with_payment.id, Period::Monthly),
        )
        .await
        .unwrap();

        assert!(matches!(
            delete(&db, &with_budget.id).await,
            Err(StoreError::ConstraintViolation(_))
        ));
        assert!(matches!(
            delete(&db, &with_payment.id).await,
            Err(StoreError::ConstraintViolation(_))
        ));
    }

    #[tokio::test]
    async fn delete_cascade_removes_dependents() {
        let db = setup_db().await;
        let category = groceries(&db).await;
        crate::transaction::create(
            &db,
            NewTransaction::expense(Decimal::new(100, 0), &category.id, date(2024, 1, 3)),
        )
        .await
        .unwrap();
        crate::budget::create(&db, NewBudget::new(&category.id, "2024-01", Decimal::new(500, 0)))
            .await
            .unwrap();

        let removed = delete_cascade(&db, &category.id).await.unwrap();

        assert_eq!(
            removed,
            Dependents {
                transactions: 1,
                budgets: 1,
                regular_payments: 0
            }
        );
        assert!(get(&db, &category.id).await.is_err());
        assert!(
            crate::transaction::list(&db, Default::default())
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn seed_defaults_is_idempotent() {
        let db = setup_db().await;

        let first = seed_defaults(&db).await.unwrap();
        let second = seed_defaults(&db).await.unwrap();

        assert_eq!(first, 8);
        assert_eq!(second, 0);
        let defaults = list(
            &db,
            CategoryFilter {
                is_default: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(defaults.len(), 8);
        assert!(
            defaults
                .iter()
                .filter(|c| c.kind == TransactionType::Income)
                .all(|c| c.expense_type.is_none())
        );
    }
}
