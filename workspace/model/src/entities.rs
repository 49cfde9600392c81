//! This file serves as the root for all SeaORM entity modules.
//! We define the data models for the personal finance tracker here:
//! transactions and their categories, monthly budgets, regular payments,
//! accounts, savings goals, manual investment entries and the settings row.

/// Implements `ActiveModelBehavior` for an entity whose model has `id`,
/// `created_at` and `updated_at` columns.
///
/// On insert a missing id is generated and `created_at` is stamped.
/// `updated_at` is stamped on every save.
macro_rules! stamped_behavior {
    () => {
        #[async_trait::async_trait]
        impl ActiveModelBehavior for ActiveModel {
            async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
            where
                C: ConnectionTrait,
            {
                let now = chrono::Utc::now();
                if insert {
                    if self.id.is_not_set() {
                        self.id = sea_orm::ActiveValue::Set(crate::new_id());
                    }
                    self.created_at = sea_orm::ActiveValue::Set(now);
                }
                self.updated_at = sea_orm::ActiveValue::Set(now);
                crate::tracing::trace!(table = Entity.table_name(), insert, "Stamped record");
                Ok(self)
            }
        }
    };
}

pub mod account;
pub mod budget;
pub mod category;
pub mod financial_goal;
pub mod investment;
pub mod regular_payment;
pub mod settings;
pub mod transaction;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::account::Entity as Account;
    pub use super::budget::Entity as Budget;
    pub use super::category::Entity as Category;
    pub use super::financial_goal::Entity as FinancialGoal;
    pub use super::investment::Entity as Investment;
    pub use super::regular_payment::Entity as RegularPayment;
    pub use super::settings::Entity as Settings;
    pub use super::transaction::Entity as Transaction;
}

#[cfg(test)]
mod test {
    use chrono::NaiveDate;
    use migration::{Migrator, MigratorTrait};
    use rust_decimal::Decimal;
    use sea_orm::{
        ActiveEnum, ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection,
        DbErr, EntityTrait, ModelTrait, QueryFilter, Set,
    };

    use super::*;
    use prelude::*;

    async fn setup_db() -> Result<DatabaseConnection, DbErr> {
        // Connect to the SQLite database
        let db = Database::connect("sqlite::memory:").await?;

        // Enable foreign keys
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

        Migrator::up(&db, None).await.expect("Migrations failed.");
        Ok(db)
    }

    async fn insert_category(db: &DatabaseConnection, name: &str) -> Result<category::Model, DbErr> {
        category::ActiveModel {
            name: Set(name.to_string()),
            icon: Set(None),
            color: Set(None),
            is_default: Set(false),
            kind: Set(transaction::TransactionType::Expense),
            expense_type: Set(Some(category::ExpenseType::Variable)),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    #[tokio::test]
    async fn test_entity_integration() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let groceries = insert_category(&db, "Groceries").await?;
        assert!(!groceries.id.is_empty());
        assert_eq!(groceries.created_at, groceries.updated_at);

        let main = account::ActiveModel {
            name: Set("Main".to_string()),
            kind: Set(account::AccountType::Main),
            currency: Set("RUB".to_string()),
            balance: Set(Decimal::new(100000, 2)),
            color: Set(None),
            icon: Set(None),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let tx = transaction::ActiveModel {
            kind: Set(transaction::TransactionType::Expense),
            amount: Set(Decimal::new(4250, 2)),
            currency: Set("RUB".to_string()),
            category_id: Set(groceries.id.clone()),
            account_id: Set(Some(main.id.clone())),
            date: Set(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()),
            comment: Set(Some("Weekly shop".to_string())),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        budget::ActiveModel {
            category_id: Set(groceries.id.clone()),
            amount: Set(Decimal::new(500, 0)),
            currency: Set("RUB".to_string()),
            month: Set("2024-01".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        regular_payment::ActiveModel {
            name: Set("Delivery subscription".to_string()),
            amount: Set(Decimal::new(299, 0)),
            currency: Set("RUB".to_string()),
            category_id: Set(groceries.id.clone()),
            period: Set(regular_payment::Period::Monthly),
            due_date: Set(Some(5)),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        financial_goal::ActiveModel {
            name: Set("Holiday".to_string()),
            target_amount: Set(Decimal::new(150000, 0)),
            current_amount: Set(Decimal::ZERO),
            currency: Set("RUB".to_string()),
            deadline: Set(NaiveDate::from_ymd_opt(2024, 7, 1)),
            account_id: Set(Some(main.id.clone())),
            is_completed: Set(false),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        investment::ActiveModel {
            kind: Set(investment::InvestmentType::Deposit),
            amount: Set(Decimal::new(10000, 0)),
            description: Set(None),
            date: Set(NaiveDate::from_ymd_opt(2024, 1, 20).unwrap()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Read back through relations
        let category_txs = groceries.find_related(Transaction).all(&db).await?;
        assert_eq!(category_txs.len(), 1);
        assert_eq!(category_txs[0].id, tx.id);
        assert_eq!(category_txs[0].amount, Decimal::new(4250, 2));

        let budgets = groceries.find_related(Budget).all(&db).await?;
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].month, "2024-01");

        let payments = groceries.find_related(RegularPayment).all(&db).await?;
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].period, regular_payment::Period::Monthly);

        let goals = main.find_related(FinancialGoal).all(&db).await?;
        assert_eq!(goals.len(), 1);

        let account_txs = Transaction::find()
            .filter(transaction::Column::AccountId.eq(main.id.clone()))
            .all(&db)
            .await?;
        assert_eq!(account_txs.len(), 1);

        // Inserting a transaction does not touch the account balance
        let main_again = Account::find_by_id(main.id.clone()).one(&db).await?.unwrap();
        assert_eq!(main_again.balance, Decimal::new(100000, 2));

        assert_eq!(Investment::find().all(&db).await?.len(), 1);
        assert_eq!(Settings::find().all(&db).await?.len(), 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_refreshes_updated_at_only() -> Result<(), DbErr> {
        let db = setup_db().await?;
        let created = insert_category(&db, "Transport").await?;

        let mut active: category::ActiveModel = created.clone().into();
        active.name = Set("Public transport".to_string());
        let updated = active.update(&db).await?;

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(updated.name, "Public transport");

        Ok(())
    }

    #[tokio::test]
    async fn test_budget_unique_per_category_and_month() -> Result<(), DbErr> {
        let db = setup_db().await?;
        let groceries = insert_category(&db, "Groceries").await?;

        let budget = |amount: i64| budget::ActiveModel {
            category_id: Set(groceries.id.clone()),
            amount: Set(Decimal::new(amount, 0)),
            currency: Set("RUB".to_string()),
            month: Set("2024-01".to_string()),
            ..Default::default()
        };

        budget(500).insert(&db).await?;
        let duplicate = budget(600).insert(&db).await;

        assert!(duplicate.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_dangling_category_is_rejected_by_schema() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let result = transaction::ActiveModel {
            kind: Set(transaction::TransactionType::Expense),
            amount: Set(Decimal::new(4250, 2)),
            currency: Set("RUB".to_string()),
            category_id: Set("nonexistent".to_string()),
            account_id: Set(None),
            date: Set(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()),
            comment: Set(None),
            ..Default::default()
        }
        .insert(&db)
        .await;

        assert!(result.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_restrict_on_category_delete() -> Result<(), DbErr> {
        let db = setup_db().await?;
        let groceries = insert_category(&db, "Groceries").await?;

        budget::ActiveModel {
            category_id: Set(groceries.id.clone()),
            amount: Set(Decimal::new(500, 0)),
            currency: Set("RUB".to_string()),
            month: Set("2024-02".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        assert!(groceries.clone().delete(&db).await.is_err());
        assert!(Category::find_by_id(groceries.id).one(&db).await?.is_some());
        Ok(())
    }

    #[test]
    fn test_enum_string_values() {
        assert_eq!(transaction::TransactionType::Income.to_value(), "income");
        assert_eq!(category::ExpenseType::Discretionary.to_value(), "discretionary");
        assert_eq!(account::AccountType::Investment.to_value(), "investment");
        assert_eq!(
            regular_payment::Period::try_from_value(&"weekly".to_string()).unwrap(),
            regular_payment::Period::Weekly
        );
        assert!(regular_payment::Period::try_from_value(&"fortnightly".to_string()).is_err());
        assert!(investment::InvestmentType::try_from_value(&"Deposit".to_string()).is_err());
        assert_eq!(settings::Theme::Dark.to_value(), "dark");
    }
}
