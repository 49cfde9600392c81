use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create categories table
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(string(Categories::Id).primary_key())
                    .col(string(Categories::Name))
                    .col(string_null(Categories::Icon))
                    .col(string_null(Categories::Color))
                    .col(boolean(Categories::IsDefault).default(false))
                    .col(string_len(Categories::Type, 16).default("expense"))
                    .col(string_len_null(Categories::ExpenseType, 16))
                    .col(timestamp_with_time_zone(Categories::CreatedAt))
                    .col(timestamp_with_time_zone(Categories::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // Create accounts table
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(string(Accounts::Id).primary_key())
                    .col(string(Accounts::Name))
                    .col(string_len(Accounts::Type, 16))
                    .col(string_len(Accounts::Currency, 3).default("RUB"))
                    .col(decimal_len(Accounts::Balance, 16, 4).default(0))
                    .col(string_null(Accounts::Color))
                    .col(string_null(Accounts::Icon))
                    .col(boolean(Accounts::IsActive).default(true))
                    .col(timestamp_with_time_zone(Accounts::CreatedAt))
                    .col(timestamp_with_time_zone(Accounts::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // Create transactions table
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(string(Transactions::Id).primary_key())
                    .col(string_len(Transactions::Type, 16))
                    .col(decimal_len(Transactions::Amount, 16, 4))
                    .col(string_len(Transactions::Currency, 3).default("RUB"))
                    .col(string(Transactions::CategoryId))
                    .col(string_null(Transactions::AccountId))
                    .col(date(Transactions::Date))
                    .col(string_null(Transactions::Comment))
                    .col(timestamp_with_time_zone(Transactions::CreatedAt))
                    .col(timestamp_with_time_zone(Transactions::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transaction_category")
                            .from(Transactions::Table, Transactions::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transaction_account")
                            .from(Transactions::Table, Transactions::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create budgets table
        manager
            .create_table(
                Table::create()
                    .table(Budgets::Table)
                    .if_not_exists()
                    .col(string(Budgets::Id).primary_key())
                    .col(string(Budgets::CategoryId))
                    .col(decimal_len(Budgets::Amount, 16, 4))
                    .col(string_len(Budgets::Currency, 3).default("RUB"))
                    .col(string_len(Budgets::Month, 7))
                    .col(timestamp_with_time_zone(Budgets::CreatedAt))
                    .col(timestamp_with_time_zone(Budgets::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_budget_category")
                            .from(Budgets::Table, Budgets::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One budget per category and month
        manager
            .create_index(
                Index::create()
                    .name("idx_budgets_category_month")
                    .table(Budgets::Table)
                    .col(Budgets::CategoryId)
                    .col(Budgets::Month)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create regular_payments table
        manager
            .create_table(
                Table::create()
                    .table(RegularPayments::Table)
                    .if_not_exists()
                    .col(string(RegularPayments::Id).primary_key())
                    .col(string(RegularPayments::Name))
                    .col(decimal_len(RegularPayments::Amount, 16, 4))
                    .col(string_len(RegularPayments::Currency, 3).default("RUB"))
                    .col(string(RegularPayments::CategoryId))
                    .col(string_len(RegularPayments::Period, 16))
                    .col(integer_null(RegularPayments::DueDate))
                    .col(boolean(RegularPayments::IsActive).default(true))
                    .col(timestamp_with_time_zone(RegularPayments::CreatedAt))
                    .col(timestamp_with_time_zone(RegularPayments::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_regular_payment_category")
                            .from(RegularPayments::Table, RegularPayments::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create financial_goals table
        manager
            .create_table(
                Table::create()
                    .table(FinancialGoals::Table)
                    .if_not_exists()
                    .col(string(FinancialGoals::Id).primary_key())
                    .col(string(FinancialGoals::Name))
                    .col(decimal_len(FinancialGoals::TargetAmount, 16, 4))
                    .col(decimal_len(FinancialGoals::CurrentAmount, 16, 4).default(0))
                    .col(string_len(FinancialGoals::Currency, 3).default("RUB"))
                    .col(date_null(FinancialGoals::Deadline))
                    .col(string_null(FinancialGoals::AccountId))
                    .col(boolean(FinancialGoals::IsCompleted).default(false))
                    .col(timestamp_with_time_zone(FinancialGoals::CreatedAt))
                    .col(timestamp_with_time_zone(FinancialGoals::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_financial_goal_account")
                            .from(FinancialGoals::Table, FinancialGoals::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create investments table
        manager
            .create_table(
                Table::create()
                    .table(Investments::Table)
                    .if_not_exists()
                    .col(string(Investments::Id).primary_key())
                    .col(string_len(Investments::Type, 16))
                    .col(decimal_len(Investments::Amount, 16, 4))
                    .col(string_null(Investments::Description))
                    .col(date(Investments::Date))
                    .col(timestamp_with_time_zone(Investments::CreatedAt))
                    .col(timestamp_with_time_zone(Investments::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // Create settings table
        manager
            .create_table(
                Table::create()
                    .table(Settings::Table)
                    .if_not_exists()
                    .col(string(Settings::Id).primary_key())
                    .col(decimal_len(Settings::RubToUsdRate, 16, 6).default(0.011))
                    .col(string_len(Settings::Theme, 16).default("light"))
                    .col(decimal_len(Settings::MandatoryPercent, 5, 2).default(50))
                    .col(decimal_len(Settings::VariablePercent, 5, 2).default(30))
                    .col(decimal_len(Settings::SavingsPercent, 5, 2).default(10))
                    .col(decimal_len(Settings::InvestmentsPercent, 5, 2).default(10))
                    .col(string_null(Settings::PasswordHash))
                    .col(timestamp_with_time_zone(Settings::CreatedAt))
                    .col(timestamp_with_time_zone(Settings::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order to respect foreign key constraints
        manager
            .drop_table(Table::drop().table(Settings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Investments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FinancialGoals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RegularPayments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Budgets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    Name,
    Icon,
    Color,
    IsDefault,
    Type,
    ExpenseType,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
    Name,
    Type,
    Currency,
    Balance,
    Color,
    Icon,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Transactions {
    Table,
    Id,
    Type,
    Amount,
    Currency,
    CategoryId,
    AccountId,
    Date,
    Comment,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Budgets {
    Table,
    Id,
    CategoryId,
    Amount,
    Currency,
    Month,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum RegularPayments {
    Table,
    Id,
    Name,
    Amount,
    Currency,
    CategoryId,
    Period,
    DueDate,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum FinancialGoals {
    Table,
    Id,
    Name,
    TargetAmount,
    CurrentAmount,
    Currency,
    Deadline,
    AccountId,
    IsCompleted,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Investments {
    Table,
    Id,
    Type,
    Amount,
    Description,
    Date,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Settings {
    Table,
    Id,
    RubToUsdRate,
    Theme,
    MandatoryPercent,
    VariablePercent,
    SavingsPercent,
    InvestmentsPercent,
    PasswordHash,
    CreatedAt,
    UpdatedAt,
}
