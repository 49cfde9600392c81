use model::entities::investment;
use model::entities::prelude::{Investment, Transaction};
use model::entities::transaction;
use sea_orm_migration::prelude::*;

use crate::entity_iden::EntityIden;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Transaction listings are filtered by date range and category
        manager
            .create_index(
                Index::create()
                    .name("idx_transactions_date")
                    .table(Transaction::table())
                    .col(Transaction::column(transaction::Column::Date))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transactions_category")
                    .table(Transaction::table())
                    .col(Transaction::column(transaction::Column::CategoryId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_investments_date")
                    .table(Investment::table())
                    .col(Investment::column(investment::Column::Date))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_investments_date")
                    .table(Investment::table())
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_transactions_category")
                    .table(Transaction::table())
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_transactions_date")
                    .table(Transaction::table())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
