use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ErrorLog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ErrorLog::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ErrorLog::Error).text().not_null())
                    .col(ColumnDef::new(ErrorLog::Endpoint).string().not_null())
                    .col(ColumnDef::new(ErrorLog::Method).string().not_null())
                    .col(
                        ColumnDef::new(ErrorLog::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_error_logs_timestamp")
                    .table(ErrorLog::Table)
                    .col(ErrorLog::Timestamp)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_error_logs_timestamp").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ErrorLog::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ErrorLog {
    #[sea_orm(iden = "error_logs")]
    Table,
    Id,
    Error,
    Endpoint,
    Method,
    Timestamp,
}
