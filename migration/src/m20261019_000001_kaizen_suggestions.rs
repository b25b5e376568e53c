use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(KaizenSuggestion::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(KaizenSuggestion::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(KaizenSuggestion::JobId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(KaizenSuggestion::Transcript).text().not_null())
                    .col(ColumnDef::new(KaizenSuggestion::Summary).text().not_null())
                    .col(
                        ColumnDef::new(KaizenSuggestion::LeanCategory)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(KaizenSuggestion::SuggestionLevel)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(KaizenSuggestion::Reasoning).text().null())
                    .col(ColumnDef::new(KaizenSuggestion::Location).string().null())
                    .col(ColumnDef::new(KaizenSuggestion::Shift).string().null())
                    .col(
                        ColumnDef::new(KaizenSuggestion::AssociateName)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(KaizenSuggestion::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(KaizenSuggestion::Status)
                            .string()
                            .not_null()
                            .default("pending_review"),
                    )
                    .col(
                        ColumnDef::new(KaizenSuggestion::LastUpdated)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(KaizenSuggestion::AudioKey).string().null())
                    .to_owned(),
            )
            .await?;

        // 列表按时间倒序
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_kaizen_timestamp")
                    .table(KaizenSuggestion::Table)
                    .col(KaizenSuggestion::Timestamp)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_kaizen_status")
                    .table(KaizenSuggestion::Table)
                    .col(KaizenSuggestion::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_kaizen_status").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_kaizen_timestamp").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(KaizenSuggestion::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum KaizenSuggestion {
    #[sea_orm(iden = "kaizen_suggestions")]
    Table,
    Id,
    JobId,
    Transcript,
    Summary,
    LeanCategory,
    SuggestionLevel,
    Reasoning,
    Location,
    Shift,
    AssociateName,
    Timestamp,
    Status,
    LastUpdated,
    AudioKey,
}
