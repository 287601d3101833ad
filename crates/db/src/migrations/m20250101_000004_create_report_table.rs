//! Create report table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Report::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Report::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Report::ReporterId).string_len(32).not_null())
                    .col(ColumnDef::new(Report::ReporterName).string_len(320).not_null())
                    .col(
                        ColumnDef::new(Report::ReportedItemType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Report::ReportedItemId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Report::ReportedUserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Report::ReportedUserName)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Report::Reason).string_len(128).not_null())
                    .col(ColumnDef::new(Report::Description).text().not_null())
                    .col(ColumnDef::new(Report::GroupId).string_len(32))
                    .col(ColumnDef::new(Report::RecommendationId).string_len(32))
                    .col(ColumnDef::new(Report::ReportedContent).text())
                    .col(
                        ColumnDef::new(Report::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Report::AdminComment).text())
                    .col(ColumnDef::new(Report::AdminCommentAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Report::AdminCommentBy).string_len(32))
                    .col(
                        ColumnDef::new(Report::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Report::ReviewedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Report::ReviewedBy).string_len(32))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_report_status")
                    .table(Report::Table)
                    .col(Report::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_report_reported_user_id")
                    .table(Report::Table)
                    .col(Report::ReportedUserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_report_created_at")
                    .table(Report::Table)
                    .col(Report::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Report::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Report {
    Table,
    Id,
    ReporterId,
    ReporterName,
    ReportedItemType,
    ReportedItemId,
    ReportedUserId,
    ReportedUserName,
    Reason,
    Description,
    GroupId,
    RecommendationId,
    ReportedContent,
    Status,
    AdminComment,
    AdminCommentAt,
    AdminCommentBy,
    CreatedAt,
    ReviewedAt,
    ReviewedBy,
}
