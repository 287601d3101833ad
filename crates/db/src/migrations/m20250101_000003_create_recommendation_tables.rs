//! Create recommendation, rating, comment, and `comment_vote` tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Recommendation::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Recommendation::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Recommendation::CategoryId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Recommendation::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Recommendation::Content).text().not_null())
                    .col(ColumnDef::new(Recommendation::ImageUrl).text().not_null())
                    .col(
                        ColumnDef::new(Recommendation::Location)
                            .string_len(256)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Recommendation::Color)
                            .string_len(16)
                            .not_null()
                            .default("#ff6f00"),
                    )
                    .col(
                        ColumnDef::new(Recommendation::CreatedBy)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Recommendation::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Recommendation::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_recommendation_category_id")
                    .table(Recommendation::Table)
                    .col(Recommendation::CategoryId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_recommendation_created_by")
                    .table(Recommendation::Table)
                    .col(Recommendation::CreatedBy)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Rating::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Rating::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Rating::RecommendationId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Rating::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Rating::Rating).integer().not_null())
                    .col(ColumnDef::new(Rating::Comment).text().not_null())
                    .col(
                        ColumnDef::new(Rating::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Rating::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rating_recommendation_user")
                    .table(Rating::Table)
                    .col(Rating::RecommendationId)
                    .col(Rating::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Comment::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Comment::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Comment::RecommendationId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Comment::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Comment::Text).text().not_null())
                    .col(
                        ColumnDef::new(Comment::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comment_recommendation_id")
                    .table(Comment::Table)
                    .col(Comment::RecommendationId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CommentVote::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CommentVote::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CommentVote::CommentId).string_len(32).not_null())
                    .col(ColumnDef::new(CommentVote::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(CommentVote::Kind).string_len(16).not_null())
                    .col(
                        ColumnDef::new(CommentVote::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comment_vote_comment_user")
                    .table(CommentVote::Table)
                    .col(CommentVote::CommentId)
                    .col(CommentVote::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CommentVote::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Comment::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Rating::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Recommendation::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Recommendation {
    Table,
    Id,
    CategoryId,
    Title,
    Content,
    ImageUrl,
    Location,
    Color,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Rating {
    Table,
    Id,
    RecommendationId,
    UserId,
    Rating,
    Comment,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Comment {
    Table,
    Id,
    RecommendationId,
    UserId,
    Text,
    CreatedAt,
}

#[derive(Iden)]
enum CommentVote {
    Table,
    Id,
    CommentId,
    UserId,
    Kind,
    CreatedAt,
}
