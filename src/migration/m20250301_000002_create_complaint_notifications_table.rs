use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum ComplaintNotifications {
    Table,
    Id,
    UserId,
    EventType,
    ComplaintId,
    Title,
    Body,
    Payload,
    TimelineEventId,
    ReadAt,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ComplaintNotifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ComplaintNotifications::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ComplaintNotifications::UserId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ComplaintNotifications::EventType)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ComplaintNotifications::ComplaintId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ComplaintNotifications::Title)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ComplaintNotifications::Body).text())
                    .col(ColumnDef::new(ComplaintNotifications::Payload).json_binary())
                    .col(ColumnDef::new(ComplaintNotifications::TimelineEventId).integer())
                    .col(ColumnDef::new(ComplaintNotifications::ReadAt).timestamp())
                    .col(
                        ColumnDef::new(ComplaintNotifications::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Feed reads: per-user, newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_complaint_notifications_user_created")
                    .table(ComplaintNotifications::Table)
                    .col(ComplaintNotifications::UserId)
                    .col(ComplaintNotifications::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Partial index for the unread-count query
        let db = manager.get_connection();
        db.execute_unprepared(
            "CREATE INDEX idx_complaint_notifications_unread ON complaint_notifications (user_id) WHERE read_at IS NULL",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(ComplaintNotifications::Table)
                    .to_owned(),
            )
            .await
    }
}
