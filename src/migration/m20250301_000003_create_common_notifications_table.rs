use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum CommonNotifications {
    Table,
    Id,
    UserId,
    EventType,
    ContextType,
    EntityType,
    EntityId,
    Title,
    Body,
    Payload,
    MarkedReadAt,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CommonNotifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CommonNotifications::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CommonNotifications::UserId).integer())
                    .col(ColumnDef::new(CommonNotifications::EventType).string_len(50))
                    .col(ColumnDef::new(CommonNotifications::ContextType).string_len(50))
                    .col(ColumnDef::new(CommonNotifications::EntityType).string_len(50))
                    .col(ColumnDef::new(CommonNotifications::EntityId).integer())
                    .col(ColumnDef::new(CommonNotifications::Title).string())
                    .col(ColumnDef::new(CommonNotifications::Body).text())
                    .col(ColumnDef::new(CommonNotifications::Payload).json_binary())
                    .col(ColumnDef::new(CommonNotifications::MarkedReadAt).timestamp())
                    .col(
                        ColumnDef::new(CommonNotifications::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Admin feed merge reads newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_common_notifications_created")
                    .table(CommonNotifications::Table)
                    .col(CommonNotifications::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Partial index for the broadcast unread-count query
        let db = manager.get_connection();
        db.execute_unprepared(
            "CREATE INDEX idx_common_notifications_unread ON common_notifications (created_at) WHERE marked_read_at IS NULL",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CommonNotifications::Table).to_owned())
            .await
    }
}
