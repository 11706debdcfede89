use super::{
    CommonFilter, ComplaintFilter, NewCommonNotification, NewComplaintNotification,
    NotificationStore, SettingsStore,
};
use crate::{
    error::{AppError, AppResult},
    models::{
        common_notification, complaint_notification, notification_setting, CommonNotification,
        CommonNotificationModel, ComplaintNotification, ComplaintNotificationModel,
        NotificationSetting, NotificationSettingModel,
    },
};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select,
};
use uuid::Uuid;

/// Postgres-backed store for both notification families and the settings
/// table.
pub struct DatabaseStore {
    db: DatabaseConnection,
}

impl DatabaseStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn complaint_query(filter: &ComplaintFilter) -> Select<ComplaintNotification> {
    let mut query = ComplaintNotification::find()
        .filter(complaint_notification::Column::UserId.eq(filter.user_id));

    if let Some(complaint_id) = filter.complaint_id {
        query = query.filter(complaint_notification::Column::ComplaintId.eq(complaint_id));
    }
    if let Some(ref event_type) = filter.event_type {
        query = query.filter(complaint_notification::Column::EventType.eq(event_type.as_str()));
    }
    if filter.unread_only {
        query = query.filter(complaint_notification::Column::ReadAt.is_null());
    }
    query
}

fn common_query(filter: &CommonFilter) -> Select<CommonNotification> {
    let mut query = CommonNotification::find();

    if let Some(ref event_type) = filter.event_type {
        query = query.filter(common_notification::Column::EventType.eq(event_type.as_str()));
    }
    if filter.unread_only {
        query = query.filter(common_notification::Column::MarkedReadAt.is_null());
    }
    query
}

#[async_trait]
impl SettingsStore for DatabaseStore {
    async fn find_all(&self) -> AppResult<Vec<NotificationSettingModel>> {
        Ok(NotificationSetting::find().all(&self.db).await?)
    }

    async fn find(&self, event_type: &str) -> AppResult<Option<NotificationSettingModel>> {
        Ok(NotificationSetting::find()
            .filter(notification_setting::Column::EventType.eq(event_type))
            .one(&self.db)
            .await?)
    }

    async fn upsert(
        &self,
        event_type: &str,
        enabled: bool,
        now: NaiveDateTime,
    ) -> AppResult<NotificationSettingModel> {
        let model = notification_setting::ActiveModel {
            event_type: sea_orm::ActiveValue::Set(event_type.to_string()),
            enabled: sea_orm::ActiveValue::Set(enabled),
            updated_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        NotificationSetting::insert(model)
            .on_conflict(
                OnConflict::column(notification_setting::Column::EventType)
                    .update_columns([
                        notification_setting::Column::Enabled,
                        notification_setting::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        self.find(event_type).await?.ok_or(AppError::NotFound)
    }
}

#[async_trait]
impl NotificationStore for DatabaseStore {
    async fn insert_complaint(
        &self,
        row: NewComplaintNotification,
    ) -> AppResult<ComplaintNotificationModel> {
        let model = complaint_notification::ActiveModel {
            id: sea_orm::ActiveValue::Set(Uuid::new_v4()),
            user_id: sea_orm::ActiveValue::Set(row.user_id),
            event_type: sea_orm::ActiveValue::Set(row.event_type),
            complaint_id: sea_orm::ActiveValue::Set(row.complaint_id),
            title: sea_orm::ActiveValue::Set(row.title),
            body: sea_orm::ActiveValue::Set(row.body),
            payload: sea_orm::ActiveValue::Set(row.payload),
            timeline_event_id: sea_orm::ActiveValue::Set(row.timeline_event_id),
            read_at: sea_orm::ActiveValue::Set(None),
            created_at: sea_orm::ActiveValue::Set(row.created_at),
        };

        Ok(model.insert(&self.db).await?)
    }

    async fn list_complaint(
        &self,
        filter: &ComplaintFilter,
        skip: u64,
        limit: u64,
    ) -> AppResult<Vec<ComplaintNotificationModel>> {
        Ok(complaint_query(filter)
            .order_by_desc(complaint_notification::Column::CreatedAt)
            .offset(skip)
            .limit(limit)
            .all(&self.db)
            .await?)
    }

    async fn count_complaint(&self, filter: &ComplaintFilter) -> AppResult<u64> {
        Ok(complaint_query(filter).count(&self.db).await?)
    }

    async fn count_unread_complaint(&self, user_id: i32) -> AppResult<u64> {
        Ok(ComplaintNotification::find()
            .filter(complaint_notification::Column::UserId.eq(user_id))
            .filter(complaint_notification::Column::ReadAt.is_null())
            .count(&self.db)
            .await?)
    }

    async fn mark_complaint_read(
        &self,
        id: Uuid,
        user_id: i32,
        now: NaiveDateTime,
    ) -> AppResult<bool> {
        let existing = match ComplaintNotification::find_by_id(id).one(&self.db).await? {
            Some(row) if row.user_id == user_id => row,
            _ => return Ok(false),
        };

        if existing.read_at.is_none() {
            let mut active: complaint_notification::ActiveModel = existing.into();
            active.read_at = sea_orm::ActiveValue::Set(Some(now));
            active.update(&self.db).await?;
        }
        Ok(true)
    }

    async fn mark_all_complaint_read(
        &self,
        user_id: i32,
        now: NaiveDateTime,
    ) -> AppResult<u64> {
        let result = ComplaintNotification::update_many()
            .col_expr(complaint_notification::Column::ReadAt, Expr::value(now))
            .filter(complaint_notification::Column::UserId.eq(user_id))
            .filter(complaint_notification::Column::ReadAt.is_null())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    async fn insert_common(
        &self,
        row: NewCommonNotification,
    ) -> AppResult<CommonNotificationModel> {
        let model = common_notification::ActiveModel {
            id: sea_orm::ActiveValue::Set(Uuid::new_v4()),
            user_id: sea_orm::ActiveValue::Set(None),
            event_type: sea_orm::ActiveValue::Set(Some(row.event_type)),
            context_type: sea_orm::ActiveValue::Set(row.context_type),
            entity_type: sea_orm::ActiveValue::Set(row.entity_type),
            entity_id: sea_orm::ActiveValue::Set(row.entity_id),
            title: sea_orm::ActiveValue::Set(row.title),
            body: sea_orm::ActiveValue::Set(row.body),
            payload: sea_orm::ActiveValue::Set(row.payload),
            marked_read_at: sea_orm::ActiveValue::Set(None),
            created_at: sea_orm::ActiveValue::Set(row.created_at),
        };

        Ok(model.insert(&self.db).await?)
    }

    async fn list_common(
        &self,
        filter: &CommonFilter,
        skip: u64,
        limit: u64,
    ) -> AppResult<Vec<CommonNotificationModel>> {
        Ok(common_query(filter)
            .order_by_desc(common_notification::Column::CreatedAt)
            .offset(skip)
            .limit(limit)
            .all(&self.db)
            .await?)
    }

    async fn count_common(&self, filter: &CommonFilter) -> AppResult<u64> {
        Ok(common_query(filter).count(&self.db).await?)
    }

    async fn count_unread_common(&self) -> AppResult<u64> {
        Ok(CommonNotification::find()
            .filter(common_notification::Column::MarkedReadAt.is_null())
            .count(&self.db)
            .await?)
    }

    async fn mark_common_read(&self, id: Uuid, now: NaiveDateTime) -> AppResult<bool> {
        let existing = match CommonNotification::find_by_id(id).one(&self.db).await? {
            Some(row) => row,
            None => return Ok(false),
        };

        if existing.marked_read_at.is_none() {
            let mut active: common_notification::ActiveModel = existing.into();
            active.marked_read_at = sea_orm::ActiveValue::Set(Some(now));
            active.update(&self.db).await?;
        }
        Ok(true)
    }

    async fn mark_all_common_read(&self, now: NaiveDateTime) -> AppResult<u64> {
        let result = CommonNotification::update_many()
            .col_expr(common_notification::Column::MarkedReadAt, Expr::value(now))
            .filter(common_notification::Column::MarkedReadAt.is_null())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}
