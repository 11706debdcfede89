mod database;

pub use database::DatabaseStore;

use crate::error::AppResult;
use crate::models::{
    CommonNotificationModel, ComplaintNotificationModel, NotificationSettingModel,
};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use uuid::Uuid;

/// Row-to-be for the complaint-scoped store. `created_at` is assigned by
/// the dispatcher so every row of one fan-out shares a single timestamp.
#[derive(Debug, Clone)]
pub struct NewComplaintNotification {
    pub user_id: i32,
    pub event_type: String,
    pub complaint_id: i32,
    pub title: String,
    pub body: Option<String>,
    pub payload: Option<serde_json::Value>,
    pub timeline_event_id: Option<i32>,
    pub created_at: NaiveDateTime,
}

/// Row-to-be for the broadcast store. Carries no user id: the store writes
/// it as a broadcast row, which is the only kind this engine produces.
#[derive(Debug, Clone)]
pub struct NewCommonNotification {
    pub event_type: String,
    pub context_type: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<i32>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub payload: Option<serde_json::Value>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct ComplaintFilter {
    pub user_id: i32,
    pub complaint_id: Option<i32>,
    pub event_type: Option<String>,
    pub unread_only: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CommonFilter {
    pub event_type: Option<String>,
    pub unread_only: bool,
}

/// Delivery toggles, keyed uniquely by event type.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn find_all(&self) -> AppResult<Vec<NotificationSettingModel>>;

    async fn find(&self, event_type: &str) -> AppResult<Option<NotificationSettingModel>>;

    /// Create-or-update keyed by `event_type`; returns the post-write row.
    async fn upsert(
        &self,
        event_type: &str,
        enabled: bool,
        now: NaiveDateTime,
    ) -> AppResult<NotificationSettingModel>;
}

/// The two parallel notification record families. Listing is always
/// newest-first by `created_at`.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert_complaint(
        &self,
        row: NewComplaintNotification,
    ) -> AppResult<ComplaintNotificationModel>;

    async fn list_complaint(
        &self,
        filter: &ComplaintFilter,
        skip: u64,
        limit: u64,
    ) -> AppResult<Vec<ComplaintNotificationModel>>;

    async fn count_complaint(&self, filter: &ComplaintFilter) -> AppResult<u64>;

    async fn count_unread_complaint(&self, user_id: i32) -> AppResult<u64>;

    /// Returns whether a row matching (`id`, `user_id`) exists. `read_at`
    /// is written only while still null; marking a read row is a no-op.
    async fn mark_complaint_read(
        &self,
        id: Uuid,
        user_id: i32,
        now: NaiveDateTime,
    ) -> AppResult<bool>;

    async fn mark_all_complaint_read(&self, user_id: i32, now: NaiveDateTime) -> AppResult<u64>;

    async fn insert_common(
        &self,
        row: NewCommonNotification,
    ) -> AppResult<CommonNotificationModel>;

    async fn list_common(
        &self,
        filter: &CommonFilter,
        skip: u64,
        limit: u64,
    ) -> AppResult<Vec<CommonNotificationModel>>;

    async fn count_common(&self, filter: &CommonFilter) -> AppResult<u64>;

    async fn count_unread_common(&self) -> AppResult<u64>;

    async fn mark_common_read(&self, id: Uuid, now: NaiveDateTime) -> AppResult<bool>;

    async fn mark_all_common_read(&self, now: NaiveDateTime) -> AppResult<u64>;
}
