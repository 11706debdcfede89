#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime};
use nivaran::error::{AppError, AppResult};
use nivaran::models::{
    CommonNotificationModel, ComplaintNotificationModel, NotificationSettingModel,
};
use nivaran::services::{
    CommonEvent, ComplaintEvent, Dispatcher, FeedService, ReceiverResolver, SettingsService,
    UserDirectory,
};
use nivaran::store::{
    CommonFilter, ComplaintFilter, NewCommonNotification, NewComplaintNotification,
    NotificationStore, SettingsStore,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, Once};
use uuid::Uuid;

static INIT: Once = Once::new();

fn init_env() {
    INIT.call_once(|| {
        dotenv::dotenv().ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "nivaran=warn".into()),
            )
            .try_init();
    });
}

#[derive(Default)]
struct Inner {
    settings: Vec<NotificationSettingModel>,
    complaint: Vec<ComplaintNotificationModel>,
    common: Vec<CommonNotificationModel>,
    next_setting_id: i32,
    fail_inserts_for: HashSet<i32>,
    fail_settings_reads: bool,
}

/// In-memory stand-in for the Postgres store, with switchable failure
/// injection for the best-effort delivery tests.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        init_env();
        Arc::new(Self::default())
    }

    /// Every complaint-row insert for this user will fail.
    pub fn fail_inserts_for(&self, user_id: i32) {
        self.inner.lock().unwrap().fail_inserts_for.insert(user_id);
    }

    /// Every settings read will fail.
    pub fn fail_settings_reads(&self) {
        self.inner.lock().unwrap().fail_settings_reads = true;
    }

    pub fn complaint_rows(&self) -> Vec<ComplaintNotificationModel> {
        self.inner.lock().unwrap().complaint.clone()
    }

    pub fn common_rows(&self) -> Vec<CommonNotificationModel> {
        self.inner.lock().unwrap().common.clone()
    }

    pub fn settings_rows(&self) -> Vec<NotificationSettingModel> {
        self.inner.lock().unwrap().settings.clone()
    }
}

fn matches_complaint(filter: &ComplaintFilter, row: &ComplaintNotificationModel) -> bool {
    row.user_id == filter.user_id
        && filter.complaint_id.map_or(true, |c| row.complaint_id == c)
        && filter
            .event_type
            .as_ref()
            .map_or(true, |t| &row.event_type == t)
        && (!filter.unread_only || row.read_at.is_none())
}

fn matches_common(filter: &CommonFilter, row: &CommonNotificationModel) -> bool {
    filter
        .event_type
        .as_ref()
        .map_or(true, |t| row.event_type.as_deref() == Some(t.as_str()))
        && (!filter.unread_only || row.marked_read_at.is_none())
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn find_all(&self) -> AppResult<Vec<NotificationSettingModel>> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_settings_reads {
            return Err(AppError::Internal(anyhow::anyhow!(
                "injected settings read failure"
            )));
        }
        Ok(inner.settings.clone())
    }

    async fn find(&self, event_type: &str) -> AppResult<Option<NotificationSettingModel>> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_settings_reads {
            return Err(AppError::Internal(anyhow::anyhow!(
                "injected settings read failure"
            )));
        }
        Ok(inner
            .settings
            .iter()
            .find(|s| s.event_type == event_type)
            .cloned())
    }

    async fn upsert(
        &self,
        event_type: &str,
        enabled: bool,
        now: NaiveDateTime,
    ) -> AppResult<NotificationSettingModel> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(existing) = inner
            .settings
            .iter_mut()
            .find(|s| s.event_type == event_type)
        {
            existing.enabled = enabled;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        inner.next_setting_id += 1;
        let row = NotificationSettingModel {
            id: inner.next_setting_id,
            event_type: event_type.to_string(),
            enabled,
            updated_at: now,
        };
        inner.settings.push(row.clone());
        Ok(row)
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn insert_complaint(
        &self,
        row: NewComplaintNotification,
    ) -> AppResult<ComplaintNotificationModel> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_inserts_for.contains(&row.user_id) {
            return Err(AppError::Internal(anyhow::anyhow!(
                "injected insert failure for user {}",
                row.user_id
            )));
        }

        let model = ComplaintNotificationModel {
            id: Uuid::new_v4(),
            user_id: row.user_id,
            event_type: row.event_type,
            complaint_id: row.complaint_id,
            title: row.title,
            body: row.body,
            payload: row.payload,
            timeline_event_id: row.timeline_event_id,
            read_at: None,
            created_at: row.created_at,
        };
        inner.complaint.push(model.clone());
        Ok(model)
    }

    async fn list_complaint(
        &self,
        filter: &ComplaintFilter,
        skip: u64,
        limit: u64,
    ) -> AppResult<Vec<ComplaintNotificationModel>> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<_> = inner
            .complaint
            .iter()
            .filter(|r| matches_complaint(filter, r))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_complaint(&self, filter: &ComplaintFilter) -> AppResult<u64> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .complaint
            .iter()
            .filter(|r| matches_complaint(filter, r))
            .count() as u64)
    }

    async fn count_unread_complaint(&self, user_id: i32) -> AppResult<u64> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .complaint
            .iter()
            .filter(|r| r.user_id == user_id && r.read_at.is_none())
            .count() as u64)
    }

    async fn mark_complaint_read(
        &self,
        id: Uuid,
        user_id: i32,
        now: NaiveDateTime,
    ) -> AppResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        match inner
            .complaint
            .iter_mut()
            .find(|r| r.id == id && r.user_id == user_id)
        {
            Some(row) => {
                if row.read_at.is_none() {
                    row.read_at = Some(now);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_complaint_read(&self, user_id: i32, now: NaiveDateTime) -> AppResult<u64> {
        let mut inner = self.inner.lock().unwrap();
        let mut affected = 0;
        for row in inner
            .complaint
            .iter_mut()
            .filter(|r| r.user_id == user_id && r.read_at.is_none())
        {
            row.read_at = Some(now);
            affected += 1;
        }
        Ok(affected)
    }

    async fn insert_common(
        &self,
        row: NewCommonNotification,
    ) -> AppResult<CommonNotificationModel> {
        let mut inner = self.inner.lock().unwrap();
        let model = CommonNotificationModel {
            id: Uuid::new_v4(),
            user_id: None,
            event_type: Some(row.event_type),
            context_type: row.context_type,
            entity_type: row.entity_type,
            entity_id: row.entity_id,
            title: row.title,
            body: row.body,
            payload: row.payload,
            marked_read_at: None,
            created_at: row.created_at,
        };
        inner.common.push(model.clone());
        Ok(model)
    }

    async fn list_common(
        &self,
        filter: &CommonFilter,
        skip: u64,
        limit: u64,
    ) -> AppResult<Vec<CommonNotificationModel>> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<_> = inner
            .common
            .iter()
            .filter(|r| matches_common(filter, r))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_common(&self, filter: &CommonFilter) -> AppResult<u64> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .common
            .iter()
            .filter(|r| matches_common(filter, r))
            .count() as u64)
    }

    async fn count_unread_common(&self) -> AppResult<u64> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .common
            .iter()
            .filter(|r| r.marked_read_at.is_none())
            .count() as u64)
    }

    async fn mark_common_read(&self, id: Uuid, now: NaiveDateTime) -> AppResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        match inner.common.iter_mut().find(|r| r.id == id) {
            Some(row) => {
                if row.marked_read_at.is_none() {
                    row.marked_read_at = Some(now);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_common_read(&self, now: NaiveDateTime) -> AppResult<u64> {
        let mut inner = self.inner.lock().unwrap();
        let mut affected = 0;
        for row in inner
            .common
            .iter_mut()
            .filter(|r| r.marked_read_at.is_none())
        {
            row.marked_read_at = Some(now);
            affected += 1;
        }
        Ok(affected)
    }
}

/// Directory with a fixed admin population.
pub struct StaticDirectory {
    pub admins: Vec<i32>,
}

#[async_trait]
impl UserDirectory for StaticDirectory {
    async fn admin_user_ids(&self) -> AppResult<Vec<i32>> {
        Ok(self.admins.clone())
    }
}

/// Directory whose lookups always fail.
pub struct FailingDirectory;

#[async_trait]
impl UserDirectory for FailingDirectory {
    async fn admin_user_ids(&self) -> AppResult<Vec<i32>> {
        Err(AppError::Internal(anyhow::anyhow!("directory offline")))
    }
}

pub fn settings_service(store: &Arc<MemoryStore>) -> SettingsService {
    SettingsService::new(store.clone() as Arc<dyn SettingsStore>)
}

pub fn feed_service(store: &Arc<MemoryStore>) -> FeedService {
    FeedService::new(store.clone() as Arc<dyn NotificationStore>)
}

pub fn dispatcher_with_directory(
    store: &Arc<MemoryStore>,
    directory: Arc<dyn UserDirectory>,
) -> Dispatcher {
    Dispatcher::new(
        store.clone() as Arc<dyn NotificationStore>,
        settings_service(store),
        ReceiverResolver::new(directory),
    )
}

pub fn dispatcher(store: &Arc<MemoryStore>, admins: Vec<i32>) -> Dispatcher {
    dispatcher_with_directory(store, Arc::new(StaticDirectory { admins }))
}

pub fn ts(secs: i64) -> NaiveDateTime {
    DateTime::from_timestamp(secs, 0).unwrap().naive_utc()
}

pub fn complaint_event(
    event_type: &str,
    complaint_id: i32,
    assigned_officer_id: Option<i32>,
) -> ComplaintEvent {
    ComplaintEvent {
        event_type: event_type.to_string(),
        complaint_id,
        assigned_officer_id,
        timeline_event_id: None,
        title: format!("{} on complaint {}", event_type, complaint_id),
        body: Some("See the complaint timeline for details".to_string()),
        payload: None,
    }
}

pub fn common_event(event_type: &str) -> CommonEvent {
    CommonEvent {
        event_type: event_type.to_string(),
        context_type: Some("meeting".to_string()),
        entity_type: Some("meeting".to_string()),
        entity_id: Some(11),
        title: Some("A citizen requested a meeting".to_string()),
        body: None,
        payload: None,
    }
}

/// Insert a complaint row with a chosen timestamp, bypassing the
/// dispatcher.
pub async fn seed_complaint(store: &Arc<MemoryStore>, user_id: i32, secs: i64) -> Uuid {
    seed_complaint_full(store, user_id, 1, "complaint_created", secs).await
}

pub async fn seed_complaint_full(
    store: &Arc<MemoryStore>,
    user_id: i32,
    complaint_id: i32,
    event_type: &str,
    secs: i64,
) -> Uuid {
    let row = store
        .insert_complaint(NewComplaintNotification {
            user_id,
            event_type: event_type.to_string(),
            complaint_id,
            title: format!("{} on complaint {}", event_type, complaint_id),
            body: None,
            payload: None,
            timeline_event_id: None,
            created_at: ts(secs),
        })
        .await
        .expect("seeding complaint row failed");
    row.id
}

/// Insert a broadcast row with a chosen timestamp.
pub async fn seed_common(store: &Arc<MemoryStore>, secs: i64) -> Uuid {
    let row = store
        .insert_common(NewCommonNotification {
            event_type: "meeting_requested".to_string(),
            context_type: None,
            entity_type: Some("meeting".to_string()),
            entity_id: Some(5),
            title: Some("A citizen requested a meeting".to_string()),
            body: None,
            payload: None,
            created_at: ts(secs),
        })
        .await
        .expect("seeding broadcast row failed");
    row.id
}
