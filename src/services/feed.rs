use crate::{
    error::{AppError, AppResult},
    models::{CommonNotificationModel, ComplaintNotificationModel},
    store::{CommonFilter, ComplaintFilter, NotificationStore},
};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: u64 = 50;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Caller role as established by the authentication layer. Anything that
/// is not an admin reads the per-user complaint feed only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Officer,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FeedQuery {
    pub complaint_id: Option<i32>,
    pub event_type: Option<String>,
    pub unread_only: bool,
    pub limit: Option<u64>,
    pub skip: Option<u64>,
}

/// Which physical store a feed row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedSource {
    Complaint,
    Common,
}

/// The one discriminated shape both row families normalize into before
/// they reach the merge.
#[derive(Debug, Clone, Serialize)]
pub struct FeedItem {
    pub id: Uuid,
    pub source: FeedSource,
    pub event_type: Option<String>,
    pub complaint_id: Option<i32>,
    pub timeline_event_id: Option<i32>,
    pub context_type: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<i32>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub payload: Option<serde_json::Value>,
    pub read: bool,
    pub created_at: NaiveDateTime,
}

impl From<ComplaintNotificationModel> for FeedItem {
    fn from(n: ComplaintNotificationModel) -> Self {
        Self {
            id: n.id,
            source: FeedSource::Complaint,
            event_type: Some(n.event_type),
            complaint_id: Some(n.complaint_id),
            timeline_event_id: n.timeline_event_id,
            context_type: None,
            entity_type: None,
            entity_id: None,
            title: Some(n.title),
            body: n.body,
            payload: n.payload,
            read: n.read_at.is_some(),
            created_at: n.created_at,
        }
    }
}

impl From<CommonNotificationModel> for FeedItem {
    fn from(n: CommonNotificationModel) -> Self {
        Self {
            id: n.id,
            source: FeedSource::Common,
            event_type: n.event_type,
            complaint_id: None,
            timeline_event_id: None,
            context_type: n.context_type,
            entity_type: n.entity_type,
            entity_id: n.entity_id,
            title: n.title,
            body: n.body,
            payload: n.payload,
            read: n.marked_read_at.is_some(),
            created_at: n.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FeedPage {
    pub notifications: Vec<FeedItem>,
    pub total: u64,
}

/// Read path over the two notification stores: list, count, mark read.
pub struct FeedService {
    store: Arc<dyn NotificationStore>,
}

impl FeedService {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, user_id: i32, role: Role, query: FeedQuery) -> AppResult<FeedPage> {
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
        let skip = query.skip.unwrap_or(0);

        let complaint_filter = ComplaintFilter {
            user_id,
            complaint_id: query.complaint_id,
            event_type: query.event_type.clone(),
            unread_only: query.unread_only,
        };

        if !role.is_admin() {
            let rows = self
                .store
                .list_complaint(&complaint_filter, skip, limit)
                .await?;
            let total = self.store.count_complaint(&complaint_filter).await?;
            return Ok(FeedPage {
                notifications: rows.into_iter().map(FeedItem::from).collect(),
                total,
            });
        }

        // Each side must be fetched to the requested offset plus one page.
        // Fetching only `limit` per side drops rows whenever the other side
        // dominates the most recent entries.
        let depth = skip + limit;
        let mut items: Vec<FeedItem> = self
            .store
            .list_complaint(&complaint_filter, 0, depth)
            .await?
            .into_iter()
            .map(FeedItem::from)
            .collect();
        let mut total = self.store.count_complaint(&complaint_filter).await?;

        // Broadcast rows carry no complaint id, so a complaint-scoped query
        // cannot match them.
        if query.complaint_id.is_none() {
            let common_filter = CommonFilter {
                event_type: query.event_type.clone(),
                unread_only: query.unread_only,
            };
            items.extend(
                self.store
                    .list_common(&common_filter, 0, depth)
                    .await?
                    .into_iter()
                    .map(FeedItem::from),
            );
            total += self.store.count_common(&common_filter).await?;
        }

        Ok(FeedPage {
            notifications: merge_page(items, skip, limit),
            total,
        })
    }

    /// Complaint-scoped unread count for the user, plus the global
    /// broadcast unread count for admins.
    pub async fn unread_count(&self, user_id: i32, role: Role) -> AppResult<u64> {
        let mut count = self.store.count_unread_complaint(user_id).await?;
        if role.is_admin() {
            count += self.store.count_unread_common().await?;
        }
        Ok(count)
    }

    /// The complaint row is tried first, scoped to the caller; admins fall
    /// back to the broadcast store, which has no owning user.
    pub async fn mark_as_read(&self, id: Uuid, user_id: i32, role: Role) -> AppResult<()> {
        let now = chrono::Utc::now().naive_utc();

        if self.store.mark_complaint_read(id, user_id, now).await? {
            return Ok(());
        }
        if role.is_admin() && self.store.mark_common_read(id, now).await? {
            return Ok(());
        }
        Err(AppError::NotFound)
    }

    /// Returns total rows mutated across both stores.
    pub async fn mark_all_as_read(&self, user_id: i32, role: Role) -> AppResult<u64> {
        let now = chrono::Utc::now().naive_utc();

        let mut affected = self.store.mark_all_complaint_read(user_id, now).await?;
        if role.is_admin() {
            affected += self.store.mark_all_common_read(now).await?;
        }
        Ok(affected)
    }
}

/// Re-establish total recency order across the two independently ordered
/// sides, then page the merged sequence.
fn merge_page(mut items: Vec<FeedItem>, skip: u64, limit: u64) -> Vec<FeedItem> {
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    items
        .into_iter()
        .skip(skip as usize)
        .take(limit as usize)
        .collect()
}
