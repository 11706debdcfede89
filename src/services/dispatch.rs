use crate::{
    events::{CommonEventType, ComplaintEventType},
    services::{receivers::ReceiverResolver, settings::SettingsService},
    store::{NewCommonNotification, NewComplaintNotification, NotificationStore},
};
use serde::Deserialize;
use std::sync::Arc;

/// Producer-side descriptor for a complaint-scoped event. Title and body
/// arrive pre-rendered by the producing subsystem.
#[derive(Debug, Clone, Deserialize)]
pub struct ComplaintEvent {
    pub event_type: String,
    pub complaint_id: i32,
    pub assigned_officer_id: Option<i32>,
    pub timeline_event_id: Option<i32>,
    pub title: String,
    pub body: Option<String>,
    pub payload: Option<serde_json::Value>,
}

/// Producer-side descriptor for a broadcast event.
#[derive(Debug, Clone, Deserialize)]
pub struct CommonEvent {
    pub event_type: String,
    pub context_type: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<i32>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub payload: Option<serde_json::Value>,
}

/// Delivery orchestrator. Both entry points are fire-and-forget: every
/// failure is logged and swallowed, so the business transition that
/// produced the event never observes a notification error.
pub struct Dispatcher {
    store: Arc<dyn NotificationStore>,
    settings: SettingsService,
    resolver: ReceiverResolver,
}

impl Dispatcher {
    pub fn new(
        store: Arc<dyn NotificationStore>,
        settings: SettingsService,
        resolver: ReceiverResolver,
    ) -> Self {
        Self {
            store,
            settings,
            resolver,
        }
    }

    /// Fan a complaint event out to one row per resolved recipient.
    pub async fn notify(&self, event: ComplaintEvent) {
        let event_type = match ComplaintEventType::parse(&event.event_type) {
            Some(t) => t,
            None => {
                tracing::warn!("Ignoring unknown complaint event type: {}", event.event_type);
                return;
            }
        };

        if !self.delivery_enabled(event_type.as_str()).await {
            return;
        }

        let receivers = self
            .resolver
            .resolve(event_type, event.assigned_officer_id)
            .await;
        let recipients = receivers.distinct_recipients();
        if recipients.is_empty() {
            tracing::debug!(
                "No recipients resolved for {} on complaint {}",
                event_type.as_str(),
                event.complaint_id
            );
            return;
        }

        // One timestamp per fan-out; each insert is isolated so one failed
        // recipient does not starve the rest.
        let created_at = chrono::Utc::now().naive_utc();
        for user_id in recipients {
            let row = NewComplaintNotification {
                user_id,
                event_type: event_type.as_str().to_string(),
                complaint_id: event.complaint_id,
                title: event.title.clone(),
                body: event.body.clone(),
                payload: event.payload.clone(),
                timeline_event_id: event.timeline_event_id,
                created_at,
            };
            if let Err(e) = self.store.insert_complaint(row).await {
                tracing::error!(
                    "Failed to persist notification for user {} on complaint {}: {}",
                    user_id,
                    event.complaint_id,
                    e
                );
            }
        }
    }

    /// Persist a single broadcast row visible to the whole admin role.
    pub async fn notify_common(&self, event: CommonEvent) {
        let event_type = match CommonEventType::parse(&event.event_type) {
            Some(t) => t,
            None => {
                tracing::warn!("Ignoring unknown common event type: {}", event.event_type);
                return;
            }
        };

        if !self.delivery_enabled(event_type.as_str()).await {
            return;
        }

        let row = NewCommonNotification {
            event_type: event_type.as_str().to_string(),
            context_type: event.context_type,
            entity_type: event.entity_type,
            entity_id: event.entity_id,
            title: event.title,
            body: event.body,
            payload: event.payload,
            created_at: chrono::Utc::now().naive_utc(),
        };
        if let Err(e) = self.store.insert_common(row).await {
            tracing::error!("Failed to persist broadcast notification: {}", e);
        }
    }

    /// Fail-open twice over: a missing toggle means enabled, and an
    /// unreadable toggle is logged and treated as enabled.
    async fn delivery_enabled(&self, event_type: &str) -> bool {
        match self.settings.is_enabled(event_type).await {
            Ok(enabled) => enabled,
            Err(e) => {
                tracing::warn!(
                    "Settings lookup for {} failed, delivering anyway: {}",
                    event_type,
                    e
                );
                true
            }
        }
    }
}
