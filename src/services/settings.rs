use crate::{
    error::{AppError, AppResult},
    events::{is_common_notifiable_event_type, is_notifiable_event_type, ComplaintEventType},
    store::SettingsStore,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// One toggle as seen by callers. Types with no stored row surface as
/// `enabled = true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSetting {
    pub event_type: String,
    pub enabled: bool,
}

#[derive(Clone)]
pub struct SettingsService {
    store: Arc<dyn SettingsStore>,
}

impl SettingsService {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    /// Every known complaint event type in declaration order, synthesizing
    /// `enabled = true` for types never toggled. Always 12 entries.
    pub async fn get_all(&self) -> AppResult<Vec<EventSetting>> {
        let stored: HashMap<String, bool> = self
            .store
            .find_all()
            .await?
            .into_iter()
            .map(|row| (row.event_type, row.enabled))
            .collect();

        Ok(ComplaintEventType::ALL
            .iter()
            .map(|t| EventSetting {
                event_type: t.as_str().to_string(),
                enabled: stored.get(t.as_str()).copied().unwrap_or(true),
            })
            .collect())
    }

    /// Upserts each entry independently and returns the post-write state in
    /// input order. Unknown event types fail the whole call before anything
    /// is written; a storage failure mid-list leaves earlier entries
    /// applied.
    pub async fn update(&self, entries: Vec<EventSetting>) -> AppResult<Vec<EventSetting>> {
        for entry in &entries {
            if !is_notifiable_event_type(&entry.event_type)
                && !is_common_notifiable_event_type(&entry.event_type)
            {
                return Err(AppError::Validation(format!(
                    "Unknown event type: {}",
                    entry.event_type
                )));
            }
        }

        let mut applied = Vec::with_capacity(entries.len());
        for entry in entries {
            let now = chrono::Utc::now().naive_utc();
            let row = self
                .store
                .upsert(&entry.event_type, entry.enabled, now)
                .await?;
            applied.push(EventSetting {
                event_type: row.event_type,
                enabled: row.enabled,
            });
        }
        Ok(applied)
    }

    /// Delivery gate for the dispatcher. Fail-open: no stored row means
    /// enabled.
    pub async fn is_enabled(&self, event_type: &str) -> AppResult<bool> {
        Ok(self
            .store
            .find(event_type)
            .await?
            .map(|row| row.enabled)
            .unwrap_or(true))
    }
}
