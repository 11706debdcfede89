use crate::{error::AppResult, events::ComplaintEventType};
use async_trait::async_trait;
use std::sync::Arc;

/// Read-only view of the user directory, answered by the account
/// subsystem.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn admin_user_ids(&self) -> AppResult<Vec<i32>>;
}

/// Recipients resolved for a single complaint event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Receivers {
    pub admin_user_ids: Vec<i32>,
    pub officer_user_ids: Vec<i32>,
}

impl Receivers {
    /// Union of both sets, first occurrence wins. An admin who is also the
    /// assigned officer gets a single row, not two.
    pub fn distinct_recipients(&self) -> Vec<i32> {
        let mut recipients = Vec::new();
        for &id in self
            .admin_user_ids
            .iter()
            .chain(self.officer_user_ids.iter())
        {
            if !recipients.contains(&id) {
                recipients.push(id);
            }
        }
        recipients
    }
}

pub struct ReceiverResolver {
    directory: Arc<dyn UserDirectory>,
}

impl ReceiverResolver {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    /// Admins see every complaint event. The assigned officer is added only
    /// for assignment and extension lifecycle events, and only when the
    /// complaint actually has one. A directory failure degrades to an empty
    /// admin set instead of propagating.
    pub async fn resolve(
        &self,
        event_type: ComplaintEventType,
        assigned_officer_id: Option<i32>,
    ) -> Receivers {
        let admin_user_ids = match self.directory.admin_user_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!("Admin directory lookup failed, notifying no admins: {}", e);
                Vec::new()
            }
        };

        let officer_user_ids = match assigned_officer_id {
            Some(officer_id) if event_type.officer_relevant() => vec![officer_id],
            _ => Vec::new(),
        };

        Receivers {
            admin_user_ids,
            officer_user_ids,
        }
    }
}
