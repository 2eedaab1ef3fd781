//! Organizer inbox: join requests and contact messages addressed to a host.
//!
//! Hosts are matched by [`host_key`](linkle_shared::host_key), so
//! `"Taro"`, `"Taro "` and `"Ｔａｒｏ"` share one inbox.

use chrono::Utc;
use linkle_shared::constants::DEFAULT_HOST_NAME;
use linkle_shared::inbox::InboxFilter;
use linkle_shared::{HostNotification, NewNotification, NotificationId};
use tracing::{debug, warn};

use crate::error::ClientError;
use crate::events::StoreKey;
use crate::state::AppState;

impl AppState {
    /// Record a new unread notification at the front of the log.
    pub fn push_notification(
        &self,
        input: NewNotification,
    ) -> Result<HostNotification, ClientError> {
        let notification = input.into_notification(NotificationId::generate(), Utc::now());
        self.database.insert_notification(&notification)?;

        debug!(
            id = %notification.id,
            host = %notification.host_name,
            kind = %notification.kind,
            "notification pushed"
        );
        self.events.publish(StoreKey::Notifications);
        Ok(notification)
    }

    /// Notifications for `host`, newest first.
    pub fn get_notifications(&self, host: &str) -> Vec<HostNotification> {
        self.database.notifications_for_host(host).unwrap_or_else(|e| {
            warn!(host, error = %e, "failed to read inbox");
            Vec::new()
        })
    }

    pub fn unread_count(&self, host: &str) -> u32 {
        match self.database.unread_count_for_host(host) {
            Ok(n) => u32::try_from(n).unwrap_or(u32::MAX),
            Err(e) => {
                warn!(host, error = %e, "failed to count unread notifications");
                0
            }
        }
    }

    /// `unread -> read` for one notification.  `false` if the id is unknown.
    pub fn mark_as_read(&self, id: &NotificationId) -> bool {
        match self.database.mark_notification_read(id) {
            Ok(changed) => {
                if changed {
                    self.events.publish(StoreKey::Notifications);
                }
                changed
            }
            Err(e) => {
                warn!(%id, error = %e, "failed to mark notification read");
                false
            }
        }
    }

    /// Mark everything in `host`'s inbox read in one write.  Returns how many
    /// notifications changed.
    pub fn mark_all_read(&self, host: &str) -> usize {
        match self.database.mark_all_read_for_host(host) {
            Ok(changed) => {
                self.events.publish(StoreKey::Notifications);
                changed
            }
            Err(e) => {
                warn!(host, error = %e, "failed to mark inbox read");
                0
            }
        }
    }

    /// Remove a notification the host reported.
    pub fn report_notification(&self, id: &NotificationId) -> bool {
        match self.database.delete_notification(id) {
            Ok(removed) => {
                if removed {
                    self.events.publish(StoreKey::Notifications);
                }
                removed
            }
            Err(e) => {
                warn!(%id, error = %e, "failed to remove notification");
                false
            }
        }
    }

    pub fn filter_inbox(&self, host: &str, filter: &InboxFilter) -> Vec<HostNotification> {
        self.get_notifications(host)
            .into_iter()
            .filter(|n| filter.matches(n))
            .collect()
    }

    /// Whose inbox this device shows: session name, else profile nickname,
    /// else the Linkle office account.
    pub fn current_host_name(&self) -> String {
        if let Some(name) = self.auth.session().and_then(|s| s.display_name()) {
            return name.to_string();
        }
        self.settings()
            .nickname()
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_HOST_NAME.to_string())
    }
}
