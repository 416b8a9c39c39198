//! Notification feed: polled fetch, role-scoped filtering, read-state
//! mutations with optimistic update and rollback.

use reqwest::Method;
use serde_json::Value;
use tracing::instrument;

use crate::auth::session::{expect_json, expect_success, SessionClient};
use crate::auth::Role;
use crate::errors::ClientError;
use crate::models::notifications::{Notification, ReadFilter};

pub struct NotificationFeed {
    client: SessionClient,
    role: Role,
    filter: ReadFilter,
    notifications: Vec<Notification>,
}

impl NotificationFeed {
    pub fn new(client: SessionClient, role: Role) -> Self {
        Self {
            client,
            role,
            filter: ReadFilter::default(),
            notifications: Vec::new(),
        }
    }

    pub fn filter(&self) -> ReadFilter {
        self.filter
    }

    /// Fetches notifications. `Unread` is pushed down as `is_read=false`;
    /// the role allow-list is applied client-side on top. The backend has
    /// answered with a bare array as well as `{results}` / `{notifications}`
    /// wrappers, so all three shapes are accepted.
    #[instrument(skip(self), fields(role = %self.role, ?filter))]
    pub async fn refresh(&mut self, filter: ReadFilter) -> Result<(), ClientError> {
        self.filter = filter;
        let response = match filter {
            ReadFilter::Unread => {
                let url = self
                    .client
                    .url_with("notifications/", &[("is_read", "false".to_string())])?;
                self.client.send_url(Method::GET, url, None).await?
            }
            ReadFilter::All => self.client.send(Method::GET, "notifications/", None).await?,
        };
        let body: Value = expect_json(response).await?;
        let received: Vec<Notification> = match body {
            Value::Array(_) => serde_json::from_value(body)?,
            Value::Object(mut map) => {
                let inner = map
                    .remove("results")
                    .or_else(|| map.remove("notifications"))
                    .unwrap_or(Value::Array(Vec::new()));
                serde_json::from_value(inner)?
            }
            _ => Vec::new(),
        };
        self.notifications = received
            .into_iter()
            .filter(|n| n.relevant_to(self.role))
            .collect();
        Ok(())
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.is_read).count()
    }

    /// Marks one notification read: optimistic local flip, then the
    /// dedicated endpoint; the flip is rolled back if the call fails.
    #[instrument(skip(self))]
    pub async fn mark_read(&mut self, id: u64) -> Result<(), ClientError> {
        let snapshot = self.notifications.clone();
        let target = self
            .notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| ClientError::Validation(format!("no notification with id {id}")))?;
        target.is_read = true;

        let result = self
            .client
            .send(Method::POST, &format!("notifications/{id}/mark_as_read/"), None)
            .await;
        match result {
            Ok(response) => match expect_success(response).await {
                Ok(_) => Ok(()),
                Err(err) => {
                    self.notifications = snapshot;
                    Err(err)
                }
            },
            Err(err) => {
                self.notifications = snapshot;
                Err(err)
            }
        }
    }

    /// Marks everything read. On success every visible notification is read
    /// and the unread count is zero; on failure the previous read states are
    /// restored.
    #[instrument(skip(self))]
    pub async fn mark_all_read(&mut self) -> Result<(), ClientError> {
        let snapshot = self.notifications.clone();
        for notification in &mut self.notifications {
            notification.is_read = true;
        }

        let result = self
            .client
            .send(Method::POST, "notifications/mark_all_as_read/", None)
            .await;
        match result {
            Ok(response) => match expect_success(response).await {
                Ok(_) => Ok(()),
                Err(err) => {
                    self.notifications = snapshot;
                    Err(err)
                }
            },
            Err(err) => {
                self.notifications = snapshot;
                Err(err)
            }
        }
    }
}
