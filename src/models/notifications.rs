use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::Role;

/// Notification as delivered by the backend. The type is a free-form string
/// because the server has emitted both snake_case and SCREAMING variants;
/// comparisons are always case-insensitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub notification_type: String,
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub content_object: Option<Value>,
    #[serde(default)]
    pub recipient_email: Option<String>,
}

/// Notification types the stock-manager view shows.
pub const STOCK_MANAGER_TYPES: &[&str] = &["low_stock", "new_request", "stock_updated"];

/// Notification types the teacher view shows.
pub const TEACHER_TYPES: &[&str] = &["teacher-low-stock", "request-approved", "request-rejected"];

impl Notification {
    /// Role allow-list filter. Admins see everything.
    pub fn relevant_to(&self, role: Role) -> bool {
        let allow = match role {
            Role::Admin => return true,
            Role::StockManager => STOCK_MANAGER_TYPES,
            Role::Teacher => TEACHER_TYPES,
        };
        let kind = self.notification_type.to_lowercase();
        allow.iter().any(|t| *t == kind)
    }
}

/// Read-state filter for the feed. `Unread` is pushed down to the backend as
/// an `is_read=false` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadFilter {
    All,
    #[default]
    Unread,
}
