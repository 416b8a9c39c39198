use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::users::{TeacherProfile, UserAccount};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }
}

/// Reviewer decision on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestDecision {
    Approve,
    Reject,
}

impl RequestDecision {
    pub fn target_status(&self) -> RequestStatus {
        match self {
            RequestDecision::Approve => RequestStatus::Approved,
            RequestDecision::Reject => RequestStatus::Rejected,
        }
    }
}

/// The item an inventory request points at, with its available quantity at
/// fetch time. All optional; requests referencing deleted items still render.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestItemRef {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryRequest {
    pub id: u64,
    #[serde(default)]
    pub user: Option<UserAccount>,
    #[serde(default)]
    pub item: Option<RequestItemRef>,
    pub quantity: u32,
    pub status: RequestStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub teacher_profile: Option<TeacherProfile>,
}

impl InventoryRequest {
    pub fn requester_name(&self) -> String {
        self.user
            .as_ref()
            .map(UserAccount::display_name)
            .unwrap_or_else(|| "N/A".to_string())
    }

    pub fn requester_classes(&self) -> String {
        self.teacher_profile
            .as_ref()
            .map(TeacherProfile::class_list)
            .unwrap_or_else(|| "N/A".to_string())
    }

    pub fn item_name(&self) -> String {
        self.item
            .as_ref()
            .and_then(|item| item.name.clone())
            .unwrap_or_else(|| "N/A".to_string())
    }

    /// Case-insensitive substring match across requester name, classes,
    /// item name and status.
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.requester_name().to_lowercase().contains(&query)
            || self.requester_classes().to_lowercase().contains(&query)
            || self.item_name().to_lowercase().contains(&query)
            || self.status.as_str().contains(&query)
    }
}

/// Body for a single request submission. One of these is posted per selected
/// item; the backend validates quantity against the reported availability.
#[derive(Debug, Clone, Serialize)]
pub struct NewRequestPayload {
    pub item_id: u64,
    pub quantity: u32,
    pub notes: String,
    pub available_quantity: u32,
}
