use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Stock,
    Requests,
    Movement,
    Teacher,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Stock => "stock",
            ReportType::Requests => "requests",
            ReportType::Movement => "movement",
            ReportType::Teacher => "teacher",
        }
    }

    /// Table columns for this report type, in render order.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            ReportType::Stock => &["name", "category", "quantity", "usage", "status"],
            ReportType::Requests => &["user", "item", "quantity", "status", "created_at"],
            ReportType::Movement => &["item", "change", "quantity_after_change", "reason", "timestamp"],
            ReportType::Teacher => &["teacher", "total_requests", "approved", "rejected"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Pdf,
    Excel,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Excel => "excel",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Excel => "xlsx",
        }
    }
}

/// Filters for the report endpoints. Empty dates are omitted from the query
/// string entirely; category defaults to the backend's "all" sentinel.
#[derive(Debug, Clone)]
pub struct ReportQuery {
    pub report_type: ReportType,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub category: String,
}

impl ReportQuery {
    pub fn new(report_type: ReportType) -> Self {
        Self {
            report_type,
            start_date: None,
            end_date: None,
            category: "all".to_string(),
        }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("type", self.report_type.as_str().to_string())];
        if let Some(start) = self.start_date.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("start_date", start.to_string()));
        }
        if let Some(end) = self.end_date.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("end_date", end.to_string()));
        }
        pairs.push(("category", self.category.clone()));
        pairs
    }
}

/// Aggregated report payload: row data plus summary stats, both left as JSON
/// because every report type has its own shape.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportBundle {
    #[serde(rename = "type", default)]
    pub report_type: Option<String>,
    #[serde(default)]
    pub data: Vec<Value>,
    #[serde(default)]
    pub stats: Value,
}
