use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Three-valued stock classification, derived from quantity vs. the
/// configured low-stock threshold. The backend stores a status column too,
/// but the client never trusts it when quantity and threshold are known:
/// status is recomputed after every fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    /// Pure derivation. Quantities are unsigned on this backend, so the
    /// out-of-stock case is exactly zero.
    pub fn derive(quantity: u32, low_stock_threshold: u32) -> Self {
        if quantity == 0 {
            StockStatus::OutOfStock
        } else if quantity <= low_stock_threshold {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StockStatus::InStock => "In Stock",
            StockStatus::LowStock => "Low Stock",
            StockStatus::OutOfStock => "Out of Stock",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub is_custom: bool,
}

/// Inventory item exactly as the backend serializes it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawInventoryItem {
    pub id: u64,
    pub name: String,
    pub category: Category,
    pub quantity: u32,
    pub low_stock_threshold: u32,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// The view the tables work with: category flattened to its name, status
/// recomputed locally.
#[derive(Debug, Clone, Serialize)]
pub struct InventoryItem {
    pub id: u64,
    pub name: String,
    pub category: String,
    pub quantity: u32,
    pub low_stock_threshold: u32,
    pub status: StockStatus,
}

impl From<RawInventoryItem> for InventoryItem {
    fn from(raw: RawInventoryItem) -> Self {
        let status = StockStatus::derive(raw.quantity, raw.low_stock_threshold);
        InventoryItem {
            id: raw.id,
            name: raw.name,
            category: raw.category.name,
            quantity: raw.quantity,
            low_stock_threshold: raw.low_stock_threshold,
            status,
        }
    }
}

impl InventoryItem {
    /// Case-insensitive substring match on name or category.
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.category.to_lowercase().contains(&query)
    }
}

/// Form fields for creating or editing an item. The category is entered by
/// name and resolved (or created) before the item is saved.
#[derive(Debug, Clone)]
pub struct ItemDraft {
    pub name: String,
    pub category: String,
    pub quantity: u32,
    pub low_stock_threshold: u32,
}

/// Item payload once the category has been resolved to an id.
#[derive(Debug, Serialize)]
pub struct ItemPayload {
    pub name: String,
    pub category_id: u64,
    pub quantity: u32,
    pub low_stock_threshold: u32,
}
