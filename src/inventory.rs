//! Inventory view-model: fetch, derive status, search, paginate, CRUD.
//!
//! One parameterized view-model serves both the shared stockroom and the
//! teacher-scoped inventory; the endpoint base is the only difference.

use reqwest::Method;
use tracing::{info, instrument};

use crate::auth::session::{expect_json, expect_success, SessionClient};
use crate::errors::ClientError;
use crate::models::inventory::{
    Category, InventoryItem, ItemDraft, ItemPayload, RawInventoryItem,
};
use crate::pagination::Paginator;

/// Which inventory the view-model points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryScope {
    /// The shared stockroom (`inventory/inventory/`).
    Shared,
    /// Items assigned to the logged-in teacher (`inventory/teacher/inventory/`).
    Teacher,
}

impl InventoryScope {
    fn base(&self) -> &'static str {
        match self {
            InventoryScope::Shared => "inventory/inventory",
            InventoryScope::Teacher => "inventory/teacher/inventory",
        }
    }

    fn list_path(&self) -> String {
        format!("{}/", self.base())
    }

    fn item_path(&self, id: u64) -> String {
        format!("{}/{}/", self.base(), id)
    }
}

pub struct InventoryViewModel {
    client: SessionClient,
    scope: InventoryScope,
    items: Vec<InventoryItem>,
    categories: Vec<Category>,
    search: String,
    pager: Paginator,
}

impl InventoryViewModel {
    pub fn new(client: SessionClient, scope: InventoryScope) -> Self {
        let per_page = client.config().inventory_page_size;
        Self {
            client,
            scope,
            items: Vec::new(),
            categories: Vec::new(),
            search: String::new(),
            pager: Paginator::new(per_page),
        }
    }

    /// Refetches items and the category list.
    pub async fn load(&mut self) -> Result<(), ClientError> {
        self.refresh().await?;
        self.refresh_categories().await
    }

    /// Fetches all items, flattening the category and recomputing status.
    #[instrument(skip(self), fields(scope = ?self.scope))]
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let response = self
            .client
            .send(Method::GET, &self.scope.list_path(), None)
            .await?;
        let raw: Vec<RawInventoryItem> = expect_json(response).await?;
        self.items = raw.into_iter().map(InventoryItem::from).collect();
        self.pager.sync(self.filtered().len());
        Ok(())
    }

    pub async fn refresh_categories(&mut self) -> Result<(), ClientError> {
        let response = self
            .client
            .send(Method::GET, "inventory/categories/", None)
            .await?;
        self.categories = expect_json(response).await?;
        Ok(())
    }

    /// All fetched items, unfiltered. Empty means "render the empty state",
    /// which is distinct from a searched-down-to-nothing table.
    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Updates the filter and jumps back to page 1.
    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
        self.pager.reset();
    }

    /// Case-insensitive substring filter over name or category. Never longer
    /// than the unfiltered list.
    pub fn filtered(&self) -> Vec<&InventoryItem> {
        let query = self.search.trim();
        if query.is_empty() {
            self.items.iter().collect()
        } else {
            self.items
                .iter()
                .filter(|item| item.matches_search(query))
                .collect()
        }
    }

    /// The current page of the filtered list.
    pub fn visible(&self) -> Vec<&InventoryItem> {
        let filtered = self.filtered();
        self.pager.slice(&filtered).to_vec()
    }

    pub fn page(&self) -> usize {
        self.pager.page()
    }

    pub fn page_count(&self) -> usize {
        self.pager.page_count(self.filtered().len())
    }

    pub fn next_page(&mut self) {
        let len = self.filtered().len();
        self.pager.next_page(len);
    }

    pub fn prev_page(&mut self) {
        self.pager.prev_page();
    }

    /// Category name → id, by case-sensitive exact match. A name with no
    /// match is created on the fly; the backend flags it `is_custom`.
    async fn resolve_category(&mut self, name: &str) -> Result<u64, ClientError> {
        if let Some(existing) = self.categories.iter().find(|c| c.name == name) {
            return Ok(existing.id);
        }
        info!(category = name, "creating category on the fly");
        let response = self
            .client
            .send(
                Method::POST,
                "inventory/categories/",
                Some(&serde_json::json!({ "name": name })),
            )
            .await?;
        let created: Category = expect_json(response).await?;
        let id = created.id;
        self.categories.push(created);
        Ok(id)
    }

    /// Creates (`editing = None`) or updates an item. The category is
    /// resolved or created first; the item save only goes out once a
    /// category id exists. The local list is untouched until the refetch
    /// after a successful save, so a failure leaves the table as-is and the
    /// caller still holds the draft.
    #[instrument(skip(self, draft), fields(scope = ?self.scope, name = %draft.name))]
    pub async fn save(
        &mut self,
        draft: &ItemDraft,
        editing: Option<u64>,
    ) -> Result<(), ClientError> {
        let category_id = self.resolve_category(&draft.category).await?;
        let payload = ItemPayload {
            name: draft.name.clone(),
            category_id,
            quantity: draft.quantity,
            low_stock_threshold: draft.low_stock_threshold,
        };
        let body = serde_json::to_value(&payload)?;

        let response = match editing {
            Some(id) => {
                self.client
                    .send(Method::PUT, &self.scope.item_path(id), Some(&body))
                    .await?
            }
            None => {
                self.client
                    .send(Method::POST, &self.scope.list_path(), Some(&body))
                    .await?
            }
        };
        expect_success(response).await?;
        self.refresh().await
    }

    /// Deletes then refetches. On any failure the list is unchanged.
    #[instrument(skip(self), fields(scope = ?self.scope))]
    pub async fn delete(&mut self, id: u64) -> Result<(), ClientError> {
        let response = self
            .client
            .send(Method::DELETE, &self.scope.item_path(id), None)
            .await?;
        expect_success(response).await?;
        self.refresh().await
    }
}
