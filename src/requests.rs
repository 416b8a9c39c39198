//! Request workflow: the review queue with its approve-then-deduct saga, and
//! the teacher-side batch submission.

use futures::future::join_all;
use reqwest::Method;
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::auth::session::{expect_json, SessionClient};
use crate::errors::ClientError;
use crate::models::requests::{
    InventoryRequest, NewRequestPayload, RequestDecision, RequestStatus,
};
use crate::pagination::Paginator;

/// An item picked for a new request, carrying the availability observed at
/// selection time. Quantity is clamped to `1..=available` on submit, the
/// same bounds the form enforced.
#[derive(Debug, Clone)]
pub struct RequestSelection {
    pub item_id: u64,
    pub item_name: String,
    pub quantity: u32,
    pub available: u32,
}

/// Per-item result of a batch submission. Submissions the backend already
/// accepted are never rolled back when a sibling fails.
#[derive(Debug)]
pub struct SubmissionOutcome {
    pub item_id: u64,
    pub item_name: String,
    pub result: Result<InventoryRequest, ClientError>,
}

impl SubmissionOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

pub struct RequestWorkflow {
    client: SessionClient,
    requests: Vec<InventoryRequest>,
    search: String,
    pager: Paginator,
}

impl RequestWorkflow {
    pub fn new(client: SessionClient) -> Self {
        let per_page = client.config().request_page_size;
        Self {
            client,
            requests: Vec::new(),
            search: String::new(),
            pager: Paginator::new(per_page),
        }
    }

    /// Fetches the request list. The backend scopes by token: teachers see
    /// their own requests, stock managers the full review queue. A body that
    /// is not an array is treated as empty rather than an error.
    #[instrument(skip(self))]
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let response = self
            .client
            .send(Method::GET, "requests/requests/", None)
            .await?;
        let body: Value = expect_json(response).await?;
        self.requests = match body {
            Value::Array(_) => serde_json::from_value(body)?,
            _ => Vec::new(),
        };
        self.pager.sync(self.filtered().len());
        Ok(())
    }

    pub fn requests(&self) -> &[InventoryRequest] {
        &self.requests
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
        self.pager.reset();
    }

    /// Case-insensitive substring filter across requester name, classes,
    /// item name and status.
    pub fn filtered(&self) -> Vec<&InventoryRequest> {
        let query = self.search.trim();
        if query.is_empty() {
            self.requests.iter().collect()
        } else {
            self.requests
                .iter()
                .filter(|req| req.matches_search(query))
                .collect()
        }
    }

    pub fn visible(&self) -> Vec<&InventoryRequest> {
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

    /// Reviews a pending request: optimistic local status flip, `PATCH` of
    /// the status, then on approval the inventory deduction.
    ///
    /// Failure of the PATCH rolls the list back to its pre-review snapshot.
    /// Failure of the deduction after a successful PATCH does NOT roll back:
    /// the request is approved server-side, the stock was not deducted, and
    /// the caller gets [`ClientError::PartialApproval`]. There is no
    /// compensating action for that state.
    #[instrument(skip(self), fields(request_id, ?decision))]
    pub async fn review(
        &mut self,
        request_id: u64,
        decision: RequestDecision,
    ) -> Result<(), ClientError> {
        let snapshot = self.requests.clone();
        let target = self
            .requests
            .iter_mut()
            .find(|req| req.id == request_id)
            .ok_or_else(|| {
                ClientError::Validation(format!("no request with id {request_id}"))
            })?;
        if target.status != RequestStatus::Pending {
            return Err(ClientError::Validation(format!(
                "request {request_id} is already {}",
                target.status.as_str()
            )));
        }
        let item_id = target.item.as_ref().and_then(|item| item.id);
        let quantity = target.quantity;
        let new_status = decision.target_status();
        target.status = new_status;

        let patch = self
            .client
            .send(
                Method::PATCH,
                &format!("requests/requests/{request_id}/"),
                Some(&serde_json::json!({ "status": new_status.as_str() })),
            )
            .await;
        let updated: InventoryRequest = match patch {
            Ok(response) => match expect_json(response).await {
                Ok(updated) => updated,
                Err(err) => {
                    self.requests = snapshot;
                    return Err(err);
                }
            },
            Err(err) => {
                self.requests = snapshot;
                return Err(err);
            }
        };
        if let Some(slot) = self.requests.iter_mut().find(|req| req.id == request_id) {
            *slot = updated;
        }
        info!(request_id, status = new_status.as_str(), "request reviewed");

        if decision != RequestDecision::Approve {
            return Ok(());
        }
        let Some(item_id) = item_id else {
            warn!(request_id, "approved request has no item reference, skipping deduction");
            return Ok(());
        };
        self.deduct(item_id, quantity).await.map_err(|err| {
            ClientError::PartialApproval {
                request_id,
                detail: err.to_string(),
            }
        })
    }

    async fn deduct(&self, item_id: u64, quantity: u32) -> Result<(), ClientError> {
        let response = self
            .client
            .send(
                Method::POST,
                &format!("inventory/inventory/items/{item_id}/deduct/"),
                Some(&serde_json::json!({ "quantity": quantity })),
            )
            .await?;
        let _body: Value = expect_json(response).await?;
        info!(item_id, quantity, "inventory deducted");
        Ok(())
    }

    /// Submits one request per selected item, all POSTs in flight at once.
    ///
    /// Local validation (empty selection, duplicate items) fails the whole
    /// batch before anything is sent. After that, each item reports its own
    /// outcome; a failure does not undo siblings the backend already took.
    #[instrument(skip(self, selections, notes), fields(count = selections.len()))]
    pub async fn submit(
        &self,
        selections: &[RequestSelection],
        notes: &str,
    ) -> Result<Vec<SubmissionOutcome>, ClientError> {
        if selections.is_empty() {
            return Err(ClientError::Validation(
                "select at least one item to request".to_string(),
            ));
        }
        for (i, sel) in selections.iter().enumerate() {
            if selections[..i].iter().any(|s| s.item_id == sel.item_id) {
                return Err(ClientError::Validation(format!(
                    "item '{}' is already in the request",
                    sel.item_name
                )));
            }
        }

        let posts = selections.iter().map(|sel| {
            let payload = NewRequestPayload {
                item_id: sel.item_id,
                quantity: sel.quantity.clamp(1, sel.available.max(1)),
                notes: notes.to_string(),
                available_quantity: sel.available,
            };
            async move {
                let body = serde_json::to_value(&payload)?;
                let response = self
                    .client
                    .send(Method::POST, "requests/requests/", Some(&body))
                    .await?;
                expect_json::<InventoryRequest>(response).await
            }
        });

        let results = join_all(posts).await;
        Ok(selections
            .iter()
            .zip(results)
            .map(|(sel, result)| SubmissionOutcome {
                item_id: sel.item_id,
                item_name: sel.item_name.clone(),
                result,
            })
            .collect())
    }
}
