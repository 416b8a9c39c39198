use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use reqwest::{Method, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::errors::{extract_api_message, ClientError};

/// Persisted session: the client-side analog of the frontend's token storage.
/// Serialized as pretty JSON at the configured session path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub access_token: String,
    pub refresh_token: String,
    /// The user object exactly as the login endpoint returned it.
    #[serde(default)]
    pub user: Option<Value>,
    pub saved_at: DateTime<Utc>,
}

impl StoredSession {
    pub fn new(access_token: String, refresh_token: String, user: Option<Value>) -> Self {
        Self {
            access_token,
            refresh_token,
            user,
            saved_at: Utc::now(),
        }
    }
}

enum StoreInner {
    File(PathBuf),
    Memory(Mutex<Option<StoredSession>>),
}

/// Token persistence. File-backed for real use, in-memory for tests and
/// embedding without a home directory.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<StoreInner>,
}

impl SessionStore {
    pub fn file(path: PathBuf) -> Self {
        Self {
            inner: Arc::new(StoreInner::File(path)),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(StoreInner::Memory(Mutex::new(None))),
        }
    }

    pub fn load(&self) -> Result<Option<StoredSession>, ClientError> {
        match self.inner.as_ref() {
            StoreInner::File(path) => {
                if !path.exists() {
                    return Ok(None);
                }
                let data = fs::read_to_string(path)
                    .map_err(|e| ClientError::Session(format!("failed to read {}: {e}", path.display())))?;
                let session = serde_json::from_str(&data)
                    .map_err(|e| ClientError::Session(format!("failed to parse {}: {e}", path.display())))?;
                Ok(Some(session))
            }
            StoreInner::Memory(slot) => {
                Ok(slot.lock().unwrap_or_else(|e| e.into_inner()).clone())
            }
        }
    }

    pub fn save(&self, session: &StoredSession) -> Result<(), ClientError> {
        match self.inner.as_ref() {
            StoreInner::File(path) => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent).map_err(|e| {
                        ClientError::Session(format!("failed creating {}: {e}", parent.display()))
                    })?;
                }
                let payload = serde_json::to_vec_pretty(session)?;
                fs::write(path, payload)
                    .map_err(|e| ClientError::Session(format!("failed writing {}: {e}", path.display())))
            }
            StoreInner::Memory(slot) => {
                *slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(session.clone());
                Ok(())
            }
        }
    }

    /// Removes the session. Cleared on logout and on unrecoverable auth
    /// failure.
    pub fn clear(&self) -> Result<(), ClientError> {
        match self.inner.as_ref() {
            StoreInner::File(path) => {
                if path.exists() {
                    fs::remove_file(path).map_err(|e| {
                        ClientError::Session(format!("failed removing {}: {e}", path.display()))
                    })?;
                }
                Ok(())
            }
            StoreInner::Memory(slot) => {
                *slot.lock().unwrap_or_else(|e| e.into_inner()) = None;
                Ok(())
            }
        }
    }

    /// Swaps in a freshly refreshed access token, keeping the refresh token
    /// and user untouched.
    pub fn update_access_token(&self, access_token: &str) -> Result<(), ClientError> {
        let Some(mut session) = self.load()? else {
            return Err(ClientError::Session("no session to update".to_string()));
        };
        session.access_token = access_token.to_string();
        session.saved_at = Utc::now();
        self.save(&session)
    }
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
}

/// Bearer-authenticated HTTP client with one-shot refresh-and-retry.
///
/// Every call attaches `Authorization: Bearer <access>` from the store. A 401
/// triggers exactly one `POST /token/refresh/`; on success the original
/// request is retried once with the new token. If the refresh fails the store
/// is cleared and the call ends in [`ClientError::AuthExpired`]. Concurrent
/// 401s may each run their own refresh; there is no queuing or deduplication.
#[derive(Clone)]
pub struct SessionClient {
    http: reqwest::Client,
    config: ClientConfig,
    store: SessionStore,
}

impl SessionClient {
    pub fn new(config: ClientConfig, store: SessionStore) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            store,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Absolute URL for an API path, with query pairs appended.
    pub fn url_with(&self, path: &str, pairs: &[(&str, String)]) -> Result<Url, ClientError> {
        let base = self.config.endpoint(path);
        Url::parse_with_params(&base, pairs.iter().map(|(k, v)| (*k, v.as_str())))
            .map_err(|e| ClientError::Parse(format!("invalid URL {base}: {e}")))
    }

    /// Core authenticated call. `body` is JSON-serialized when present.
    #[instrument(skip(self, body), fields(%method, path))]
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Response, ClientError> {
        let url = self.config.endpoint(path);
        self.send_url(method, url, body).await
    }

    /// As [`send`](Self::send), but the URL is already fully built (used for
    /// query-parameter endpoints).
    pub async fn send_url(
        &self,
        method: Method,
        url: impl Into<String>,
        body: Option<&Value>,
    ) -> Result<Response, ClientError> {
        let url = url.into();
        let Some(session) = self.store.load()? else {
            return Err(ClientError::AuthExpired);
        };

        let response = self
            .execute(method.clone(), &url, body, &session.access_token)
            .await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!("access token rejected, attempting refresh");
        let access = match self.refresh_access_token(&session.refresh_token).await {
            Ok(access) => access,
            Err(err) => {
                warn!(error = %err, "token refresh failed, clearing session");
                self.store.clear()?;
                return Err(ClientError::AuthExpired);
            }
        };
        self.store.update_access_token(&access)?;

        // One retry only; a second 401 propagates to the caller as-is.
        self.execute(method, &url, body, &access).await
    }

    /// Runs a refresh cycle immediately instead of waiting for a 401. A
    /// failed refresh clears the store the same way the lazy path does.
    pub async fn refresh_session(&self) -> Result<(), ClientError> {
        let Some(session) = self.store.load()? else {
            return Err(ClientError::AuthExpired);
        };
        match self.refresh_access_token(&session.refresh_token).await {
            Ok(access) => self.store.update_access_token(&access),
            Err(err) => {
                warn!(error = %err, "token refresh failed, clearing session");
                self.store.clear()?;
                Err(ClientError::AuthExpired)
            }
        }
    }

    async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        access_token: &str,
    ) -> Result<Response, ClientError> {
        let mut request = self
            .http
            .request(method, url)
            .bearer_auth(access_token)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> Result<String, ClientError> {
        let response = self
            .http
            .post(self.config.endpoint("token/refresh/"))
            .json(&serde_json::json!({ "refresh": refresh_token }))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::api(status, extract_api_message(status, &body)));
        }
        let refreshed: RefreshResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Parse(format!("refresh response: {e}")))?;
        Ok(refreshed.access)
    }
}

/// Turns a non-2xx response into [`ClientError::Api`] with a best-effort
/// message, passing successful responses through.
pub async fn expect_success(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::api(status, extract_api_message(status, &body)))
}

/// `expect_success` + JSON decode.
pub async fn expect_json<T: serde::de::DeserializeOwned>(
    response: Response,
) -> Result<T, ClientError> {
    let response = expect_success(response).await?;
    response
        .json::<T>()
        .await
        .map_err(|e| ClientError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips() {
        let store = SessionStore::in_memory();
        assert!(store.load().unwrap().is_none());

        let session = StoredSession::new("a".into(), "r".into(), None);
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap().unwrap().access_token, "a");

        store.update_access_token("a2").unwrap();
        let reloaded = store.load().unwrap().unwrap();
        assert_eq!(reloaded.access_token, "a2");
        assert_eq!(reloaded.refresh_token, "r");

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn file_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::file(dir.path().join("nested").join("session.json"));
        assert!(store.load().unwrap().is_none());

        let session = StoredSession::new(
            "tok".into(),
            "ref".into(),
            Some(serde_json::json!({"role": "teacher"})),
        );
        store.save(&session).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.access_token, "tok");
        assert_eq!(loaded.user.unwrap()["role"], "teacher");

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        // clearing twice should not error
        store.clear().unwrap();
    }

    #[test]
    fn updating_without_session_is_an_error() {
        let store = SessionStore::in_memory();
        assert!(matches!(
            store.update_access_token("x"),
            Err(ClientError::Session(_))
        ));
    }
}
