//! Role gate and the login/signup/logout client.
//!
//! The session machinery (token persistence, bearer attach, one-shot
//! refresh-and-retry) lives in [`session`].

pub mod session;

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument};

use crate::config::ClientConfig;
use crate::errors::{extract_api_message, ClientError};
use crate::models::users::{SchoolClass, SignupForm, Subject};

pub use session::{expect_json, expect_success, SessionClient, SessionStore, StoredSession};

/// The three roles the system knows. Maps each role to its login view and
/// post-login redirect target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    StockManager,
    Teacher,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::StockManager => "stock_manager",
            Role::Teacher => "teacher",
        }
    }

    pub fn login_path(&self) -> String {
        format!("/auth/{}", self.as_str())
    }

    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Role::Admin => "/adminDashboard",
            Role::StockManager => "/stockDashboard",
            Role::Teacher => "/teacherDashboard",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Role::Admin => "Admin Access",
            Role::StockManager => "Stock Manager Sign In",
            Role::Teacher => "Teacher Sign In / Sign Up",
        }
    }

    /// Admins authenticate through the backend's own admin surface, not the
    /// token login endpoint.
    pub fn uses_token_login(&self) -> bool {
        !matches!(self, Role::Admin)
    }

    /// Only teachers self-register.
    pub fn signup_allowed(&self) -> bool {
        matches!(self, Role::Teacher)
    }
}

impl FromStr for Role {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "stock_manager" => Ok(Role::StockManager),
            "teacher" => Ok(Role::Teacher),
            other => Err(ClientError::Parse(format!("unknown role '{other}'"))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct TokenPair {
    access: String,
    refresh: String,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    tokens: TokenPair,
    user: Value,
}

/// Outcome of a successful login: where to go next, per the role the
/// backend reported (not the one the form was opened under).
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub role: Role,
    pub user: Value,
}

impl AuthenticatedUser {
    pub fn redirect_target(&self) -> &'static str {
        self.role.dashboard_path()
    }
}

/// Login/signup client. Token issuance is the only unauthenticated POST
/// surface; everything after goes through [`SessionClient`].
#[derive(Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    config: ClientConfig,
    store: SessionStore,
}

impl AuthClient {
    pub fn new(config: ClientConfig, store: SessionStore) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            store,
        }
    }

    /// Authenticates against `POST /users/login/` and persists the session.
    ///
    /// The role is passed through for backend-side validation; the redirect
    /// decision uses the role the backend echoes back on the user object.
    #[instrument(skip(self, password), fields(%role, email))]
    pub async fn login(
        &self,
        role: Role,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, ClientError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ClientError::Validation(
                "please fill in all fields".to_string(),
            ));
        }
        if !role.uses_token_login() {
            return Err(ClientError::Validation(
                "admins must sign in via the backend admin interface".to_string(),
            ));
        }

        let response = self
            .http
            .post(self.config.endpoint("users/login/"))
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "role": role.as_str(),
            }))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::api(status, extract_api_message(status, &body)));
        }

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Parse(format!("login response: {e}")))?;

        let reported_role = login
            .user
            .get("role")
            .and_then(Value::as_str)
            .ok_or_else(|| ClientError::Parse("login response missing user role".to_string()))?
            .parse::<Role>()?;

        self.store.save(&StoredSession::new(
            login.tokens.access,
            login.tokens.refresh,
            Some(login.user.clone()),
        ))?;
        info!(role = %reported_role, "login succeeded");

        Ok(AuthenticatedUser {
            role: reported_role,
            user: login.user,
        })
    }

    /// Registers a new account via `POST /users/signup/`. Local validation
    /// runs first; a failing form never reaches the network.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn signup(&self, form: &SignupForm) -> Result<Value, ClientError> {
        form.validate_for_submit()?;

        let response = self
            .http
            .post(self.config.endpoint("users/signup/"))
            .json(form)
            .send()
            .await?;
        expect_json(response).await
    }

    /// Selectable classes for the signup form.
    pub async fn classes(&self) -> Result<Vec<SchoolClass>, ClientError> {
        let response = self
            .http
            .get(self.config.endpoint("users/classes/"))
            .send()
            .await?;
        expect_json(response).await
    }

    /// Selectable subjects for the signup form.
    pub async fn subjects(&self) -> Result<Vec<Subject>, ClientError> {
        let response = self
            .http
            .get(self.config.endpoint("users/subjects/"))
            .send()
            .await?;
        expect_json(response).await
    }

    /// Drops the stored session.
    pub fn logout(&self) -> Result<(), ClientError> {
        self.store.clear()
    }

    /// The role recorded at login time, if a session exists.
    pub fn current_role(&self) -> Result<Option<Role>, ClientError> {
        let Some(session) = self.store.load()? else {
            return Ok(None);
        };
        Ok(session
            .user
            .as_ref()
            .and_then(|u| u.get("role"))
            .and_then(Value::as_str)
            .and_then(|r| r.parse().ok()))
    }

    /// Session-aware client for the authenticated endpoints.
    pub fn session_client(&self) -> SessionClient {
        SessionClient::new(self.config.clone(), self.store.clone())
    }
}
