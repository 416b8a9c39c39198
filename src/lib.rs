//! Stationery Client Library
//!
//! Client SDK for the stationery inventory and request-management backend:
//! role-gated authentication with token refresh, inventory CRUD with derived
//! stock status, the request approval workflow (including the
//! approve-then-deduct saga), notification polling, and report export.
//!
//! Every view-model fetches on demand, holds a local copy of its list,
//! mutates that copy optimistically for responsiveness, and reconciles via
//! refetch or explicit rollback on failure. There is no shared store; each
//! view-model owns its own state.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod errors;
pub mod inventory;
pub mod models;
pub mod notifications;
pub mod pagination;
pub mod profile;
pub mod reports;
pub mod requests;

pub use auth::{AuthClient, AuthenticatedUser, Role, SessionClient, SessionStore};
pub use config::ClientConfig;
pub use errors::ClientError;
pub use inventory::{InventoryScope, InventoryViewModel};
pub use notifications::NotificationFeed;
pub use profile::TeacherProfileClient;
pub use reports::ReportsClient;
pub use requests::{RequestSelection, RequestWorkflow, SubmissionOutcome};
