//! Wire types for the backend contract plus the pure derivations the client
//! performs on top of them (stock status, display names, search matching).

pub mod inventory;
pub mod notifications;
pub mod reports;
pub mod requests;
pub mod users;

pub use inventory::{Category, InventoryItem, ItemDraft, RawInventoryItem, StockStatus};
pub use notifications::{Notification, ReadFilter};
pub use reports::{ReportBundle, ReportFormat, ReportQuery, ReportType};
pub use requests::{InventoryRequest, NewRequestPayload, RequestDecision, RequestStatus};
pub use users::{
    ClassSubject, ClassSubjectSelection, SchoolClass, SignupForm, Subject, TeacherProfile,
    UserAccount,
};
