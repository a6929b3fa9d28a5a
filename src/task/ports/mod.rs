//! Port contracts for the task lifecycle core.
//!
//! Ports define infrastructure-agnostic interfaces for the external
//! collaborators the core consumes: the document store, notification
//! delivery, the activity log, and proof blob storage. The clock port is
//! [`mockable::Clock`].

pub mod activity;
pub mod blob;
pub mod notifier;
pub mod store;

pub use activity::{ActivityAction, ActivityEntry, ActivityLog, ActivityLogError};
pub use blob::{BlobStore, BlobStoreError, BlobStoreResult};
pub use notifier::{NotificationEvent, Notifier, NotifierError};
#[cfg(test)]
pub use notifier::MockNotifier;
pub use store::{TaskStore, TaskStoreError, TaskStoreResult};
