//! In-memory adapters backing tests and local development.

mod activity;
mod blob;
mod notifier;
mod store;

pub use activity::RecordingActivityLog;
pub use blob::InMemoryBlobStore;
pub use notifier::{RecordingNotifier, SentTo};
pub use store::InMemoryTaskStore;
