//! Filesystem adapters built on capability-scoped directory handles.

mod blob;

pub use blob::FsBlobStore;
