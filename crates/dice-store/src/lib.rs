//! Section-keyed document store abstraction with two interchangeable
//! backends, selected once at orchestrator startup.
mod any;
mod error;
#[cfg(feature = "document")]
mod document;
#[cfg(feature = "file")]
mod file;
mod store;

pub use any::AnyStore;
pub use error::StoreError;
#[cfg(feature = "document")]
pub use document::DocumentStore;
#[cfg(feature = "file")]
pub use file::FileStore;
pub use store::{StorageInfo, Store};
