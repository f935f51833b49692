//! Storage backends for the hebdo application.
//!
//! This crate provides the persistence media the board syncs against,
//! behind one capability interface:
//!
//! - [`backend`]: the [`TaskBackend`] trait every medium implements
//! - [`envelope`]: the versioned on-disk envelope and its migrations
//! - [`local`]: the file-backed store used by guest sessions
//! - [`remote`]: the task-API store used by authenticated sessions
//! - [`memory`]: an in-memory store for ephemeral sessions and tests
//! - [`error`]: storage error types
//!
//! Which backend is active is decided in the sync layer from the current
//! authentication status; nothing in this crate branches on it.

pub mod backend;
pub mod envelope;
pub mod error;
pub mod local;
pub mod memory;
pub mod remote;

// Re-export primary types at crate root for convenience
pub use backend::TaskBackend;
pub use envelope::{Envelope, SCHEMA_VERSION, load_state, save_state, upgrade};
pub use error::{Result, StorageError};
pub use local::LocalStore;
pub use memory::MemoryStore;
pub use remote::RemoteStore;
