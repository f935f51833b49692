//! Persistence coordination for the hebdo application.
//!
//! This crate connects the pure board logic of `hebdo-protocol` to the
//! storage media of `hebdo-storage`:
//!
//! - [`coordinator`]: initial load, optimistic mutations with rollback,
//!   and debounced auto-save
//! - [`auth`]: authentication status, token resolution, and the backend
//!   selection policy
//! - [`transfer`]: export and import of the full board
//! - [`error`]: sync error types
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use hebdo_protocol::TaskDraft;
//! use hebdo_storage::LocalStore;
//! use hebdo_sync::{AuthStatus, Coordinator};
//!
//! # async fn example() -> hebdo_sync::Result<()> {
//! let local = Arc::new(LocalStore::at_default_location()?);
//! let mut coordinator = Coordinator::new(local, None);
//! coordinator.set_auth_status(AuthStatus::Guest).await;
//!
//! coordinator
//!     .create_task(TaskDraft::new("Water the plants", "2025-09-07"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod coordinator;
pub mod error;
pub mod transfer;

// Re-export primary types at crate root for convenience
pub use auth::{AuthStatus, BackendKind, TOKEN_ENV, resolve_token, select_backend};
pub use coordinator::{Coordinator, DEFAULT_AUTOSAVE_DEBOUNCE};
pub use error::{Result, SyncError};
pub use transfer::TransferDocument;
