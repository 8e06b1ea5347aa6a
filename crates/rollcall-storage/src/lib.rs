//! # Rollcall Storage
//!
//! The log store for the rollcall check-in board.
//!
//! [`LogStore`] owns the canonical, most-recent-first collection of
//! [`CheckInEvent`]s and mirrors it to a [`LogBackend`] on every mutation.
//! Mutations are serialized behind a single lock that spans the uniqueness
//! check, the durable write, the in-memory swap and the change
//! notification, so concurrent submissions for the same key cannot both win.
//!
//! ## Backends
//!
//! - **JsonFileBackend**: single JSON array file, rewritten atomically (temp file + rename)
//! - **InMemoryBackend**: for tests, with write-failure injection
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rollcall_core::{CheckInEvent, CheckInKey};
//! use rollcall_storage::{Admission, JsonFileBackend, LogStore};
//!
//! let store = LogStore::open(Arc::new(JsonFileBackend::new("user_log.json"))).await?;
//! let key = CheckInKey::new("A1", "gate1")?;
//!
//! match store.admit(CheckInEvent::new(&key, "Alice", "09:30")).await? {
//!     Admission::Admitted(event) => println!("checked in {}", event.display_name),
//!     Admission::Duplicate(existing) => println!("already here since {}", existing.timestamp),
//! }
//! ```

pub mod backend;
pub mod error;
pub mod file;
pub mod memory;
pub mod store;

pub use backend::LogBackend;
pub use error::{StorageError, StorageResult};
pub use file::JsonFileBackend;
pub use memory::InMemoryBackend;
pub use store::{Admission, LogChange, LogChangeKind, LogListener, LogStore};

pub use rollcall_core::{CheckInEvent, CheckInKey, LogSnapshot};
