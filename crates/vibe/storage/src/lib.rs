//! # vibe-storage
//!
//! The persistence boundary of the vibe core: a synchronous
//! [`KeyValueStore`] seam, the [`MemoryStore`] reference backend, and the
//! typed [`ProfileStore`] that owns the versioned key schema for the three
//! persisted structures (weight delta, correction log, insight snapshot).
//!
//! Loads surface degradation through [`StateLoad`] instead of failing;
//! saves are plain `Result`s the runtime treats as best-effort. Nothing
//! here retries or queues.

#![deny(unsafe_code)]

pub mod kv;
pub mod profile;

use thiserror::Error;

/// Failures at the persistence boundary.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not serve the request.
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    /// A value could not be serialized for storage.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

// ── Re-exports ──────────────────────────────────────────────────────────

pub use kv::{KeyValueStore, MemoryStore};
pub use profile::{ProfileStore, StateLoad};
