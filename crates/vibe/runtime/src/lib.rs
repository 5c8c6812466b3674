//! # vibe-runtime
//!
//! Orchestration of the whole vibe core behind one facade, [`VibeCore`]:
//! per-user sessions hydrated lazily from a [`vibe_storage::KeyValueStore`]
//! backend, read-only inference, serialized correction intake with inline
//! learning, cached insight reads, and periodic weight decay.
//!
//! Persistence is best-effort everywhere: a failed write is logged at
//! `warn!` and the in-memory result still stands; corrupt or unavailable
//! persisted state degrades to defaults on session hydration.

#![deny(unsafe_code)]

pub mod config;
pub mod core;
mod session;

// ── Re-exports ──────────────────────────────────────────────────────────

pub use crate::config::CoreConfig;
pub use crate::core::VibeCore;
