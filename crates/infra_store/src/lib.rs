//! In-memory persistence for the posting engine
//!
//! The store keeps every table the engine needs: accounts with version
//! tokens, till sessions, approval requests, append-only posting rows, day
//! assignments, and the reference counters. Mutations arrive as a
//! [`WriteSet`] and land atomically or not at all, which is what the
//! orchestrator's discard-and-revert failure path relies on.

pub mod error;
pub mod memory;
pub mod sequence;
pub mod writeset;

pub use error::StoreError;
pub use memory::{MemoryStore, Versioned};
pub use sequence::ReferenceSequencer;
pub use writeset::{AccountWrite, ApprovalWrite, SessionWrite, WriteSet};
