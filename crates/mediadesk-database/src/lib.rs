//! # mediadesk-database
//!
//! The persistence collaborator for mediadesk: a single-writer in-memory
//! entry store with unit-of-work transactions. A commit enforces path
//! uniqueness, drives the [`CommitListener`](mediadesk_entity::CommitListener)
//! hooks in a fixed order and optionally persists a JSON snapshot.

pub mod snapshot;
pub mod store;
pub mod transaction;

pub use snapshot::SnapshotFile;
pub use store::EntryStore;
pub use transaction::{CommitSummary, Transaction};
