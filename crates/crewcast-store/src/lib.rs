//! Durable task storage for Crewcast.
//!
//! The task store is the single source of truth for every task's identity,
//! state, payload, and result. All post-creation mutations go through
//! [`TaskStore::transition`], which enforces the task state machine and the
//! write-once discipline on results, errors, and timestamps.

/// File-backed store, one JSON document per task.
pub mod file;
/// In-memory store.
pub mod memory;
/// The store trait.
pub mod store;

pub use file::FileTaskStore;
pub use memory::MemoryTaskStore;
pub use store::{StateChange, TaskStore};
