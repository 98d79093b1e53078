//! # driftsync - three-way directory synchronization
//!
//! Reconciles a local directory tree with a remote hierarchical file store
//! using the last-synchronized state as the third point of comparison, so
//! "created since last sync" and "deleted since last sync" are told apart
//! instead of guessed.

// Module declarations
pub mod commands;
pub mod config;
pub mod diff;
pub mod engine;
pub mod executor;
pub mod filter;
pub mod remote;
pub mod scanner;
pub mod state;
pub mod types;

// Re-export commonly used types
pub use config::{ConflictStrategy, Direction, SyncOptions};
pub use engine::SyncEngine;
pub use remote::{DirStore, MemoryStore, RemoteStore, RetryingStore};
pub use state::{StateStore, SyncState, STATE_FILE_NAME};
pub use types::{SyncError, SyncReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
