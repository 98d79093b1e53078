//! Diff engine - three-way comparison and conflict resolution

mod compare;
mod conflict;

pub use compare::{classify, Classification, ConflictPair, SyncedPair};
pub use conflict::{resolve, Resolution};
