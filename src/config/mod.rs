//! Sync options

use crate::types::SyncError;

/// Which way transfers are allowed to flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Direction {
    /// Local changes propagate to the remote only
    Up,
    /// Remote changes propagate to the local tree only
    Down,
    /// Full bidirectional reconciliation
    #[default]
    Both,
}

impl Direction {
    pub fn includes_up(&self) -> bool {
        matches!(self, Direction::Up | Direction::Both)
    }

    pub fn includes_down(&self) -> bool {
        matches!(self, Direction::Down | Direction::Both)
    }
}

/// How divergent changes to the same path are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ConflictStrategy {
    /// Force-upload the local copy, overwriting the remote
    Local,
    /// Force-download the remote copy, overwriting the local file
    Remote,
    /// Transfer from whichever side has the later modification time.
    /// An exact timestamp tie resolves to the local side; this tie-break is
    /// a deliberate, documented decision.
    #[default]
    Newer,
}

/// Options controlling one pass.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Allowed transfer direction
    pub direction: Direction,

    /// Propagate deletions to the orphaned side
    pub delete_orphans: bool,

    /// Compute and report the full action set without mutating anything
    pub dry_run: bool,

    /// Exclusion patterns (restricted wildcard subset, see [`crate::filter`])
    pub exclude: Vec<String>,

    /// Conflict resolution strategy
    pub strategy: ConflictStrategy,

    /// Timestamp delta below which two modification times are treated as
    /// equal; absorbs clock/precision mismatch between filesystem and remote
    pub tolerance_ms: i64,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            direction: Direction::Both,
            delete_orphans: false,
            dry_run: false,
            exclude: Vec::new(),
            strategy: ConflictStrategy::Newer,
            tolerance_ms: 1_000,
        }
    }
}

impl SyncOptions {
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.tolerance_ms < 0 {
            return Err(SyncError::Config(
                "tolerance must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}
