//! SyncReport - the result contract returned by a pass

use super::error::ActionError;

/// Which side a conflict resolution transferred from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedSide {
    /// Local copy force-uploaded over the remote
    Local,
    /// Remote copy force-downloaded over the local
    Remote,
}

/// Record of one resolved conflict: which transfer ran and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictResolution {
    pub path: String,
    pub side: ResolvedSide,
    pub reason: String,
}

/// Outcome of a single pass.
///
/// Itemized path lists per category plus the isolated per-file errors. The
/// command layer renders this and maps it to an exit code; the engine itself
/// never prints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    /// Files classified for upload this pass (planned, pre-execution)
    pub to_upload: Vec<String>,

    /// Files classified for download this pass (planned, pre-execution)
    pub to_download: Vec<String>,

    /// Previously synced, now present only locally (deleted remotely)
    pub only_local: Vec<String>,

    /// Previously synced, now present only remotely (deleted locally)
    pub only_remote: Vec<String>,

    /// Paths already in sync
    pub in_sync: Vec<String>,

    /// Successfully uploaded paths
    pub uploaded: Vec<String>,

    /// Successfully downloaded paths
    pub downloaded: Vec<String>,

    /// Local orphan copies removed
    pub deleted_local: Vec<String>,

    /// Remote orphan copies removed
    pub deleted_remote: Vec<String>,

    /// Paths classified as conflicting this pass (planned, pre-resolution)
    pub pending_conflicts: Vec<String>,

    /// Conflicts resolved this pass, with the transfer applied
    pub conflicts: Vec<ConflictResolution>,

    /// Per-file failures; never abort the pass
    pub errors: Vec<ActionError>,

    /// Bytes the planned uploads and downloads would move
    pub pending_bytes: u64,

    /// Bytes moved by successful transfers
    pub bytes_transferred: u64,

    /// True when the pass computed actions without mutating anything
    pub dry_run: bool,

    /// True when cancellation stopped the pass between actions
    pub cancelled: bool,
}

impl SyncReport {
    /// A pass with zero errors is successful; resolved conflicts do not
    /// count against it.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn transfer_count(&self) -> usize {
        self.uploaded.len() + self.downloaded.len()
    }

    pub fn delete_count(&self) -> usize {
        self.deleted_local.len() + self.deleted_remote.len()
    }

    /// Whether anything was planned beyond already-synced files.
    pub fn has_pending_actions(&self) -> bool {
        !self.to_upload.is_empty()
            || !self.to_download.is_empty()
            || !self.only_local.is_empty()
            || !self.only_remote.is_empty()
            || !self.pending_conflicts.is_empty()
            || !self.conflicts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::error::ActionKind;

    #[test]
    fn test_empty_report_is_success() {
        let report = SyncReport::default();
        assert!(report.is_success());
        assert!(!report.has_pending_actions());
        assert_eq!(report.transfer_count(), 0);
        assert_eq!(report.delete_count(), 0);
    }

    #[test]
    fn test_errors_fail_the_pass() {
        let mut report = SyncReport::default();
        report
            .errors
            .push(ActionError::new("a.txt", ActionKind::Upload, "boom"));
        assert!(!report.is_success());
    }

    #[test]
    fn test_resolved_conflicts_do_not_fail_the_pass() {
        let mut report = SyncReport::default();
        report.conflicts.push(ConflictResolution {
            path: "notes.txt".to_string(),
            side: ResolvedSide::Remote,
            reason: "remote side newer".to_string(),
        });
        assert!(report.is_success());
        assert!(report.has_pending_actions());
    }

    #[test]
    fn test_counts() {
        let mut report = SyncReport::default();
        report.uploaded.push("a".to_string());
        report.downloaded.push("b".to_string());
        report.deleted_remote.push("c".to_string());
        assert_eq!(report.transfer_count(), 2);
        assert_eq!(report.delete_count(), 1);
    }
}
