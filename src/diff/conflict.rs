//! Conflict resolution

use super::ConflictPair;
use crate::config::ConflictStrategy;
use crate::types::ResolvedSide;

/// The transfer chosen for one conflict, with the reason recorded for the
/// pass report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub side: ResolvedSide,
    pub reason: String,
}

/// Decide which side wins a conflict. Exactly one transfer results.
pub fn resolve(strategy: ConflictStrategy, conflict: &ConflictPair) -> Resolution {
    match strategy {
        ConflictStrategy::Local => Resolution {
            side: ResolvedSide::Local,
            reason: "strategy forces local side".to_string(),
        },
        ConflictStrategy::Remote => Resolution {
            side: ResolvedSide::Remote,
            reason: "strategy forces remote side".to_string(),
        },
        ConflictStrategy::Newer => {
            // Ties resolve to local; see ConflictStrategy::Newer docs.
            if conflict.local.modified_ms >= conflict.remote.modified_ms {
                Resolution {
                    side: ResolvedSide::Local,
                    reason: if conflict.local.modified_ms == conflict.remote.modified_ms {
                        "timestamps equal, tie resolves to local".to_string()
                    } else {
                        "local side newer".to_string()
                    },
                }
            } else {
                Resolution {
                    side: ResolvedSide::Remote,
                    reason: "remote side newer".to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FileEntry;

    fn conflict(local_ms: i64, remote_ms: i64) -> ConflictPair {
        ConflictPair {
            local: FileEntry::local("notes.txt", 10, local_ms),
            remote: FileEntry::remote("notes.txt", 12, remote_ms, "r1"),
        }
    }

    #[test]
    fn test_local_strategy_always_uploads() {
        let resolution = resolve(ConflictStrategy::Local, &conflict(1_000, 9_000));
        assert_eq!(resolution.side, ResolvedSide::Local);
    }

    #[test]
    fn test_remote_strategy_always_downloads() {
        let resolution = resolve(ConflictStrategy::Remote, &conflict(9_000, 1_000));
        assert_eq!(resolution.side, ResolvedSide::Remote);
    }

    #[test]
    fn test_newer_picks_later_side() {
        let resolution = resolve(ConflictStrategy::Newer, &conflict(9_000, 1_000));
        assert_eq!(resolution.side, ResolvedSide::Local);
        assert!(resolution.reason.contains("local side newer"));

        let resolution = resolve(ConflictStrategy::Newer, &conflict(1_000, 9_000));
        assert_eq!(resolution.side, ResolvedSide::Remote);
        assert!(resolution.reason.contains("remote side newer"));
    }

    #[test]
    fn test_newer_tie_resolves_to_local() {
        let resolution = resolve(ConflictStrategy::Newer, &conflict(5_000, 5_000));
        assert_eq!(resolution.side, ResolvedSide::Local);
        assert!(resolution.reason.contains("tie"));
    }
}
