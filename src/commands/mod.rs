//! Command layer - rendering and exit codes
//!
//! The engine computes; this layer prints. Formatting is kept in pure
//! `format_*` helpers so the output shape is testable without a terminal.

pub mod status;
pub mod sync;

use crate::types::SyncReport;

/// Exit code contract: 0 for a clean pass, 1 when per-file actions failed.
/// Fatal errors (scan or state failures) never reach this point; main maps
/// them to 2.
pub fn exit_code(report: &SyncReport) -> i32 {
    if report.is_success() {
        0
    } else {
        1
    }
}
