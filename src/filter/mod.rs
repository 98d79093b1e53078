//! Exclusion filter - restricted wildcard path predicate
//!
//! Intentionally a small subset of glob syntax:
//!
//! - leading `*` — suffix match (`*.tmp` matches `build/scratch.tmp`)
//! - trailing `*` — prefix match (`cache/*` matches `cache/a/b`)
//! - `*` anywhere else — prefix/suffix pair (`logs/*.txt`)
//! - no wildcard — exact path equality, or the pattern names a complete
//!   path segment anywhere (`node_modules` matches `a/node_modules/b.js`)
//!
//! Multiple wildcards and character classes are unsupported; only the first
//! `*` is significant.

/// Does `pattern` match the relative posix `path`?
pub fn matches(path: &str, pattern: &str) -> bool {
    if pattern.is_empty() {
        return false;
    }

    match pattern.find('*') {
        None => path == pattern || has_segment(path, pattern),
        Some(0) => path.ends_with(&pattern[1..]),
        Some(idx) if idx == pattern.len() - 1 => path.starts_with(&pattern[..idx]),
        Some(idx) => path.starts_with(&pattern[..idx]) && path.ends_with(&pattern[idx + 1..]),
    }
}

/// Is `path` excluded by any of `patterns`?
pub fn is_excluded(path: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|pattern| matches(path, pattern))
}

fn has_segment(path: &str, segment: &str) -> bool {
    path.split('/').any(|part| part == segment)
}
