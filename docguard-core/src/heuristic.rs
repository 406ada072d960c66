//! Suspicious-activity heuristic.
//!
//! A risky filename is a blocking finding; an abnormal size is only reported.

use std::sync::LazyLock;

use regex::RegexSet;

use crate::events::{EventKind, EventLog, Severity};
use crate::policy::{MIN_FILE_SIZE, SUSPICIOUS_SIZE_CEILING};

/// Filename patterns that indicate an executable or script payload.
pub const SUSPICIOUS_PATTERNS: &[&str] = &[
    r"(?i)\.exe$",
    r"(?i)\.bat$",
    r"(?i)\.cmd$",
    r"(?i)\.scr$",
    r"(?i)\.pif$",
    r"(?i)\.vbs$",
    r"(?i)\.js$",
    r"(?i)\.jar$",
    r"(?i)\.php$",
    r"(?i)\.asp$",
    r"(?i)\.jsp$",
    r"(?i)\.sh$",
    r"(?i)\.ps1$",
    r"(?i)\.py$",
    r"(?i)\.rb$",
    r"(?i)\.pl$",
];

static SUSPICIOUS_SET: LazyLock<RegexSet> =
    LazyLock::new(|| RegexSet::new(SUSPICIOUS_PATTERNS).expect("suspicious patterns are valid"));

/// Index of the first pattern matching `file_name`, if any.
pub fn matching_pattern(file_name: &str) -> Option<&'static str> {
    SUSPICIOUS_SET
        .matches(file_name)
        .iter()
        .next()
        .map(|idx| SUSPICIOUS_PATTERNS[idx])
}

/// Inspect a file's name and size.
///
/// Returns `true` when the name matches a risky pattern; the caller should
/// reject the file. Size anomalies are reported as warnings but never cause
/// rejection here.
pub fn detect_suspicious(file_name: &str, size: u64, declared_type: &str, events: &EventLog) -> bool {
    if size < MIN_FILE_SIZE || size > SUSPICIOUS_SIZE_CEILING {
        events.emit(
            EventKind::Warning,
            Severity::Medium,
            format!("Abnormal file size for {file_name}: {size} bytes"),
            Some(serde_json::json!({
                "file": file_name,
                "size": size,
                "type": declared_type,
            })),
        );
    }

    match matching_pattern(file_name) {
        Some(pattern) => {
            events.emit(
                EventKind::Error,
                Severity::High,
                format!("Suspicious file name detected: {file_name}"),
                Some(serde_json::json!({
                    "file": file_name,
                    "pattern": pattern,
                    "size": size,
                    "type": declared_type,
                })),
            );
            true
        }
        None => false,
    }
}
