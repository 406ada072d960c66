//! Common utility functions shared across CLI commands.

use std::path::Path;

use sha3::{Digest, Sha3_256};

/// Declared type for a file: the override, or the type a browser would
/// report for its extension (empty when unknown).
pub fn declared_type_for(path: &Path, explicit: Option<&str>) -> String {
    match explicit {
        Some(mime) => mime.to_string(),
        None => mime_guess::from_path(path)
            .first_raw()
            .unwrap_or_default()
            .to_string(),
    }
}

/// Hex-encoded SHA3-256 digest.
pub fn sha3_hex(bytes: &[u8]) -> String {
    hex::encode(Sha3_256::digest(bytes))
}

/// Human-readable size (B, KiB, MiB).
pub fn format_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * KIB;
    if bytes >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{bytes} B")
    }
}
