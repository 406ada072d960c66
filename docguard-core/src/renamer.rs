//! Canonical renaming of accepted files.
//!
//! Names take the form `{base}_{timestamp}.{extension}`, where the timestamp
//! is the UTC instant in ISO 8601 with `:` and `.` turned into `-`
//! (`2024-01-15T12-30-45-123Z`).

use chrono::{DateTime, SecondsFormat, Utc};

use crate::clock::Clock;
use crate::file::{raw_extension, AcceptedFile, CandidateFile};

/// Filename keywords and the base name they map to, checked in order.
const KEYWORD_BASE_NAMES: &[(&[&str], &str)] = &[
    (&["carte", "identite"], "piece-identite"),
    (&["facture", "edf"], "justificatif-domicile"),
    (&["mandat"], "mandat"),
];

const IMAGE_BASE_NAME: &str = "image";
const DOCUMENT_BASE_NAME: &str = "document";

/// Pick the base name for a file.
///
/// A non-blank custom name always wins; then images, then PDFs, then keyword
/// sniffing on the original filename, then `document`.
pub fn resolve_base_name(declared_type: &str, file_name: &str, custom: Option<&str>) -> String {
    if let Some(custom) = custom.map(str::trim).filter(|c| !c.is_empty()) {
        return custom.to_string();
    }

    let declared = declared_type.to_lowercase();
    if declared.starts_with("image/") {
        return IMAGE_BASE_NAME.to_string();
    }
    if declared == "application/pdf" {
        return DOCUMENT_BASE_NAME.to_string();
    }

    let lowered = file_name.to_lowercase();
    KEYWORD_BASE_NAMES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(_, base)| base.to_string())
        .unwrap_or_else(|| DOCUMENT_BASE_NAME.to_string())
}

/// Format an instant as a filename-safe timestamp.
pub fn filename_timestamp(instant: DateTime<Utc>) -> String {
    instant
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-")
}

/// Build the canonical name for a file without producing the accepted file.
pub fn canonical_name(
    declared_type: &str,
    file_name: &str,
    custom: Option<&str>,
    instant: DateTime<Utc>,
) -> String {
    format!(
        "{}_{}.{}",
        resolve_base_name(declared_type, file_name, custom),
        filename_timestamp(instant),
        raw_extension(file_name)
    )
}

/// Produce the accepted file: same content, canonical name. Never fails.
pub fn rename(file: &CandidateFile, custom: Option<&str>, clock: &dyn Clock) -> AcceptedFile {
    let name = canonical_name(&file.meta.declared_type, &file.meta.name, custom, clock.now());

    AcceptedFile {
        name,
        original_name: file.meta.name.clone(),
        declared_type: file.meta.declared_type.clone(),
        size: file.meta.size,
        last_modified: file.meta.last_modified,
        content: file.content.clone(),
    }
}

/// `name` with `-{n}` inserted before its extension.
///
/// `document_2024-01-15T12-30-45-123Z.pdf` becomes `document_2024-01-15T12-30-45-123Z-2.pdf` for `n = 2`.
pub fn suffixed_name(name: &str, n: usize) -> String {
    match name.rsplit_once('.') {
        Some((stem, extension)) => format!("{}-{}.{}", stem, n, extension),
        None => format!("{}-{}", name, n),
    }
}

/// `name` itself if free, else the first free [`suffixed_name`] counting from 1.
///
/// Two files of the same kind renamed within one millisecond share a
/// canonical name; stores call this before keeping a file.
pub fn unique_name(name: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(name) {
        return name.to_string();
    }
    let mut n = 1;
    loop {
        let candidate = suffixed_name(name, n);
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::clock::FixedClock;

    // 2024-01-15T12:30:45.123Z
    const INSTANT_MS: i64 = 1_705_321_845_123;

    #[test]
    fn test_timestamp_format() {
        let clock = FixedClock::from_millis(INSTANT_MS);
        assert_eq!(filename_timestamp(clock.now()), "2024-01-15T12-30-45-123Z");

        let whole_second = FixedClock::from_millis(1_705_321_845_000);
        assert_eq!(filename_timestamp(whole_second.now()), "2024-01-15T12-30-45-000Z");
    }

    #[test]
    fn test_unique_name_suffixes_before_extension() {
        let taken = ["image_2024-01-15T12-30-45-123Z.jpg", "image_2024-01-15T12-30-45-123Z-1.jpg"];
        let is_taken = |name: &str| taken.contains(&name);

        assert_eq!(unique_name("mandat_x.pdf", is_taken), "mandat_x.pdf");
        assert_eq!(
            unique_name("image_2024-01-15T12-30-45-123Z.jpg", is_taken),
            "image_2024-01-15T12-30-45-123Z-2.jpg"
        );
        assert_eq!(suffixed_name("noext", 3), "noext-3");
    }

    #[test]
    fn test_base_name_by_type() {
        assert_eq!(resolve_base_name("image/png", "carte.png", None), "image");
        assert_eq!(resolve_base_name("application/pdf", "facture.pdf", None), "document");
    }

    #[test]
    fn test_keyword_sniffing() {
        assert_eq!(
            resolve_base_name("application/octet-stream", "Carte_Grise.bin", None),
            "piece-identite"
        );
        assert_eq!(
            resolve_base_name("text/plain", "identite-recto.txt", None),
            "piece-identite"
        );
        assert_eq!(
            resolve_base_name("text/plain", "FACTURE-2024.txt", None),
            "justificatif-domicile"
        );
        assert_eq!(resolve_base_name("text/plain", "edf_mars.txt", None), "justificatif-domicile");
        assert_eq!(resolve_base_name("text/plain", "mandat-signe.txt", None), "mandat");
        assert_eq!(resolve_base_name("text/plain", "notes.txt", None), "document");
    }

    #[test]
    fn test_custom_name_always_wins() {
        assert_eq!(
            resolve_base_name("application/pdf", "facture.pdf", Some("mandat")),
            "mandat"
        );
        assert_eq!(
            resolve_base_name("text/plain", "facture.txt", Some("mandat")),
            "mandat"
        );
        assert_eq!(resolve_base_name("image/png", "a.png", Some("   ")), "image");
    }

    #[test]
    fn test_rename_keeps_content_and_extension_case() {
        let clock = FixedClock::from_millis(INSTANT_MS);
        let mut bytes = b"%PDF-1.4".to_vec();
        bytes.resize(500, b' ');
        let file = CandidateFile::from_bytes("Facture.PDF", "application/pdf", bytes);

        let accepted = rename(&file, Some("mandat"), &clock);
        assert_eq!(accepted.name, "mandat_2024-01-15T12-30-45-123Z.PDF");
        assert_eq!(accepted.original_name, "Facture.PDF");
        assert_eq!(accepted.size, 500);
        assert!(Arc::ptr_eq(&accepted.content, &file.content));
    }

    #[test]
    fn test_rename_is_deterministic_with_fixed_clock() {
        let clock = FixedClock::from_millis(INSTANT_MS);
        let file = CandidateFile::from_bytes("photo.jpg", "image/jpeg", vec![0u8; 200]);
        assert_eq!(rename(&file, None, &clock).name, rename(&file, None, &clock).name);
        assert_eq!(rename(&file, None, &clock).name, "image_2024-01-15T12-30-45-123Z.jpg");
    }
}
