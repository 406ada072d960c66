//! Magic-number verification of file content.
//!
//! Defeats files relabelled with an allowed type/extension pair: the leading
//! bytes must match the signature of the declared type.

use crate::error::Result;
use crate::file::CandidateFile;

/// Number of leading bytes read from each file.
pub const SIGNATURE_READ_LEN: usize = 10;

/// Expected leading bytes per declared MIME type.
pub const MAGIC_NUMBERS: &[(&str, &[u8])] = &[
    ("image/jpeg", &[0xFF, 0xD8, 0xFF]),
    ("image/png", &[0x89, 0x50, 0x4E, 0x47]),
    ("image/gif", &[0x47, 0x49, 0x46]),
    ("image/webp", &[0x52, 0x49, 0x46, 0x46]),
    ("application/pdf", &[0x25, 0x50, 0x44, 0x46]),
];

/// Expected signature for a declared type, if the table has one.
pub fn expected_signature(declared_type: &str) -> Option<&'static [u8]> {
    MAGIC_NUMBERS
        .iter()
        .find(|(mime, _)| *mime == declared_type)
        .map(|(_, magic)| *magic)
}

/// Compare leading bytes against the declared type's signature.
///
/// Unknown types and content shorter than the signature fail closed.
pub fn matches_signature(declared_type: &str, prefix: &[u8]) -> bool {
    match expected_signature(declared_type) {
        Some(magic) => prefix.starts_with(magic),
        None => false,
    }
}

/// Read the first bytes of `file` and check them against its declared type.
///
/// Returns `Err` only when the content cannot be read.
pub async fn verify_signature(file: &CandidateFile) -> Result<bool> {
    let prefix = file.content.read_prefix(SIGNATURE_READ_LEN).await?;
    let matched = matches_signature(&file.meta.declared_type, &prefix);

    tracing::debug!(
        file = %file.meta.name,
        declared_type = %file.meta.declared_type,
        prefix = %hex::encode(&prefix),
        matched,
        "Checked content signature"
    );

    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_allowed_type_has_a_signature() {
        for mime in crate::policy::ALLOWED_MIME_TYPES {
            assert!(expected_signature(mime).is_some(), "{mime} has no magic number");
        }
    }

    #[test]
    fn test_matches_known_headers() {
        assert!(matches_signature("image/jpeg", &[0xFF, 0xD8, 0xFF, 0xE0, 0x00]));
        assert!(matches_signature(
            "image/png",
            &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]
        ));
        assert!(matches_signature("image/gif", b"GIF89a"));
        assert!(matches_signature("image/webp", b"RIFF\x24\x00\x00\x00WEBP"));
        assert!(matches_signature("application/pdf", b"%PDF-1.7"));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert_eq!(expected_signature("IMAGE/PNG"), None);
        assert!(!matches_signature("IMAGE/PNG", &[0x89, 0x50, 0x4E, 0x47]));
    }

    #[test]
    fn test_mismatch_and_fail_closed() {
        assert!(!matches_signature("image/png", &[0x00, 0x00, 0x00, 0x00]));
        assert!(!matches_signature("application/pdf", b"MZ\x90\x00"));
        assert!(!matches_signature("text/plain", b"hello"));
        assert!(!matches_signature("image/jpeg", &[0xFF, 0xD8]));
        assert!(!matches_signature("image/jpeg", &[]));
    }

    #[tokio::test]
    async fn test_verify_signature_reads_content() {
        let mut png = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        png.resize(1000, 0);
        let file = CandidateFile::from_bytes("photo.png", "image/png", png);
        assert!(verify_signature(&file).await.unwrap());

        let forged = CandidateFile::from_bytes("photo.png", "image/png", vec![0u8; 1000]);
        assert!(!verify_signature(&forged).await.unwrap());
    }
}
