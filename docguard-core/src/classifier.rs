//! Metadata classification: type, extension, size and filename checks.

use crate::error::Rejection;
use crate::file::FileMeta;
use crate::policy::{
    UploadPolicy, ALLOWED_EXTENSIONS, ALLOWED_MIME_TYPES, DANGEROUS_EXTENSIONS,
    ILLEGAL_FILENAME_CHARS, MAX_FILENAME_LENGTH, MIN_FILE_SIZE,
};

/// Run the metadata checks in order, stopping at the first failure.
///
/// Pure function of the metadata and policy; never touches content.
pub fn classify(meta: &FileMeta, policy: &UploadPolicy) -> Result<(), Rejection> {
    // Exact membership: browsers and mime_guess report lowercase types
    let declared = meta.declared_type.as_str();
    if !ALLOWED_MIME_TYPES.contains(&declared) || !policy.accepts_mime(declared) {
        return Err(Rejection::UnsupportedType {
            declared_type: meta.declared_type.clone(),
        });
    }

    let extension = meta.extension();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(Rejection::UnsupportedExtension { extension });
    }

    // Disjoint from the allow-list today; kept so widening the allow-list cannot admit these.
    if DANGEROUS_EXTENSIONS.contains(&extension.as_str()) {
        return Err(Rejection::DangerousExtension { extension });
    }

    if meta.size > policy.max_size_bytes {
        return Err(Rejection::TooLarge {
            size: meta.size,
            max: policy.max_size_bytes,
        });
    }

    if meta.size < MIN_FILE_SIZE {
        return Err(Rejection::TooSmall {
            size: meta.size,
            min: MIN_FILE_SIZE,
        });
    }

    let length = meta.name.chars().count();
    if length > MAX_FILENAME_LENGTH {
        return Err(Rejection::FilenameTooLong {
            length,
            max: MAX_FILENAME_LENGTH,
        });
    }

    if meta.name.contains(ILLEGAL_FILENAME_CHARS) {
        return Err(Rejection::IllegalFilenameCharacters);
    }

    Ok(())
}
