//! Static allow/deny lists and the caller-supplied upload policy.

/// Declared MIME types the pipeline accepts.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/pdf",
];

/// Lowercase extensions (with leading dot) the pipeline accepts.
pub const ALLOWED_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp", ".pdf"];

/// Lowercase extensions (with leading dot) that are always refused.
pub const DANGEROUS_EXTENSIONS: &[&str] = &[
    ".exe", ".bat", ".cmd", ".scr", ".pif", ".com", ".vbs", ".js", ".jar", ".php", ".asp", ".jsp",
    ".sh", ".ps1", ".py", ".rb", ".pl",
];

/// Characters that may not appear in a filename.
pub const ILLEGAL_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*'];

/// Smallest file accepted, in bytes.
pub const MIN_FILE_SIZE: u64 = 100;

/// Longest filename accepted, in characters.
pub const MAX_FILENAME_LENGTH: usize = 255;

/// Above this size the heuristic emits a warning (50 MiB).
pub const SUSPICIOUS_SIZE_CEILING: u64 = 50 * 1024 * 1024;

/// Default per-file ceiling in MiB.
pub const DEFAULT_MAX_SIZE_MIB: u64 = 10;

/// Default number of files a single upload zone may hold.
pub const DEFAULT_MAX_FILES: usize = 5;

const MIB: u64 = 1024 * 1024;

/// Caller configuration for one upload zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    /// Maximum number of accepted files the zone may hold
    pub max_files: usize,
    /// Per-file size ceiling in bytes (inclusive)
    pub max_size_bytes: u64,
    /// Optional narrowing of the allowed types, e.g. `image/*` or `application/pdf`.
    /// Empty means every allowed type is welcome.
    pub accepted_mime_patterns: Vec<String>,
    /// Base name forced onto every accepted file
    pub custom_base_name: Option<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_files: DEFAULT_MAX_FILES,
            max_size_bytes: DEFAULT_MAX_SIZE_MIB * MIB,
            accepted_mime_patterns: Vec::new(),
            custom_base_name: None,
        }
    }
}

impl UploadPolicy {
    pub fn with_max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files;
        self
    }

    /// Set the per-file ceiling in MiB.
    pub fn with_max_size_mib(mut self, mib: u64) -> Self {
        self.max_size_bytes = mib.saturating_mul(MIB);
        self
    }

    pub fn with_max_size_bytes(mut self, bytes: u64) -> Self {
        self.max_size_bytes = bytes;
        self
    }

    pub fn with_accepted_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepted_mime_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Set the custom base name. Blank names are ignored.
    pub fn with_custom_base_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.custom_base_name = if name.trim().is_empty() {
            None
        } else {
            Some(name)
        };
        self
    }

    /// Whether `declared_type` satisfies the accepted patterns.
    ///
    /// Patterns are either exact types or `type/*` wildcards, compared case-insensitively.
    pub fn accepts_mime(&self, declared_type: &str) -> bool {
        if self.accepted_mime_patterns.is_empty() {
            return true;
        }

        let declared = declared_type.to_lowercase();
        self.accepted_mime_patterns.iter().any(|pattern| {
            let pattern = pattern.trim().to_lowercase();
            match pattern.strip_suffix("/*") {
                Some(prefix) => declared
                    .split_once('/')
                    .is_some_and(|(top, _)| top == prefix),
                None => declared == pattern,
            }
        })
    }
}
