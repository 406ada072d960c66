use thiserror::Error;

/// Why a file (or a whole batch) was refused.
///
/// Exactly one reason is reported per rejected file: the first failing check.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("File type '{declared_type}' is not allowed")]
    UnsupportedType { declared_type: String },

    #[error("File extension '{extension}' is not allowed")]
    UnsupportedExtension { extension: String },

    #[error("File extension '{extension}' is blocked for security reasons")]
    DangerousExtension { extension: String },

    #[error("File too large: {size} bytes exceeds maximum of {max} bytes")]
    TooLarge { size: u64, max: u64 },

    #[error("File too small: {size} bytes is below minimum of {min} bytes")]
    TooSmall { size: u64, min: u64 },

    #[error("Filename too long: {length} characters exceeds maximum of {max}")]
    FilenameTooLong { length: usize, max: usize },

    #[error("Filename contains forbidden characters (< > : \" | ? *)")]
    IllegalFilenameCharacters,

    #[error("File content does not match declared type '{declared_type}'")]
    SignatureMismatch { declared_type: String },

    #[error("Suspicious file name detected")]
    SuspiciousPattern,

    #[error("Too many files: {requested} would exceed the limit of {max}")]
    CapacityExceeded { requested: usize, max: usize },

    #[error("File could not be read: {0}")]
    Unreadable(String),
}

impl Rejection {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedType { .. } => "UNSUPPORTED_TYPE",
            Self::UnsupportedExtension { .. } => "UNSUPPORTED_EXTENSION",
            Self::DangerousExtension { .. } => "DANGEROUS_EXTENSION",
            Self::TooLarge { .. } => "TOO_LARGE",
            Self::TooSmall { .. } => "TOO_SMALL",
            Self::FilenameTooLong { .. } => "FILENAME_TOO_LONG",
            Self::IllegalFilenameCharacters => "ILLEGAL_FILENAME_CHARACTERS",
            Self::SignatureMismatch { .. } => "SIGNATURE_MISMATCH",
            Self::SuspiciousPattern => "SUSPICIOUS_PATTERN",
            Self::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
            Self::Unreadable(_) => "UNREADABLE",
        }
    }

    /// Whether this rejection points at a likely attack rather than a user mistake.
    pub fn is_security_relevant(&self) -> bool {
        matches!(
            self,
            Self::DangerousExtension { .. }
                | Self::SignatureMismatch { .. }
                | Self::SuspiciousPattern
                | Self::Unreadable(_)
        )
    }
}

/// Errors raised while reading file content.
#[derive(Error, Debug)]
pub enum GuardError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Content read error: {0}")]
    Read(String),
}

pub type Result<T> = std::result::Result<T, GuardError>;
