//! Exit codes following sysexits.h conventions.
//!
//! Scripts can tell a refused upload apart from a missing input or a
//! failed copy without parsing the output.

use std::fmt;

/// Successful execution, every file accepted.
pub const SUCCESS: i32 = 0;

/// General error (catch-all).
pub const GENERAL_ERROR: i32 = 1;

/// Command line usage error (invalid arguments).
/// Maps to EX_USAGE from sysexits.h.
pub const USAGE_ERROR: i32 = 64;

/// At least one file was rejected, or the batch exceeded the zone capacity.
/// Maps to EX_DATAERR from sysexits.h.
pub const REJECTED: i32 = 65;

/// Cannot open input file.
/// Maps to EX_NOINPUT from sysexits.h.
pub const INPUT_ERROR: i32 = 66;

/// I/O error (cannot write output file).
/// Maps to EX_IOERR from sysexits.h.
pub const IO_ERROR: i32 = 74;

/// Returned by commands when the pipeline refused files.
#[derive(Debug)]
pub struct Rejected {
    pub rejected: usize,
    pub capacity_exceeded: bool,
}

impl fmt::Display for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.capacity_exceeded {
            write!(f, "upload refused: too many files")
        } else {
            write!(f, "upload rejected: {} file(s) refused", self.rejected)
        }
    }
}

impl std::error::Error for Rejected {}

/// Represents an exit code with optional error context.
pub struct ExitCode {
    pub code: i32,
    pub message: Option<String>,
}

impl ExitCode {
    pub const fn success() -> Self {
        Self {
            code: SUCCESS,
            message: None,
        }
    }

    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");

        let code = if err.downcast_ref::<Rejected>().is_some() {
            REJECTED
        } else if message.contains("Failed to read") {
            INPUT_ERROR
        } else if message.contains("Failed to write") || message.contains("Failed to create") {
            IO_ERROR
        } else {
            GENERAL_ERROR
        };

        Self {
            code,
            message: Some(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Context;

    use super::*;

    #[test]
    fn test_rejection_maps_to_dataerr() {
        let err = anyhow::Error::new(Rejected {
            rejected: 2,
            capacity_exceeded: false,
        });
        let exit = ExitCode::from_anyhow(&err);
        assert_eq!(exit.code, REJECTED);
        assert_eq!(exit.message.as_deref(), Some("upload rejected: 2 file(s) refused"));
    }

    #[test]
    fn test_io_failures_classified_by_context() {
        let missing: anyhow::Result<()> = Err(std::io::Error::from(std::io::ErrorKind::NotFound))
            .context("Failed to read file: missing.pdf");
        assert_eq!(ExitCode::from_anyhow(&missing.unwrap_err()).code, INPUT_ERROR);

        let denied: anyhow::Result<()> =
            Err(std::io::Error::from(std::io::ErrorKind::PermissionDenied))
                .context("Failed to write out/document.pdf");
        assert_eq!(ExitCode::from_anyhow(&denied.unwrap_err()).code, IO_ERROR);

        assert_eq!(
            ExitCode::from_anyhow(&anyhow::anyhow!("something else")).code,
            GENERAL_ERROR
        );
    }
}
