//! Docguard Core - upload security pipeline for document and photo uploads
//!
//! Every file a visitor attaches (identity papers, proof of address, mandates,
//! vehicle photos) runs through the same stages before it is handed back to
//! the caller under a canonical name.
//!
//! # Stages
//!
//! - Suspicious-activity heuristic on the filename and size
//! - Metadata classification (type, extension, size, filename)
//! - Magic-number verification of the leading bytes
//! - Canonical renaming (`piece-identite_2024-01-15T12-30-45-123Z.pdf`)
//!
//! # Example
//!
//! ```no_run
//! use docguard_core::{CandidateFile, UploadGuard, UploadPolicy};
//!
//! # async fn example() {
//! let guard = UploadGuard::new(UploadPolicy::default().with_max_files(3));
//!
//! let mut bytes = b"%PDF-1.7".to_vec();
//! bytes.resize(2048, b' ');
//! let file = CandidateFile::from_bytes("facture-edf.pdf", "application/pdf", bytes);
//!
//! let outcome = guard.process(vec![file], 0).await;
//! for accepted in &outcome.accepted {
//!     println!("{} -> {}", accepted.original_name, accepted.name);
//! }
//! for message in outcome.messages() {
//!     eprintln!("{message}");
//! }
//! # }
//! ```

pub mod classifier;
pub mod clock;
pub mod equipment;
pub mod error;
pub mod events;
pub mod file;
pub mod guard;
pub mod heuristic;
pub mod policy;
pub mod renamer;
pub mod signature;

// Re-export main types for convenience
pub use classifier::classify;
pub use clock::{Clock, FixedClock, SystemClock};
pub use equipment::{parse_equipment, translate_term, Category, EquipmentList};
pub use error::{GuardError, Rejection, Result};
pub use events::{
    EventCounts, EventKind, EventLog, EventSink, FanoutSink, MemorySink, Severity, TracingSink,
    UploadEvent, DEFAULT_EVENT_CAPACITY,
};
pub use file::{AcceptedFile, CandidateFile, FileContent, FileMeta, MemoryContent};
pub use guard::{
    check_in_memory, check_prefix, screen, BatchOutcome, FileOutcome, RejectedFile, UploadError,
    UploadGuard,
};
pub use heuristic::detect_suspicious;
pub use policy::{UploadPolicy, DEFAULT_MAX_FILES, DEFAULT_MAX_SIZE_MIB};
pub use renamer::{canonical_name, rename, resolve_base_name, suffixed_name, unique_name};
pub use signature::{matches_signature, verify_signature};

#[cfg(feature = "fs")]
pub use file::FsContent;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn pdf(name: &str) -> CandidateFile {
        let mut bytes = b"%PDF-1.7\n".to_vec();
        bytes.resize(1000, b' ');
        CandidateFile::from_bytes(name, "application/pdf", bytes)
    }

    /// Integration test: a realistic registration-document batch.
    #[tokio::test]
    async fn test_registration_batch_workflow() {
        let sink = Arc::new(MemorySink::default());
        let guard = UploadGuard::with_parts(
            UploadPolicy::default()
                .with_max_files(3)
                .with_accepted_patterns(["image/*", "application/pdf"]),
            Arc::new(FixedClock::from_millis(1_705_321_845_123)),
            sink.clone(),
        );

        let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0];
        jpeg.resize(4096, 0);
        let photo = CandidateFile::from_bytes("carte-grise.jpg", "image/jpeg", jpeg);
        let forged = CandidateFile::from_bytes("justif.pdf", "application/pdf", vec![0x4D; 500]);

        let outcome = guard
            .process(vec![photo, forged, pdf("facture.pdf")], 0)
            .await;

        let names: Vec<_> = outcome.accepted.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "image_2024-01-15T12-30-45-123Z.jpg",
                "document_2024-01-15T12-30-45-123Z.pdf"
            ]
        );
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].reason.code(), "SIGNATURE_MISMATCH");

        // Second batch against the now-partly-full zone overflows
        let second = guard
            .process(vec![pdf("a.pdf"), pdf("b.pdf")], outcome.accepted.len())
            .await;
        assert!(second.capacity_exceeded());
        assert_eq!(second.messages().len(), 1);

        assert_eq!(sink.counts().success, 2);
    }
}
