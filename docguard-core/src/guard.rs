//! Upload orchestrator.
//!
//! Runs every stage per file and aggregates the batch result:
//! heuristic, classifier, content signature, rename.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::classifier::classify;
use crate::clock::{Clock, SystemClock};
use crate::error::Rejection;
use crate::events::{EventKind, EventLog, EventSink, Severity, TracingSink};
use crate::file::{AcceptedFile, CandidateFile, FileMeta};
use crate::heuristic::detect_suspicious;
use crate::policy::UploadPolicy;
use crate::renamer::{rename, unique_name};
use crate::signature::{matches_signature, verify_signature, SIGNATURE_READ_LEN};

/// Metadata stages in pipeline order: suspicious-name heuristic, then classifier.
pub fn screen(meta: &FileMeta, policy: &UploadPolicy, events: &EventLog) -> Result<(), Rejection> {
    if detect_suspicious(&meta.name, meta.size, &meta.declared_type, events) {
        return Err(Rejection::SuspiciousPattern);
    }
    classify(meta, policy)
}

fn signature_mismatch(meta: &FileMeta) -> Rejection {
    Rejection::SignatureMismatch {
        declared_type: meta.declared_type.clone(),
    }
}

/// Content stage on leading bytes that are already in memory.
pub fn check_prefix(meta: &FileMeta, prefix: &[u8]) -> Result<(), Rejection> {
    let prefix = &prefix[..prefix.len().min(SIGNATURE_READ_LEN)];
    if matches_signature(&meta.declared_type, prefix) {
        Ok(())
    } else {
        Err(signature_mismatch(meta))
    }
}

/// Every check stage for a file whose bytes are in memory, without renaming.
///
/// Same order and verdicts as [`UploadGuard::check_file`].
pub fn check_in_memory(
    meta: &FileMeta,
    bytes: &[u8],
    policy: &UploadPolicy,
    events: &EventLog,
) -> Result<(), Rejection> {
    screen(meta, policy, events)?;
    check_prefix(meta, bytes)
}

/// A file refused by one of the stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedFile {
    pub file_name: String,
    pub reason: Rejection,
}

/// Outcome of running the pipeline on one file.
#[derive(Debug)]
pub enum FileOutcome {
    Accepted(AcceptedFile),
    Rejected(RejectedFile),
}

impl FileOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// One entry of the batch error list.
///
/// `file_name` is `None` for batch-level errors (capacity).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadError {
    pub file_name: Option<String>,
    pub reason: Rejection,
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file_name {
            Some(name) => write!(f, "{}: {}", name, self.reason),
            None => write!(f, "{}", self.reason),
        }
    }
}

impl Serialize for UploadError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("UploadError", 3)?;
        state.serialize_field("file_name", &self.file_name)?;
        state.serialize_field("code", self.reason.code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

impl From<RejectedFile> for UploadError {
    fn from(rejected: RejectedFile) -> Self {
        Self {
            file_name: Some(rejected.file_name),
            reason: rejected.reason,
        }
    }
}

/// Result of one orchestrator invocation. Both lists may be non-empty.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Accepted files in input order
    pub accepted: Vec<AcceptedFile>,
    pub errors: Vec<UploadError>,
}

impl BatchOutcome {
    /// Human-readable error messages.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// Whether the whole batch was refused for capacity.
    pub fn capacity_exceeded(&self) -> bool {
        self.errors
            .iter()
            .any(|e| matches!(e.reason, Rejection::CapacityExceeded { .. }))
    }
}

/// The upload pipeline for one policy.
///
/// Holds no per-zone state: the caller owns the running list of accepted
/// files and passes its length to [`UploadGuard::process`].
#[derive(Clone)]
pub struct UploadGuard {
    policy: UploadPolicy,
    clock: Arc<dyn Clock>,
    events: EventLog,
}

impl UploadGuard {
    /// Pipeline with the system clock, logging events through `tracing`.
    pub fn new(policy: UploadPolicy) -> Self {
        Self::with_parts(policy, Arc::new(SystemClock), Arc::new(TracingSink))
    }

    pub fn with_parts(
        policy: UploadPolicy,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let events = EventLog::new(sink, clock.clone());
        Self {
            policy,
            clock,
            events,
        }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Run every stage on one file.
    pub async fn check_file(&self, file: &CandidateFile) -> FileOutcome {
        self.check_file_avoiding(file, &HashSet::new()).await
    }

    /// Run every stage, picking a canonical name outside `taken`.
    async fn check_file_avoiding(&self, file: &CandidateFile, taken: &HashSet<String>) -> FileOutcome {
        let meta = &file.meta;

        if let Err(reason) = screen(meta, &self.policy, &self.events) {
            return self.reject(file, reason);
        }

        match verify_signature(file).await {
            Ok(true) => {}
            Ok(false) => return self.reject(file, signature_mismatch(meta)),
            Err(e) => return self.reject(file, Rejection::Unreadable(e.to_string())),
        }

        self.events.emit(
            EventKind::Validation,
            Severity::Low,
            format!("Validation passed: {}", meta.name),
            None,
        );

        let mut accepted = rename(
            file,
            self.policy.custom_base_name.as_deref(),
            self.clock.as_ref(),
        );
        accepted.name = unique_name(&accepted.name, |name| taken.contains(name));

        self.events.emit(
            EventKind::Success,
            Severity::Low,
            format!("File accepted: {} -> {}", meta.name, accepted.name),
            Some(serde_json::json!({
                "original_name": meta.name,
                "name": accepted.name,
                "size": accepted.size,
            })),
        );

        FileOutcome::Accepted(accepted)
    }

    /// Process a batch against a zone already holding `existing_count` files.
    ///
    /// An overflowing batch is refused whole with a single capacity error.
    /// Otherwise every file is processed in order and a bad file never stops
    /// its siblings.
    pub async fn process(&self, candidates: Vec<CandidateFile>, existing_count: usize) -> BatchOutcome {
        let requested = existing_count.saturating_add(candidates.len());
        if requested > self.policy.max_files {
            let reason = Rejection::CapacityExceeded {
                requested,
                max: self.policy.max_files,
            };
            self.events.emit(
                EventKind::Validation,
                Severity::Medium,
                reason.to_string(),
                Some(serde_json::json!({
                    "existing": existing_count,
                    "submitted": candidates.len(),
                    "max_files": self.policy.max_files,
                })),
            );
            return BatchOutcome {
                accepted: Vec::new(),
                errors: vec![UploadError {
                    file_name: None,
                    reason,
                }],
            };
        }

        self.events.emit(
            EventKind::Upload,
            Severity::Low,
            format!("Received {} file(s)", candidates.len()),
            Some(serde_json::json!({
                "files": candidates.iter().map(|c| c.meta.name.as_str()).collect::<Vec<_>>(),
            })),
        );

        let mut outcome = BatchOutcome::default();
        let mut taken = HashSet::new();
        for candidate in &candidates {
            match self.check_file_avoiding(candidate, &taken).await {
                FileOutcome::Accepted(file) => {
                    taken.insert(file.name.clone());
                    outcome.accepted.push(file);
                }
                FileOutcome::Rejected(rejected) => outcome.errors.push(rejected.into()),
            }
        }

        tracing::debug!(
            accepted = outcome.accepted.len(),
            rejected = outcome.errors.len(),
            "Batch processed"
        );

        outcome
    }

    fn reject(&self, file: &CandidateFile, reason: Rejection) -> FileOutcome {
        let details = Some(serde_json::json!({
            "file": file.meta.name,
            "type": file.meta.declared_type,
            "size": file.meta.size,
            "code": reason.code(),
        }));

        if reason.is_security_relevant() {
            self.events.emit(
                EventKind::Error,
                Severity::Critical,
                format!("Security check failed for {}: {}", file.meta.name, reason),
                details,
            );
        } else {
            self.events.emit(
                EventKind::Validation,
                Severity::Medium,
                format!("Validation failed for {}: {}", file.meta.name, reason),
                details,
            );
        }

        FileOutcome::Rejected(RejectedFile {
            file_name: file.meta.name.clone(),
            reason,
        })
    }
}
