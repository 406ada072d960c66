//! Upload handler
//!
//! Handles POST /zones/{zone}/files: runs the pipeline on a batch under the
//! zone lock and stores the accepted files.

use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    Json,
};
use docguard_core::{CandidateFile, UploadError, UploadGuard};
use serde::Serialize;
use sha3::{Digest, Sha3_256};
use tokio::sync::Mutex;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::multipart::MultipartFields;
use crate::state::AppState;
use crate::zones::{validate_zone_id, StoredFile, Zone};

/// One refused file
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadErrorBody {
    /// Name of the refused file
    #[schema(example = "invoice.exe")]
    pub file_name: Option<String>,
    /// Stable rejection code
    #[schema(example = "SUSPICIOUS_PATTERN")]
    pub code: String,
    /// Human-readable reason
    #[schema(example = "invoice.exe: Suspicious file name detected")]
    pub message: String,
}

impl From<&UploadError> for UploadErrorBody {
    fn from(error: &UploadError) -> Self {
        Self {
            file_name: error.file_name.clone(),
            code: error.reason.code().to_string(),
            message: error.to_string(),
        }
    }
}

/// Response for an upload batch
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    /// Zone the files were submitted to
    pub zone: String,
    /// Files accepted by this request, in submission order
    pub accepted: Vec<StoredFile>,
    /// Files refused by this request, in submission order
    pub errors: Vec<UploadErrorBody>,
    /// Accepted files now held by the zone
    pub zone_count: usize,
}

/// Upload files to a zone
///
/// Accepts multipart/form-data with:
/// - **file** (required, repeatable): files to check, in order
/// - **custom_name** (optional): base name forced onto every accepted file
///
/// Each file goes through the suspicious-name heuristic, the type/extension/size
/// classifier and the magic-number check, then is stored under its canonical name.
/// A batch that would push the zone past its capacity is refused whole (409).
#[utoipa::path(
    post,
    path = "/zones/{zone}/files",
    tag = "Uploads",
    params(("zone" = String, Path, description = "Zone identifier, e.g. piece-identite")),
    request_body(
        content_type = "multipart/form-data",
        description = "One or more 'file' fields and an optional 'custom_name'"
    ),
    responses(
        (status = 200, description = "Batch processed; refused files are listed in errors", body = UploadResponse),
        (status = 400, description = "Invalid request (no file, bad zone id)"),
        (status = 409, description = "Batch would exceed the zone capacity")
    )
)]
pub async fn upload_handler(
    State(state): State<AppState>,
    Path(zone_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    validate_zone_id(&zone_id)?;

    let mut fields = MultipartFields::parse(&mut multipart).await?;
    let received_at = state.clock().now();
    let candidates: Vec<CandidateFile> = fields
        .require_files()?
        .into_iter()
        .map(|field| field.into_candidate(received_at))
        .collect();

    let guard = state.guard(fields.get_text("custom_name"));

    let handle = state.zones.zone(&zone_id);
    let result = store_batch(&state, &handle, guard, candidates).await;
    drop(handle);
    // Zones left empty (refused or fully rejected batch) are not kept
    state.zones.prune(&zone_id);

    let (accepted, errors, zone_count) = result?;

    tracing::info!(
        zone = %zone_id,
        accepted = accepted.len(),
        rejected = errors.len(),
        zone_count,
        "Upload batch stored"
    );

    Ok(Json(UploadResponse {
        zone: zone_id,
        accepted,
        errors,
        zone_count,
    }))
}

/// Run the batch under the zone lock and keep the accepted files.
///
/// Returns the stored files under their final names, the refusals and the
/// zone size afterwards.
async fn store_batch(
    state: &AppState,
    handle: &Mutex<Zone>,
    guard: UploadGuard,
    candidates: Vec<CandidateFile>,
) -> Result<(Vec<StoredFile>, Vec<UploadErrorBody>, usize), ApiError> {
    let mut zone = handle.lock().await;

    let outcome = guard.process(candidates, zone.len()).await;
    if outcome.capacity_exceeded() {
        let reason = outcome
            .errors
            .into_iter()
            .next()
            .map(|e| e.reason)
            .ok_or_else(|| ApiError::storage("capacity refusal without reason"))?;
        return Err(ApiError::Refused(reason));
    }

    let accepted_at = state.clock().now().to_rfc3339();
    let mut accepted = Vec::with_capacity(outcome.accepted.len());
    for file in &outcome.accepted {
        let data = file
            .content
            .read_all()
            .await
            .map_err(|e| ApiError::storage(format!("Failed to read accepted file: {}", e)))?;

        let stored = StoredFile {
            name: file.name.clone(),
            original_name: file.original_name.clone(),
            content_type: file.declared_type.clone(),
            size: file.size,
            sha3_256: hex::encode(Sha3_256::digest(&data)),
            accepted_at: accepted_at.clone(),
            data: Bytes::from(data),
        };
        let name = zone.push(stored.clone());
        accepted.push(StoredFile { name, ..stored });
    }

    let errors = outcome.errors.iter().map(UploadErrorBody::from).collect();
    Ok((accepted, errors, zone.len()))
}
