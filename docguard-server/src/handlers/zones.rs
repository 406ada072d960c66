//! Zone handlers
//!
//! Listing, downloading and removing accepted files.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::state::AppState;
use crate::zones::{validate_zone_id, StoredFile};

/// Files held by a zone
#[derive(Debug, Serialize, ToSchema)]
pub struct ZoneResponse {
    pub zone: String,
    /// Accepted files, in acceptance order
    pub files: Vec<StoredFile>,
    /// Capacity of the zone
    pub max_files: usize,
}

/// Result of a removal
#[derive(Debug, Serialize, ToSchema)]
pub struct RemovedResponse {
    pub zone: String,
    /// Number of files removed
    pub removed: usize,
    /// Files left in the zone
    pub remaining: usize,
}

/// List the files of a zone
///
/// An unknown zone is reported as empty.
#[utoipa::path(
    get,
    path = "/zones/{zone}",
    tag = "Zones",
    params(("zone" = String, Path, description = "Zone identifier")),
    responses(
        (status = 200, description = "Zone content", body = ZoneResponse),
        (status = 400, description = "Invalid zone id")
    )
)]
pub async fn get_zone_handler(
    State(state): State<AppState>,
    Path(zone_id): Path<String>,
) -> Result<Json<ZoneResponse>, ApiError> {
    validate_zone_id(&zone_id)?;

    let files = match state.zones.get(&zone_id) {
        Some(zone) => zone.lock().await.files().to_vec(),
        None => Vec::new(),
    };

    Ok(Json(ZoneResponse {
        zone: zone_id,
        files,
        max_files: state.policy.max_files,
    }))
}

/// Download an accepted file
#[utoipa::path(
    get,
    path = "/zones/{zone}/files/{name}",
    tag = "Zones",
    params(
        ("zone" = String, Path, description = "Zone identifier"),
        ("name" = String, Path, description = "Canonical file name")
    ),
    responses(
        (status = 200, description = "File content with its declared Content-Type"),
        (status = 404, description = "Unknown zone or file")
    )
)]
pub async fn download_file_handler(
    State(state): State<AppState>,
    Path((zone_id, name)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    validate_zone_id(&zone_id)?;

    let zone = state
        .zones
        .get(&zone_id)
        .ok_or_else(|| ApiError::ZoneNotFound(zone_id.clone()))?;
    let zone = zone.lock().await;
    let file = zone
        .get(&name)
        .ok_or_else(|| ApiError::file_not_found(&zone_id, &name))?;

    Ok((
        [
            (header::CONTENT_TYPE, file.content_type.clone()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.name),
            ),
        ],
        file.data.clone(),
    )
        .into_response())
}

/// Remove one accepted file, freeing a slot in the zone
#[utoipa::path(
    delete,
    path = "/zones/{zone}/files/{name}",
    tag = "Zones",
    params(
        ("zone" = String, Path, description = "Zone identifier"),
        ("name" = String, Path, description = "Canonical file name")
    ),
    responses(
        (status = 200, description = "File removed", body = RemovedResponse),
        (status = 404, description = "Unknown zone or file")
    )
)]
pub async fn delete_file_handler(
    State(state): State<AppState>,
    Path((zone_id, name)): Path<(String, String)>,
) -> Result<Json<RemovedResponse>, ApiError> {
    validate_zone_id(&zone_id)?;

    let handle = state
        .zones
        .get(&zone_id)
        .ok_or_else(|| ApiError::ZoneNotFound(zone_id.clone()))?;
    let (removed, remaining) = {
        let mut zone = handle.lock().await;
        (zone.remove(&name), zone.len())
    };
    drop(handle);

    if removed == 0 {
        return Err(ApiError::file_not_found(&zone_id, &name));
    }
    if remaining == 0 {
        state.zones.prune(&zone_id);
    }

    tracing::info!(zone = %zone_id, file = %name, removed, "File removed from zone");

    Ok(Json(RemovedResponse {
        zone: zone_id,
        removed,
        remaining,
    }))
}

/// Remove every file of a zone
#[utoipa::path(
    delete,
    path = "/zones/{zone}",
    tag = "Zones",
    params(("zone" = String, Path, description = "Zone identifier")),
    responses(
        (status = 200, description = "Zone emptied", body = RemovedResponse),
        (status = 400, description = "Invalid zone id")
    )
)]
pub async fn clear_zone_handler(
    State(state): State<AppState>,
    Path(zone_id): Path<String>,
) -> Result<Json<RemovedResponse>, ApiError> {
    validate_zone_id(&zone_id)?;

    let removed = match state.zones.get(&zone_id) {
        Some(zone) => zone.lock().await.clear(),
        None => 0,
    };
    state.zones.prune(&zone_id);

    tracing::info!(zone = %zone_id, removed, "Zone cleared");

    Ok(Json(RemovedResponse {
        zone: zone_id,
        removed,
        remaining: 0,
    }))
}
