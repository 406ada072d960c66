//! Equipment translation handler
//!
//! Handles POST /equipment/parse for dealer listings written in German.

use axum::Json;
use docguard_core::parse_equipment;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ApiError;

/// Largest description accepted, in bytes
const MAX_TEXT_LEN: usize = 64 * 1024;

/// Request body for equipment parsing
#[derive(Debug, Deserialize, ToSchema)]
pub struct EquipmentRequest {
    /// Dealer description, terms separated by commas, semicolons, bullets or newlines
    #[schema(example = "Klimaautomatik, Sitzheizung, Navi")]
    pub text: String,
}

/// Translated items of one category
#[derive(Debug, Serialize, ToSchema)]
pub struct EquipmentGroup {
    /// Category key
    #[schema(example = "confort")]
    pub category: &'static str,
    /// French category label
    #[schema(example = "Confort")]
    pub label: &'static str,
    /// French item labels
    pub items: Vec<String>,
}

/// Response for equipment parsing
#[derive(Debug, Serialize, ToSchema)]
pub struct EquipmentResponse {
    pub groups: Vec<EquipmentGroup>,
    /// Fragments no pattern recognised
    pub unmatched: Vec<String>,
    /// Number of recognised items
    pub total: usize,
}

/// Translate a German equipment list
#[utoipa::path(
    post,
    path = "/equipment/parse",
    tag = "Equipment",
    request_body = EquipmentRequest,
    responses(
        (status = 200, description = "Categorized French equipment", body = EquipmentResponse),
        (status = 400, description = "Text too long")
    )
)]
pub async fn parse_equipment_handler(
    Json(request): Json<EquipmentRequest>,
) -> Result<Json<EquipmentResponse>, ApiError> {
    if request.text.len() > MAX_TEXT_LEN {
        return Err(ApiError::malformed(format!(
            "Text too long: {} bytes exceeds maximum of {} bytes",
            request.text.len(),
            MAX_TEXT_LEN
        )));
    }

    let list = parse_equipment(&request.text);
    let total = list.total();

    let groups = list
        .categories
        .into_iter()
        .map(|(category, items)| EquipmentGroup {
            category: category.as_str(),
            label: category.label(),
            items,
        })
        .collect();

    Ok(Json(EquipmentResponse {
        groups,
        unmatched: list.unmatched,
        total,
    }))
}
