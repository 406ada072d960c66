//! Monitoring handlers
//!
//! Exposes the recent pipeline events kept in memory.

use axum::{
    extract::{Query, State},
    Json,
};
use docguard_core::{EventCounts, UploadEvent};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::state::AppState;

/// Query parameters for listing events
#[derive(Debug, Deserialize, IntoParams)]
pub struct EventsQuery {
    /// Maximum number of events, newest first
    #[param(minimum = 1)]
    pub limit: Option<usize>,
}

/// Recent events and per-kind counts
#[derive(Debug, Serialize, ToSchema)]
pub struct EventsResponse {
    #[schema(value_type = Vec<Object>)]
    pub events: Vec<UploadEvent>,
    /// Counts over the whole buffer, not only the returned page
    #[schema(value_type = Object)]
    pub counts: EventCounts,
}

/// Recent pipeline events
#[utoipa::path(
    get,
    path = "/events",
    tag = "Monitoring",
    params(EventsQuery),
    responses((status = 200, description = "Recent events, newest first", body = EventsResponse))
)]
pub async fn list_events_handler(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Json<EventsResponse> {
    let events = match query.limit {
        Some(limit) => state.events.recent(limit),
        None => state.events.snapshot(),
    };

    Json(EventsResponse {
        events,
        counts: state.events.counts(),
    })
}

/// Clear the event buffer
#[utoipa::path(
    delete,
    path = "/events",
    tag = "Monitoring",
    responses((status = 204, description = "Events cleared"))
)]
pub async fn clear_events_handler(State(state): State<AppState>) -> axum::http::StatusCode {
    state.events.clear();
    axum::http::StatusCode::NO_CONTENT
}
