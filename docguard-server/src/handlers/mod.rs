//! HTTP request handlers
//!
//! This module contains all the request handlers for the API endpoints.

pub mod equipment;
pub mod events;
pub mod health;
pub mod uploads;
pub mod zones;

pub use crate::state::AppState;
pub use equipment::{
    parse_equipment_handler, EquipmentGroup, EquipmentRequest, EquipmentResponse,
};
pub use events::{clear_events_handler, list_events_handler, EventsQuery, EventsResponse};
pub use health::{health, ready, HealthResponse, ReadyResponse};
pub use uploads::{upload_handler, UploadErrorBody, UploadResponse};
pub use zones::{
    clear_zone_handler, delete_file_handler, download_file_handler, get_zone_handler,
    RemovedResponse, ZoneResponse,
};
