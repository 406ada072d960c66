//! OpenAPI documentation configuration
//!
//! Generates OpenAPI 3.0 specification for the docguard upload API.

use utoipa::OpenApi;

use crate::handlers::{
    EquipmentGroup, EquipmentRequest, EquipmentResponse, EventsResponse, HealthResponse,
    ReadyResponse, RemovedResponse, UploadErrorBody, UploadResponse, ZoneResponse,
};
use crate::zones::StoredFile;

/// docguard upload API - OpenAPI Documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "docguard - Upload API",
        version = "0.1.0",
        description = r#"
## Security checks for document and photo uploads

Files are posted to named **zones** (`piece-identite`, `justificatif-domicile`,
`mandat`, `photos`...). Every file goes through:

- **Suspicious-name heuristic** - executable and script extensions are refused
- **Classification** - declared type, extension, size (100 B to 10 MiB) and filename rules
- **Magic-number check** - the first bytes must match the declared type (JPEG, PNG, GIF, WebP, PDF)
- **Canonical renaming** - `{base}_{timestamp}.{ext}`, e.g. `piece-identite_2024-01-15T12-30-45-123Z.pdf`

A batch that would push a zone past its capacity is refused whole with `409 CAPACITY_EXCEEDED`.
Otherwise each file is judged on its own and refused files are listed in `errors`.
"#,
        license(name = "MIT OR Apache-2.0")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    tags(
        (name = "Uploads", description = "Submit files to an upload zone"),
        (name = "Zones", description = "List, download and remove accepted files"),
        (name = "Monitoring", description = "Recent pipeline events"),
        (name = "Equipment", description = "German to French vehicle equipment translation"),
        (name = "Health", description = "Service health and readiness endpoints")
    ),
    paths(
        crate::handlers::health::health,
        crate::handlers::health::ready,
        crate::handlers::uploads::upload_handler,
        crate::handlers::zones::get_zone_handler,
        crate::handlers::zones::download_file_handler,
        crate::handlers::zones::delete_file_handler,
        crate::handlers::zones::clear_zone_handler,
        crate::handlers::events::list_events_handler,
        crate::handlers::events::clear_events_handler,
        crate::handlers::equipment::parse_equipment_handler,
    ),
    components(
        schemas(
            HealthResponse,
            ReadyResponse,
            UploadResponse,
            UploadErrorBody,
            StoredFile,
            ZoneResponse,
            RemovedResponse,
            EventsResponse,
            EquipmentRequest,
            EquipmentResponse,
            EquipmentGroup,
        )
    )
)]
pub struct ApiDoc;
