//! API integration tests for docguard-server.
//!
//! These tests verify the HTTP API behavior with realistic multipart
//! requests, going through the full upload flow via the REST endpoints.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use docguard_core::FixedClock;
use docguard_server::{create_router, create_router_with_state, AppState, Config};
use serde_json::Value;
use tower::ServiceExt;

const BOUNDARY: &str = "----TestBoundary7MA4YWxkTrZu0gW";

/// A file part of a multipart body
struct Part<'a> {
    file_name: &'a str,
    content_type: &'a str,
    content: Vec<u8>,
}

fn pdf(file_name: &str) -> Part<'_> {
    let mut content = b"%PDF-1.7\n".to_vec();
    content.resize(2048, b' ');
    Part {
        file_name,
        content_type: "application/pdf",
        content,
    }
}

fn jpeg(file_name: &str) -> Part<'_> {
    let mut content = vec![0xFF, 0xD8, 0xFF, 0xE0];
    content.resize(4096, 0);
    Part {
        file_name,
        content_type: "image/jpeg",
        content,
    }
}

/// Helper to create a multipart body with file fields and an optional custom name
fn create_upload_multipart(parts: &[Part<'_>], custom_name: Option<&str>) -> (String, Vec<u8>) {
    let mut body = Vec::new();

    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
                part.file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", part.content_type).as_bytes());
        body.extend_from_slice(&part.content);
        body.extend_from_slice(b"\r\n");
    }

    if let Some(name) = custom_name {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(b"Content-Disposition: form-data; name=\"custom_name\"\r\n\r\n");
        body.extend_from_slice(name.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    // End boundary
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}

/// Router with a frozen clock so canonical names are predictable
fn create_test_app_with(config: Config) -> Router {
    let state = AppState::with_clock(&config, Arc::new(FixedClock::from_millis(1_705_321_845_123)));
    create_router_with_state(&config, state)
}

fn create_test_app() -> Router {
    create_test_app_with(Config::default())
}

async fn upload(
    app: &Router,
    zone: &str,
    parts: &[Part<'_>],
    custom_name: Option<&str>,
) -> (StatusCode, Value) {
    let (content_type, body) = create_upload_multipart(parts, custom_name);
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/zones/{}/files", zone))
                .header("content-type", content_type)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    json_response(response).await
}

async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    json_response(response).await
}

async fn json_response(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

// ============================================================================
// Health & Readiness Tests
// ============================================================================

#[tokio::test]
async fn test_health_endpoint_returns_ok() {
    let app = create_router();
    let (status, json) = send(&app, "GET", "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "docguard-server");
    assert_eq!(json["max_files_per_zone"], 5);
}

#[tokio::test]
async fn test_ready_endpoint_returns_ok() {
    let app = create_router();
    let (status, json) = send(&app, "GET", "/ready").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ready"], true);
}

// ============================================================================
// Upload Tests
// ============================================================================

#[tokio::test]
async fn test_upload_accepts_and_renames() {
    let app = create_test_app();
    let (status, json) = upload(&app, "pieces", &[pdf("facture.pdf"), jpeg("recto.jpg")], None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["zone"], "pieces");
    assert_eq!(json["accepted"][0]["name"], "document_2024-01-15T12-30-45-123Z.pdf");
    assert_eq!(json["accepted"][0]["original_name"], "facture.pdf");
    assert_eq!(json["accepted"][0]["size"], 2048);
    assert_eq!(json["accepted"][0]["sha3_256"].as_str().unwrap().len(), 64);
    assert_eq!(json["accepted"][1]["name"], "image_2024-01-15T12-30-45-123Z.jpg");
    assert_eq!(json["errors"].as_array().unwrap().len(), 0);
    assert_eq!(json["zone_count"], 2);
}

#[tokio::test]
async fn test_upload_custom_name() {
    let app = create_test_app();
    let (status, json) = upload(&app, "mandat", &[pdf("scan.pdf")], Some("mandat")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["accepted"][0]["name"], "mandat_2024-01-15T12-30-45-123Z.pdf");
}

#[tokio::test]
async fn test_upload_partial_rejection_is_200() {
    let app = create_test_app();
    let forged = Part {
        file_name: "photo.png",
        content_type: "image/png",
        content: vec![0u8; 500],
    };
    let script = Part {
        file_name: "invoice.exe",
        content_type: "application/pdf",
        content: vec![0u8; 500],
    };

    let (status, json) = upload(&app, "pieces", &[pdf("a.pdf"), forged, script], None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["accepted"].as_array().unwrap().len(), 1);
    let errors = json["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0]["file_name"], "photo.png");
    assert_eq!(errors[0]["code"], "SIGNATURE_MISMATCH");
    assert_eq!(errors[1]["file_name"], "invoice.exe");
    assert_eq!(errors[1]["code"], "SUSPICIOUS_PATTERN");
}

#[tokio::test]
async fn test_upload_without_file_is_bad_request() {
    let app = create_test_app();
    let (status, json) = upload(&app, "pieces", &[], Some("mandat")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "MISSING_FILE");
}

#[tokio::test]
async fn test_upload_invalid_zone_id() {
    let app = create_test_app();
    let (status, json) = upload(&app, "bad.zone", &[pdf("a.pdf")], None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_ZONE");
}

// ============================================================================
// Capacity Tests
// ============================================================================

#[tokio::test]
async fn test_capacity_persists_across_requests() {
    let app = create_test_app_with(Config {
        max_files_per_zone: 3,
        ..Config::default()
    });

    let (status, _) = upload(&app, "photos", &[jpeg("1.jpg"), jpeg("2.jpg")], None).await;
    assert_eq!(status, StatusCode::OK);

    // 2 + 2 > 3: whole batch refused
    let (status, json) = upload(&app, "photos", &[jpeg("3.jpg"), jpeg("4.jpg")], None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CAPACITY_EXCEEDED");

    let (_, zone) = send(&app, "GET", "/zones/photos").await;
    assert_eq!(zone["files"].as_array().unwrap().len(), 2);

    // Other zones are unaffected
    let (status, _) = upload(&app, "pieces", &[pdf("a.pdf"), pdf("b.pdf")], None).await;
    assert_eq!(status, StatusCode::OK);

    // Exactly reaching the limit is allowed
    let (status, json) = upload(&app, "photos", &[jpeg("3.jpg")], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["zone_count"], 3);
}

#[tokio::test]
async fn test_concurrent_uploads_respect_capacity() {
    let app = create_test_app_with(Config {
        max_files_per_zone: 2,
        ..Config::default()
    });

    let first_files = [jpeg("1.jpg"), jpeg("2.jpg")];
    let second_files = [jpeg("3.jpg"), jpeg("4.jpg")];
    let first = upload(&app, "photos", &first_files, None);
    let second = upload(&app, "photos", &second_files, None);
    let ((s1, _), (s2, _)) = tokio::join!(first, second);

    let mut statuses = [s1, s2];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::CONFLICT]);

    let (_, zone) = send(&app, "GET", "/zones/photos").await;
    assert_eq!(zone["files"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_delete_frees_a_slot() {
    let app = create_test_app_with(Config {
        max_files_per_zone: 1,
        ..Config::default()
    });

    let (_, json) = upload(&app, "mandat", &[pdf("a.pdf")], None).await;
    let name = json["accepted"][0]["name"].as_str().unwrap().to_string();

    let (status, _) = upload(&app, "mandat", &[pdf("b.pdf")], None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, json) = send(&app, "DELETE", &format!("/zones/mandat/files/{}", name)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["remaining"], 0);

    let (status, _) = upload(&app, "mandat", &[pdf("b.pdf")], None).await;
    assert_eq!(status, StatusCode::OK);
}

// ============================================================================
// Zone Tests
// ============================================================================

#[tokio::test]
async fn test_download_returns_original_bytes() {
    let app = create_test_app();
    let original = pdf("facture.pdf").content;
    let (_, json) = upload(&app, "pieces", &[pdf("facture.pdf")], None).await;
    let name = json["accepted"][0]["name"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/zones/pieces/files/{}", name))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/pdf");
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(body.as_ref(), original.as_slice());
}

#[tokio::test]
async fn test_unknown_file_is_not_found() {
    let app = create_test_app();
    let (status, json) = send(&app, "DELETE", "/zones/pieces/files/nope.pdf").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_clear_zone() {
    let app = create_test_app();
    upload(&app, "pieces", &[pdf("a.pdf"), pdf("b.pdf")], None).await;

    let (status, json) = send(&app, "DELETE", "/zones/pieces").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["removed"], 2);

    let (_, zone) = send(&app, "GET", "/zones/pieces").await;
    assert!(zone["files"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_same_instant_uploads_get_distinct_names() {
    let app = create_test_app();

    let (_, first) = upload(&app, "pieces", &[pdf("a.pdf"), pdf("b.pdf")], None).await;
    assert_eq!(first["accepted"][0]["name"], "document_2024-01-15T12-30-45-123Z.pdf");
    assert_eq!(first["accepted"][1]["name"], "document_2024-01-15T12-30-45-123Z-1.pdf");

    // A later batch at the same instant does not shadow the stored files
    let (_, second) = upload(&app, "pieces", &[pdf("c.pdf")], None).await;
    assert_eq!(second["accepted"][0]["name"], "document_2024-01-15T12-30-45-123Z-2.pdf");

    let (_, zone) = send(&app, "GET", "/zones/pieces").await;
    let names: Vec<_> = zone["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["original_name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["a.pdf", "b.pdf", "c.pdf"]);

    let (status, json) = send(
        &app,
        "DELETE",
        "/zones/pieces/files/document_2024-01-15T12-30-45-123Z.pdf",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["removed"], 1);
    assert_eq!(json["remaining"], 2);
}

#[tokio::test]
async fn test_empty_zones_are_not_kept() {
    let app = create_test_app();
    let forged = Part {
        file_name: "photo.png",
        content_type: "image/png",
        content: vec![0u8; 500],
    };

    // Every file refused: the zone is not retained
    let (status, _) = upload(&app, "photos", &[forged], None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, health) = send(&app, "GET", "/health").await;
    assert_eq!(health["zones"], 0);

    upload(&app, "pieces", &[pdf("a.pdf")], None).await;
    let (_, health) = send(&app, "GET", "/health").await;
    assert_eq!(health["zones"], 1);

    send(&app, "DELETE", "/zones/pieces").await;
    let (_, health) = send(&app, "GET", "/health").await;
    assert_eq!(health["zones"], 0);
}

// ============================================================================
// Monitoring & Equipment Tests
// ============================================================================

#[tokio::test]
async fn test_events_record_pipeline_stages() {
    let app = create_test_app();
    upload(&app, "pieces", &[pdf("a.pdf")], None).await;

    let (status, json) = send(&app, "GET", "/events?limit=2").await;
    assert_eq!(status, StatusCode::OK);
    let events = json["events"].as_array().unwrap();
    assert_eq!(events.len(), 2);
    // Newest first: the success event closes the pipeline
    assert_eq!(events[0]["type"], "success");
    assert_eq!(json["counts"]["success"], 1);
    assert_eq!(json["counts"]["upload"], 1);

    let (status, _) = send(&app, "DELETE", "/events").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, json) = send(&app, "GET", "/events").await;
    assert!(json["events"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_equipment_parse() {
    let app = create_test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/equipment/parse")
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"text":"Klimaautomatik, Sitzheizung; Navi, Kofferraumwanne"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    let (status, json) = json_response(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 3);
    assert_eq!(json["groups"][0]["category"], "confort");
    assert_eq!(json["groups"][0]["items"][1], "Sièges chauffants");
    assert_eq!(json["unmatched"][0], "Kofferraumwanne");
}
