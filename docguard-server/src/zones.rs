//! Upload zone registry
//!
//! A zone is a named slot (e.g. `piece-identite`, `justificatif-domicile`)
//! holding the files accepted so far. Each zone has its own async mutex,
//! held for the whole batch, so two concurrent uploads to the same zone
//! cannot both pass the capacity check.

use std::sync::Arc;

use axum::body::Bytes;
use dashmap::DashMap;
use docguard_core::unique_name;
use serde::Serialize;
use tokio::sync::Mutex;
use utoipa::ToSchema;

use crate::error::ApiError;

const MAX_ZONE_ID_LEN: usize = 64;

/// A file accepted into a zone.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StoredFile {
    /// Canonical name
    #[schema(example = "piece-identite_2024-01-15T12-30-45-123Z.pdf")]
    pub name: String,
    /// Name as uploaded
    #[schema(example = "scan-carte.pdf")]
    pub original_name: String,
    /// Declared Content-Type of the multipart field
    #[schema(example = "application/pdf")]
    pub content_type: String,
    /// Size in bytes
    pub size: u64,
    /// Hex-encoded SHA3-256 of the content
    pub sha3_256: String,
    /// When the file was accepted (RFC 3339)
    pub accepted_at: String,
    #[serde(skip)]
    pub data: Bytes,
}

/// Accepted files of one zone, in acceptance order.
#[derive(Debug, Default)]
pub struct Zone {
    files: Vec<StoredFile>,
}

impl Zone {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn files(&self) -> &[StoredFile] {
        &self.files
    }

    /// Keep `file`, renaming it with a numeric suffix if its canonical name
    /// is already held. Returns the name it is stored under.
    pub fn push(&mut self, mut file: StoredFile) -> String {
        file.name = unique_name(&file.name, |name| self.get(name).is_some());
        let name = file.name.clone();
        self.files.push(file);
        name
    }

    pub fn get(&self, name: &str) -> Option<&StoredFile> {
        self.files.iter().find(|f| f.name == name)
    }

    /// Remove a file by canonical name, returning how many were removed.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.files.len();
        self.files.retain(|f| f.name != name);
        before - self.files.len()
    }

    /// Drop every file, returning how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.files.len();
        self.files.clear();
        removed
    }
}

/// Zone identifiers are short slugs: ASCII letters, digits, `-` and `_`.
pub fn validate_zone_id(id: &str) -> Result<(), ApiError> {
    if id.is_empty() || id.len() > MAX_ZONE_ID_LEN {
        return Err(ApiError::InvalidZone(format!(
            "must be 1 to {} characters",
            MAX_ZONE_ID_LEN
        )));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ApiError::InvalidZone(format!(
            "'{}' (use letters, digits, '-' or '_')",
            id
        )));
    }
    Ok(())
}

/// All zones known to the server.
#[derive(Debug, Default)]
pub struct ZoneRegistry {
    zones: DashMap<String, Arc<Mutex<Zone>>>,
}

impl ZoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to a zone, created empty on first use.
    pub fn zone(&self, id: &str) -> Arc<Mutex<Zone>> {
        self.zones
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Zone::default())))
            .clone()
    }

    /// Handle to an existing zone.
    pub fn get(&self, id: &str) -> Option<Arc<Mutex<Zone>>> {
        self.zones.get(id).map(|entry| entry.clone())
    }

    /// Forget `id` if its zone is empty and no request holds a handle to it.
    ///
    /// Runs under the map's shard lock, so no new handle can be taken while
    /// the check is made.
    pub fn prune(&self, id: &str) -> bool {
        self.zones
            .remove_if(id, |_, zone| {
                Arc::strong_count(zone) == 1 && zone.try_lock().is_ok_and(|z| z.is_empty())
            })
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(name: &str) -> StoredFile {
        StoredFile {
            name: name.to_string(),
            original_name: "scan.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            size: 3,
            sha3_256: String::new(),
            accepted_at: String::new(),
            data: Bytes::from_static(b"abc"),
        }
    }

    #[test]
    fn test_zone_id_validation() {
        assert!(validate_zone_id("piece-identite").is_ok());
        assert!(validate_zone_id("zone_2").is_ok());
        assert!(validate_zone_id("").is_err());
        assert!(validate_zone_id("a/b").is_err());
        assert!(validate_zone_id("é").is_err());
        assert!(validate_zone_id(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_zone_remove_and_clear() {
        let mut zone = Zone::default();
        zone.push(stored("a.pdf"));
        zone.push(stored("b.pdf"));

        assert_eq!(zone.remove("a.pdf"), 1);
        assert_eq!(zone.remove("a.pdf"), 0);
        assert_eq!(zone.len(), 1);
        assert!(zone.get("b.pdf").is_some());
        assert_eq!(zone.clear(), 1);
        assert!(zone.is_empty());
    }

    #[test]
    fn test_push_keeps_same_named_files_apart() {
        let mut zone = Zone::default();
        let name = "document_2024-01-15T12-30-45-123Z.pdf";

        assert_eq!(zone.push(stored(name)), name);
        assert_eq!(zone.push(stored(name)), "document_2024-01-15T12-30-45-123Z-1.pdf");
        assert_eq!(zone.len(), 2);

        assert_eq!(zone.remove(name), 1);
        assert_eq!(zone.len(), 1);
        assert!(zone.get("document_2024-01-15T12-30-45-123Z-1.pdf").is_some());
    }

    #[tokio::test]
    async fn test_prune_drops_only_idle_empty_zones() {
        let registry = ZoneRegistry::new();

        let handle = registry.zone("photos");
        assert!(!registry.prune("photos"), "a held handle keeps the zone");
        handle.lock().await.push(stored("a.jpg"));
        drop(handle);
        assert!(!registry.prune("photos"), "a zone with files is kept");

        registry.zone("photos").lock().await.clear();
        assert!(registry.prune("photos"));
        assert!(registry.is_empty());
        assert!(!registry.prune("unknown"));
    }

    #[tokio::test]
    async fn test_registry_shares_zone_handles() {
        let registry = ZoneRegistry::new();
        assert!(registry.get("mandat").is_none());

        registry.zone("mandat").lock().await.push(stored("a.pdf"));
        let again = registry.zone("mandat");
        assert_eq!(again.lock().await.len(), 1);
        assert_eq!(registry.len(), 1);
    }
}
