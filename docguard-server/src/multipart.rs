//! Multipart form parsing helpers
//!
//! Collects every `file` field of an upload (in order) plus the text fields.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::Multipart;
use chrono::{DateTime, Utc};
use docguard_core::{CandidateFile, FileMeta, MemoryContent};

use crate::error::ApiError;

/// Represents a file uploaded via multipart form
#[derive(Debug, Clone)]
pub struct FileField {
    /// File data bytes
    pub data: Vec<u8>,
    /// Content-Type from the multipart field (if provided)
    pub content_type: Option<String>,
    /// Original filename from the multipart field (if provided)
    pub file_name: Option<String>,
}

impl FileField {
    /// Turn the field into a pipeline candidate.
    ///
    /// A missing Content-Type becomes the empty string, which no policy allows.
    pub fn into_candidate(self, received_at: DateTime<Utc>) -> CandidateFile {
        let meta = FileMeta {
            name: self.file_name.unwrap_or_default(),
            declared_type: self.content_type.unwrap_or_default(),
            size: self.data.len() as u64,
            last_modified: received_at,
        };
        CandidateFile::new(meta, Arc::new(MemoryContent::new(self.data)))
    }
}

/// Parsed multipart form fields
#[derive(Debug)]
pub struct MultipartFields {
    /// File fields named "file", in submission order
    files: Vec<FileField>,
    /// Text fields indexed by name
    text_fields: HashMap<String, String>,
}

impl MultipartFields {
    /// Parse all fields from a multipart request
    pub async fn parse(multipart: &mut Multipart) -> Result<Self, ApiError> {
        let mut files = Vec::new();
        let mut text_fields = HashMap::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::malformed(format!("Failed to parse multipart: {}", e)))?
        {
            let name = field.name().unwrap_or("").to_string();

            if name == "file" {
                let content_type = field.content_type().map(|s| s.to_string());
                let file_name = field.file_name().map(|s| s.to_string());

                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::malformed(format!("Failed to read file: {}", e)))?
                    .to_vec();

                files.push(FileField {
                    data,
                    content_type,
                    file_name,
                });
            } else {
                // Text field
                let value = field.text().await.map_err(|e| {
                    ApiError::malformed(format!("Failed to read field '{}': {}", name, e))
                })?;
                text_fields.insert(name, value);
            }
        }

        Ok(Self { files, text_fields })
    }

    /// Take the file fields, failing if there are none.
    pub fn require_files(&mut self) -> Result<Vec<FileField>, ApiError> {
        if self.files.is_empty() {
            return Err(ApiError::MissingFile);
        }
        Ok(std::mem::take(&mut self.files))
    }

    /// Get a text field value
    ///
    /// Returns `None` if the field is not present or blank.
    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.text_fields
            .get(name)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_text_ignores_blank() {
        let mut text_fields = HashMap::new();
        text_fields.insert("custom_name".to_string(), " mandat ".to_string());
        text_fields.insert("blank".to_string(), "   ".to_string());

        let fields = MultipartFields {
            files: Vec::new(),
            text_fields,
        };

        assert_eq!(fields.get_text("custom_name"), Some("mandat"));
        assert_eq!(fields.get_text("blank"), None);
        assert_eq!(fields.get_text("missing"), None);
    }

    #[test]
    fn test_require_files_missing() {
        let mut fields = MultipartFields {
            files: Vec::new(),
            text_fields: HashMap::new(),
        };

        assert!(fields.require_files().is_err());
    }

    #[test]
    fn test_into_candidate_defaults() {
        let field = FileField {
            data: vec![1, 2, 3],
            content_type: None,
            file_name: None,
        };
        let candidate = field.into_candidate(DateTime::default());
        assert_eq!(candidate.meta.name, "");
        assert_eq!(candidate.meta.declared_type, "");
        assert_eq!(candidate.meta.size, 3);
    }
}
