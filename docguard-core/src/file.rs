//! Candidate and accepted file types.
//!
//! A file is its metadata plus a shared handle to its bytes. Renaming never
//! copies content: the accepted file points at the same [`FileContent`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;

/// Access to the raw bytes of a file.
///
/// Reading may suspend (disk, browser blob) and may fail; a failure only
/// affects the file it belongs to.
#[async_trait]
pub trait FileContent: Send + Sync {
    /// Read up to `len` leading bytes. Shorter content yields a shorter buffer.
    async fn read_prefix(&self, len: usize) -> Result<Vec<u8>>;

    /// Read the whole content.
    async fn read_all(&self) -> Result<Vec<u8>>;
}

/// Content already held in memory.
#[derive(Clone)]
pub struct MemoryContent {
    bytes: Arc<[u8]>,
}

impl MemoryContent {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[async_trait]
impl FileContent for MemoryContent {
    async fn read_prefix(&self, len: usize) -> Result<Vec<u8>> {
        Ok(self.bytes[..len.min(self.bytes.len())].to_vec())
    }

    async fn read_all(&self) -> Result<Vec<u8>> {
        Ok(self.bytes.to_vec())
    }
}

#[cfg(feature = "fs")]
mod fs_impl {
    use std::path::{Path, PathBuf};

    use async_trait::async_trait;
    use tokio::io::AsyncReadExt;

    use super::FileContent;
    use crate::error::Result;

    /// Content backed by a file on disk, read lazily.
    pub struct FsContent {
        path: PathBuf,
    }

    impl FsContent {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }

        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    #[async_trait]
    impl FileContent for FsContent {
        async fn read_prefix(&self, len: usize) -> Result<Vec<u8>> {
            let file = tokio::fs::File::open(&self.path).await?;
            let mut buf = Vec::with_capacity(len);
            file.take(len as u64).read_to_end(&mut buf).await?;
            Ok(buf)
        }

        async fn read_all(&self) -> Result<Vec<u8>> {
            Ok(tokio::fs::read(&self.path).await?)
        }
    }
}

#[cfg(feature = "fs")]
pub use fs_impl::FsContent;

/// Metadata the host reports for a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta {
    /// Original filename as supplied by the user
    pub name: String,
    /// Declared MIME type (browser `File.type`, multipart Content-Type)
    pub declared_type: String,
    /// Byte length
    pub size: u64,
    /// Last-modified instant reported by the host
    pub last_modified: DateTime<Utc>,
}

impl FileMeta {
    /// Lowercase extension with leading dot, e.g. `.pdf`.
    ///
    /// Taken from the text after the last `.`; a name without a dot yields
    /// the whole name, which never matches an allowed extension.
    pub fn extension(&self) -> String {
        format!(".{}", raw_extension(&self.name).to_lowercase())
    }
}

/// Text after the last `.` of `name`, original case. The whole name when there is no dot.
pub fn raw_extension(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// A file submitted for upload. Never mutated.
#[derive(Clone)]
pub struct CandidateFile {
    pub meta: FileMeta,
    pub content: Arc<dyn FileContent>,
}

impl CandidateFile {
    pub fn new(meta: FileMeta, content: Arc<dyn FileContent>) -> Self {
        Self { meta, content }
    }

    /// Build an in-memory candidate; size is taken from the buffer.
    pub fn from_bytes(
        name: impl Into<String>,
        declared_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        let bytes: Vec<u8> = bytes.into();
        let meta = FileMeta {
            name: name.into(),
            declared_type: declared_type.into(),
            size: bytes.len() as u64,
            last_modified: Utc::now(),
        };
        Self::new(meta, Arc::new(MemoryContent::new(bytes)))
    }

    /// Build a candidate backed by a file on disk, sizing it from filesystem metadata.
    #[cfg(feature = "fs")]
    pub async fn from_path(
        path: impl AsRef<std::path::Path>,
        declared_type: impl Into<String>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let last_modified = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        let meta = FileMeta {
            name,
            declared_type: declared_type.into(),
            size: metadata.len(),
            last_modified,
        };
        Ok(Self::new(meta, Arc::new(FsContent::new(path))))
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }
}

impl fmt::Debug for CandidateFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CandidateFile")
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

/// A file that passed every stage, under its canonical name.
#[derive(Clone)]
pub struct AcceptedFile {
    /// Canonical name, e.g. `piece-identite_2024-01-15T12-30-45-123Z.pdf`
    pub name: String,
    pub original_name: String,
    pub declared_type: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
    /// Same bytes as the candidate
    pub content: Arc<dyn FileContent>,
}

impl fmt::Debug for AcceptedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AcceptedFile")
            .field("name", &self.name)
            .field("original_name", &self.original_name)
            .field("declared_type", &self.declared_type)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}
