//! Accept command implementation.
//!
//! The output directory plays the part of the upload zone: regular files
//! already in it count against the capacity.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use docguard_core::{suffixed_name, UploadGuard};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::check::{ensure_all_accepted, load_candidates, report};
use crate::PolicyArgs;

async fn count_existing(dir: &Path) -> Result<usize> {
    if !tokio::fs::try_exists(dir).await.unwrap_or(false) {
        return Ok(0);
    }

    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to read output directory: {}", dir.display()))?;
    let mut count = 0;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            count += 1;
        }
    }
    Ok(count)
}

/// Write `bytes` as `dir/name`, or under the first free suffixed name.
///
/// Files are created with `create_new`, so an existing file is never
/// overwritten. Returns the name actually used.
async fn store(dir: &Path, name: &str, bytes: &[u8]) -> Result<String> {
    let mut n = 0;
    loop {
        let candidate = if n == 0 {
            name.to_string()
        } else {
            suffixed_name(name, n)
        };
        let destination = dir.join(&candidate);

        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&destination)
            .await
        {
            Ok(mut out) => {
                out.write_all(bytes)
                    .await
                    .with_context(|| format!("Failed to write {}", destination.display()))?;
                out.flush()
                    .await
                    .with_context(|| format!("Failed to write {}", destination.display()))?;
                info!(path = %destination.display(), bytes = bytes.len(), "Stored accepted file");
                return Ok(candidate);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!(path = %destination.display(), "Name taken, trying next suffix");
                n += 1;
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to write {}", destination.display()));
            }
        }
    }
}

/// Execute the accept command.
pub async fn execute(files: Vec<PathBuf>, out_dir: PathBuf, args: PolicyArgs) -> Result<()> {
    let candidates = load_candidates(&files, &args).await?;
    let existing = count_existing(&out_dir).await?;
    debug!(existing, out_dir = %out_dir.display(), "Counted files already in zone");

    let guard = UploadGuard::new(args.policy());
    let mut outcome = guard.process(candidates, existing).await;

    if !outcome.accepted.is_empty() {
        tokio::fs::create_dir_all(&out_dir)
            .await
            .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;
    }

    for file in &mut outcome.accepted {
        let bytes = file
            .content
            .read_all()
            .await
            .with_context(|| format!("Failed to read file: {}", file.original_name))?;
        file.name = store(&out_dir, &file.name, &bytes).await?;
    }

    report(&outcome, args.json).await?;
    if !args.json && !outcome.accepted.is_empty() {
        println!("   {} {}", "Stored in:".dimmed(), out_dir.display());
    }
    ensure_all_accepted(&outcome)
}
