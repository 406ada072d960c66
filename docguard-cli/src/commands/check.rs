//! Check command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use docguard_core::{BatchOutcome, CandidateFile, UploadGuard};
use serde_json::json;
use tracing::info;

use crate::exit_codes::Rejected;
use crate::utils::{declared_type_for, format_size, sha3_hex};
use crate::PolicyArgs;

/// Open every path as a candidate, in order.
pub async fn load_candidates(files: &[PathBuf], args: &PolicyArgs) -> Result<Vec<CandidateFile>> {
    let mut candidates = Vec::with_capacity(files.len());
    for path in files {
        let declared_type = declared_type_for(path, args.declared_type.as_deref());
        let candidate = CandidateFile::from_path(path, declared_type)
            .await
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        info!(
            path = %path.display(),
            size = candidate.meta.size,
            declared_type = %candidate.meta.declared_type,
            "Loaded candidate"
        );
        candidates.push(candidate);
    }
    Ok(candidates)
}

/// Print the outcome in the requested format.
pub async fn report(outcome: &BatchOutcome, json: bool) -> Result<()> {
    if json {
        let mut accepted = Vec::with_capacity(outcome.accepted.len());
        for file in &outcome.accepted {
            let bytes = file
                .content
                .read_all()
                .await
                .with_context(|| format!("Failed to read file: {}", file.original_name))?;
            accepted.push(json!({
                "name": file.name,
                "original_name": file.original_name,
                "type": file.declared_type,
                "size": file.size,
                "sha3_256": sha3_hex(&bytes),
            }));
        }
        let body = json!({ "accepted": accepted, "errors": outcome.errors });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    println!();
    for file in &outcome.accepted {
        println!(
            "   {} {} {} {} {}",
            "✓".green().bold(),
            file.original_name,
            "->".dimmed(),
            file.name.green(),
            format!("({})", format_size(file.size)).dimmed()
        );
    }
    for error in &outcome.errors {
        println!("   {} {}", "✗".red().bold(), error.to_string().red());
    }
    println!();
    println!(
        "   {} {} accepted, {} rejected",
        "Summary:".dimmed(),
        outcome.accepted.len(),
        outcome.errors.len()
    );
    Ok(())
}

/// Turn refused files into the error that maps to the rejection exit code.
pub fn ensure_all_accepted(outcome: &BatchOutcome) -> Result<()> {
    if outcome.errors.is_empty() {
        return Ok(());
    }
    Err(Rejected {
        rejected: outcome.errors.len(),
        capacity_exceeded: outcome.capacity_exceeded(),
    }
    .into())
}

/// Execute the check command.
pub async fn execute(files: Vec<PathBuf>, args: PolicyArgs) -> Result<()> {
    let candidates = load_candidates(&files, &args).await?;
    let guard = UploadGuard::new(args.policy());

    let outcome = guard.process(candidates, 0).await;
    report(&outcome, args.json).await?;
    ensure_all_accepted(&outcome)
}
