//! Equipment command implementation.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use docguard_core::parse_equipment;

/// Execute the equipment command.
pub fn execute(file: Option<PathBuf>, json: bool) -> Result<()> {
    let text = match &file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    let list = parse_equipment(&text);

    if json {
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    for (category, items) in &list.categories {
        println!("{}", category.label().bold());
        for item in items {
            println!("   • {item}");
        }
    }
    if !list.unmatched.is_empty() {
        println!("{}", "Non reconnu".dimmed());
        for fragment in &list.unmatched {
            println!("   • {}", fragment.dimmed());
        }
    }
    Ok(())
}
