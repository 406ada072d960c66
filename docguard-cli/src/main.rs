//! Docguard CLI - upload security checks for documents and photos.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use docguard_core::{UploadPolicy, DEFAULT_MAX_FILES, DEFAULT_MAX_SIZE_MIB};
use tracing_subscriber::EnvFilter;

mod commands;
mod exit_codes;
mod utils;

use exit_codes::ExitCode;

const EXIT_CODES_HELP: &str = "\
Exit codes:
  0   All files accepted
  1   General error
  64  Usage error
  65  One or more files rejected, or too many files
  66  Input file missing or unreadable
  74  Could not write output";

#[derive(Parser)]
#[command(name = "docguard")]
#[command(author, version, about = "Upload security checks for documents and photos", long_about = None)]
#[command(after_help = EXIT_CODES_HELP)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by `check` and `accept`.
#[derive(Args, Debug, Clone)]
pub struct PolicyArgs {
    /// Maximum number of files the zone may hold
    #[arg(long, default_value_t = DEFAULT_MAX_FILES)]
    pub max_files: usize,

    /// Per-file size ceiling in MiB
    #[arg(long = "max-size-mb", default_value_t = DEFAULT_MAX_SIZE_MIB)]
    pub max_size_mb: u64,

    /// Base name forced onto every accepted file (e.g. piece-identite)
    #[arg(long = "name", value_name = "BASE")]
    pub custom_name: Option<String>,

    /// Declared MIME type for every file (guessed from the extension if omitted)
    #[arg(long = "type", value_name = "MIME")]
    pub declared_type: Option<String>,

    /// Restrict accepted types (repeatable), e.g. `image/*` or `application/pdf`
    #[arg(long = "accept", value_name = "PATTERN")]
    pub accept: Vec<String>,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

impl PolicyArgs {
    pub fn policy(&self) -> UploadPolicy {
        let policy = UploadPolicy::default()
            .with_max_files(self.max_files)
            .with_max_size_mib(self.max_size_mb)
            .with_accepted_patterns(self.accept.iter().cloned());

        match &self.custom_name {
            Some(name) => policy.with_custom_base_name(name.as_str()),
            None => policy,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the security checks on files and show their canonical names
    Check {
        /// Files to check, in submission order
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// Check files and copy the accepted ones under their canonical names
    Accept {
        /// Files to check, in submission order
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Destination directory; files already there count against --max-files
        #[arg(long, value_name = "DIR")]
        out_dir: PathBuf,

        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// Translate a German equipment list into categorized French labels
    Equipment {
        /// Text file to read (stdin if omitted)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() {
                exit_codes::USAGE_ERROR
            } else {
                exit_codes::SUCCESS
            };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Check { files, policy } => commands::check::execute(files, policy).await,
        Commands::Accept {
            files,
            out_dir,
            policy,
        } => commands::accept::execute(files, out_dir, policy).await,
        Commands::Equipment { file, json } => commands::equipment::execute(file, json),
    };

    let exit = match result {
        Ok(()) => ExitCode::success(),
        Err(err) => ExitCode::from_anyhow(&err),
    };

    if let Some(message) = &exit.message {
        eprintln!("{} {}", "Error:".red().bold(), message);
    }
    std::process::exit(exit.code);
}
