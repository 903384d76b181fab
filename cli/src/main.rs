//! cpm - copy with explicit conflict handling
//!
//! A file/directory copy command powered by the cpm library.

use clap::{Parser, ValueEnum};
use cpm::{
    ConflictPolicy, CopyFailure, CopyOptions, CopyResult, CopyState, DEFAULT_BUFFER_SIZE,
    DEFAULT_MAX_WORKERS, ErrorCode, copy, inspect,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Value, json};
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// cpm - copy files and directories
///
/// Existing files are never replaced silently: every run uses one conflict
/// policy (rename, overwrite or ignore). Large files are copied with several
/// concurrent workers.
///
/// Usage:
///   cpm SOURCE DEST
///   cpm SOURCE DIRECTORY/
#[derive(Parser, Debug)]
#[command(name = "cpm", version, about, long_about = None)]
struct Args {
    /// Source file or directory
    source: PathBuf,

    /// Destination path
    ///
    /// A trailing '/' copies the source into that directory.
    dest: PathBuf,

    /// Conflict policy: rename (r), overwrite (o) or ignore (i)
    ///
    /// When omitted and a conflict exists, you are asked once if stdin is a
    /// terminal. Otherwise conflicting files are renamed.
    #[arg(short = 'c', long, value_name = "POLICY")]
    on_conflict: Option<ConflictPolicy>,

    /// Maximum number of concurrent copy workers
    #[arg(short = 'j', long, default_value_t = DEFAULT_MAX_WORKERS)]
    jobs: usize,

    /// Buffer size per worker, in bytes
    #[arg(long, default_value_t = DEFAULT_BUFFER_SIZE)]
    buffer_size: usize,

    /// Do not call fsync after each file (faster but less safe)
    #[arg(long)]
    no_sync: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    output: OutputMode,

    /// Disable spinner and warnings
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Verbose output
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
enum CliError {
    #[error("Failed to read conflict policy from stdin: {source}")]
    Prompt { source: io::Error },

    #[error("Failed to serialize JSON output: {source}")]
    JsonSerialize { source: serde_json::Error },
}

impl CliError {
    fn code(&self) -> ErrorCode {
        match self {
            Self::Prompt { .. } => ErrorCode::IoError,
            Self::JsonSerialize { .. } => ErrorCode::Internal,
        }
    }
}

fn exit_code_for(state: CopyState) -> i32 {
    match state {
        CopyState::Completed => 0,
        CopyState::PartiallyFailed | CopyState::Failed => 1,
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.quiet, args.verbose);

    match run(&args) {
        Ok(state) => std::process::exit(exit_code_for(state)),
        Err(error) => {
            eprintln!("error[{}]: {}", error.code(), error);
            std::process::exit(1);
        }
    }
}

fn init_logging(quiet: bool, verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(args: &Args) -> CliResult<CopyState> {
    let policy = match args.on_conflict {
        Some(policy) => policy,
        None => choose_policy(&args.source, &args.dest)?,
    };

    let mut options = CopyOptions::default()
        .with_on_conflict(policy)
        .with_max_workers(args.jobs)
        .with_buffer_size(args.buffer_size);
    if args.no_sync {
        options = options.without_fsync();
    }

    tracing::debug!(
        policy = policy.as_str(),
        workers = options.max_workers,
        buffer_size = options.buffer_size,
        fsync = options.fsync,
        "effective configuration"
    );

    let pb = if args.output == OutputMode::Human && !args.quiet && io::stderr().is_terminal() {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner().template("{spinner:.green} {msg}");
        if let Ok(style) = style {
            pb.set_style(style);
            pb.enable_steady_tick(Duration::from_millis(100));
            pb.set_message(format!("Copying {}...", args.source.display()));
            Some(pb)
        } else {
            None
        }
    } else {
        None
    };

    let result = copy(&args.source, &args.dest, &options);

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    match args.output {
        OutputMode::Human => {
            print_failures(&result.failures);
            if result.state != CopyState::Failed {
                print_stats(&result, args.verbose);
            }
        }
        OutputMode::Json => print_json_value(&result_to_json(&result, policy))?,
    }

    Ok(result.state)
}

/// Pick a policy when none was given on the command line.
///
/// Asks once, and only when the request actually conflicts and stdin is a
/// terminal. Everything else falls back to renaming.
fn choose_policy(source: &Path, dest: &Path) -> CliResult<ConflictPolicy> {
    let needs_policy = inspect(source, dest).is_ok_and(|request| request.needs_policy());
    if !needs_policy || !io::stdin().is_terminal() {
        return Ok(ConflictPolicy::default());
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    loop {
        eprint!("Destination exists. Rename, overwrite or ignore? [R(r)/O(o)/I(i)] ");
        io::stderr()
            .flush()
            .map_err(|source| CliError::Prompt { source })?;

        let mut line = String::new();
        let read = input
            .read_line(&mut line)
            .map_err(|source| CliError::Prompt { source })?;
        if read == 0 {
            return Ok(ConflictPolicy::default());
        }
        match line.parse::<ConflictPolicy>() {
            Ok(policy) => return Ok(policy),
            Err(message) => eprintln!("{message}"),
        }
    }
}

fn print_failures(failures: &[CopyFailure]) {
    for failure in failures {
        eprintln!(
            "error[{}]: {}: {}",
            failure.error.code(),
            failure.path.display(),
            failure.error
        );
    }
}

fn print_stats(result: &CopyResult, verbose: bool) {
    if result.files_copied == 0 && result.dirs_created == 0 {
        if result.files_skipped > 0 {
            println!(
                "Nothing to copy ({} files already exist)",
                result.files_skipped
            );
        } else if result.failures.is_empty() {
            println!("Nothing to copy");
        }
        return;
    }

    let bytes_str = format_bytes(result.bytes_copied);

    if verbose {
        println!("Copy {} in {:?}", result.state.as_str(), result.duration);
        if let Some(destination) = &result.destination {
            println!("  Destination:    {}", destination.display());
        }
        println!("  Files copied:   {}", result.files_copied);
        println!("  Files skipped:  {}", result.files_skipped);
        println!("  Directories:    {}", result.dirs_created);
        println!("  Failures:       {}", result.failures.len());
        println!("  Total size:     {}", bytes_str);

        if result.duration.as_secs_f64() > 0.0 {
            let speed = result.bytes_copied as f64 / result.duration.as_secs_f64();
            println!("  Speed:          {}/s", format_bytes(speed as u64));
        }
    } else {
        let mut parts = vec![];
        if result.files_copied > 0 {
            parts.push(format!("{} files", result.files_copied));
        }
        if result.dirs_created > 0 {
            parts.push(format!("{} dirs", result.dirs_created));
        }
        if result.files_skipped > 0 {
            parts.push(format!("{} skipped", result.files_skipped));
        }
        println!("Copied {} ({})", parts.join(", "), bytes_str);
    }
}

fn failure_to_json(failure: &CopyFailure) -> Value {
    json!({
        "path": display_path(&failure.path),
        "code": failure.error.code().as_str(),
        "message": failure.error.to_string(),
        "offset": failure.offset(),
    })
}

fn result_to_json(result: &CopyResult, policy: ConflictPolicy) -> Value {
    json!({
        "state": result.state.as_str(),
        "source": display_path(&result.source),
        "destination": result.destination.as_deref().map(display_path),
        "conflict_policy": policy.as_str(),
        "files_copied": result.files_copied,
        "files_skipped": result.files_skipped,
        "dirs_created": result.dirs_created,
        "bytes_copied": result.bytes_copied,
        "duration_ms": result.duration.as_millis() as u64,
        "failures": result.failures.iter().map(failure_to_json).collect::<Vec<_>>(),
    })
}

fn print_json_value(value: &Value) -> CliResult<()> {
    let serialized =
        serde_json::to_string(value).map_err(|source| CliError::JsonSerialize { source })?;
    println!("{serialized}");
    Ok(())
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
