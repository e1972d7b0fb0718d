//! # CLI Module
//!
//! Command-line front end for the media deduper.
//!
//! ## Usage
//! ```bash
//! # Deduplicate a folder tree (prompts for the folder when omitted)
//! dedupe ~/Pictures
//!
//! # Only the top-level folder, only some extensions
//! dedupe ~/Pictures --top-level-only --extensions jpg,png
//!
//! # JSON report for scripting
//! dedupe ~/Pictures --output json
//! ```

use clap::{Parser, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use media_deduper::core::hasher::DigestAlgorithm;
use media_deduper::core::pipeline::{ErrorPolicy, HashingMode, Pipeline};
use media_deduper::core::quarantine::QuarantineCreation;
use media_deduper::core::report::RunReport;
use media_deduper::core::scanner::DEFAULT_EXTENSIONS;
use media_deduper::events::{Event, EventChannel, HashEvent, PipelineEvent, QuarantineEvent, ScanEvent};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;

/// Media Deduper - move byte-identical duplicates into a dated quarantine folder
#[derive(Parser, Debug)]
#[command(name = "dedupe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Folder to deduplicate (prompted for when omitted)
    root: Option<PathBuf>,

    /// Only look at files directly inside the folder
    #[arg(long)]
    top_level_only: bool,

    /// Extensions to include, comma separated (default: gif,jpg,jpeg,img,png,avi,mp4,mov)
    #[arg(short, long, value_delimiter = ',')]
    extensions: Vec<String>,

    /// Digest used to compare file contents
    #[arg(short, long, default_value = "sha1")]
    algorithm: Algorithm,

    /// Hash one file at a time instead of in parallel
    #[arg(long)]
    sequential: bool,

    /// Create the quarantine folder even when no duplicates are found
    #[arg(long)]
    eager_quarantine: bool,

    /// Stop at the first unreadable or unmovable file
    #[arg(long)]
    fail_fast: bool,

    /// Skip hidden files and folders
    #[arg(long)]
    skip_hidden: bool,

    /// Output format
    #[arg(short, long, default_value = "pretty")]
    output: OutputFormat,

    /// List every distinct file and every move
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Algorithm {
    /// SHA-1, 160-bit (default)
    Sha1,
    /// SHA-256
    Sha256,
    /// BLAKE3, fastest on large files
    Blake3,
}

impl From<Algorithm> for DigestAlgorithm {
    fn from(algo: Algorithm) -> Self {
        match algo {
            Algorithm::Sha1 => DigestAlgorithm::Sha1,
            Algorithm::Sha256 => DigestAlgorithm::Sha256,
            Algorithm::Blake3 => DigestAlgorithm::Blake3,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON report for scripting
    Json,
    /// Relocated paths only
    Minimal,
}

/// Run the CLI and map the outcome to an exit code
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let term = Term::stderr();

    let root = match cli.root.clone() {
        Some(root) => root,
        None => match prompt_for_root() {
            Ok(root) => root,
            Err(e) => {
                term.write_line(&format!("{} {}", style("error:").red().bold(), e))
                    .ok();
                return ExitCode::FAILURE;
            }
        },
    };

    match run_dedupe(&cli, root, &term) {
        Ok(report) => {
            match cli.output {
                OutputFormat::Pretty => print_pretty_results(&term, &report, cli.verbose),
                OutputFormat::Json => print_json_results(&report),
                OutputFormat::Minimal => print_minimal_results(&report),
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            term.write_line(&format!("{} {}", style("error:").red().bold(), e))
                .ok();
            ExitCode::FAILURE
        }
    }
}

fn prompt_for_root() -> std::io::Result<PathBuf> {
    let term = Term::stdout();
    term.write_str("Enter the folder path to start: ")?;
    let line = term.read_line()?;
    Ok(PathBuf::from(line.trim()))
}

fn run_dedupe(cli: &Cli, root: PathBuf, term: &Term) -> media_deduper::Result<RunReport> {
    let pretty = matches!(cli.output, OutputFormat::Pretty);

    if pretty {
        term.write_line(&format!(
            "{} {}",
            style("Media Deduper").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let extensions: Vec<String> = if cli.extensions.is_empty() {
        DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
    } else {
        cli.extensions.clone()
    };

    let pipeline = Pipeline::builder()
        .root(root)
        .recursive(!cli.top_level_only)
        .extensions(extensions)
        .algorithm(cli.algorithm.into())
        .hashing(if cli.sequential {
            HashingMode::Sequential
        } else {
            HashingMode::Parallel
        })
        .quarantine(if cli.eager_quarantine {
            QuarantineCreation::Eager
        } else {
            QuarantineCreation::Lazy
        })
        .error_policy(if cli.fail_fast {
            ErrorPolicy::Abort
        } else {
            ErrorPolicy::Continue
        })
        .include_hidden(!cli.skip_hidden)
        .build();

    let (sender, receiver) = EventChannel::new();

    let progress = if pretty {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .map(|s| s.progress_chars("█▓░"))
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();
    let verbose = cli.verbose;

    let event_thread = thread::spawn(move || {
        let Some(pb) = progress_clone else {
            // Drain so the sender never backs up.
            for _ in receiver.iter() {}
            return;
        };

        for event in receiver.iter() {
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    pb.set_message(format!("{}", phase));
                }
                Event::Scan(ScanEvent::Completed { total_candidates }) => {
                    pb.set_length(total_candidates as u64);
                }
                Event::Hash(HashEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                }
                Event::Quarantine(QuarantineEvent::Relocated { to, .. }) if verbose => {
                    pb.println(format!("Moving to path: {}", display_path(&to)));
                }
                Event::Pipeline(PipelineEvent::Completed { .. })
                | Event::Pipeline(PipelineEvent::Error { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let result = pipeline.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();

    result
}

fn print_pretty_results(term: &Term, report: &RunReport, verbose: bool) {
    term.write_line(&format!("{} Run Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} files scanned in {:.1}s",
        style(report.files_scanned).cyan(),
        report.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line(&format!(
        "  {} distinct files",
        style(report.distinct_files()).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  {} duplicates moved",
        style(report.duplicates_relocated).cyan()
    ))
    .ok();

    if let Some(folder) = &report.quarantine_dir {
        term.write_line(&format!(
            "  quarantine folder: {}",
            style(display_path(folder)).yellow()
        ))
        .ok();
    }

    if !report.is_clean() {
        term.write_line(&format!(
            "  {} files could not be processed",
            style(report.error_count()).red()
        ))
        .ok();
    }

    term.write_line("").ok();

    if verbose {
        term.write_line(&format!(
            "The following {} file(s) were determined to be distinct.",
            report.distinct_files()
        ))
        .ok();
        for (identity, path) in &report.canonical {
            term.write_line(&format!("  {} - {}", style(identity).dim(), display_path(path)))
                .ok();
        }
        term.write_line("").ok();
    }

    if report.relocations.is_empty() {
        term.write_line("  No duplicates found.").ok();
    } else {
        term.write_line(&format!("{}", style("Moved:").bold().underlined()))
            .ok();
        for relocation in &report.relocations {
            term.write_line(&format!(
                "  {} {} {}",
                display_path(&relocation.from),
                style("→").dim(),
                display_path(&relocation.to)
            ))
            .ok();
        }
    }

    if !report.is_clean() {
        term.write_line("").ok();
        term.write_line(&format!("{}", style("Errors:").bold().underlined()))
            .ok();
        for error in &report.errors {
            term.write_line(&format!("  [{}] {}", style(error.kind).red(), error.message))
                .ok();
        }
    }

    term.write_line("").ok();
    term.write_line(&format!(
        "{}",
        style("No files were deleted. Duplicates can be restored from the quarantine folder.").dim()
    ))
    .ok();
}

fn print_json_results(report: &RunReport) {
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("failed to serialize report: {}", e),
    }
}

fn print_minimal_results(report: &RunReport) {
    for relocation in &report.relocations {
        println!("{}", relocation.from.display());
    }
}

/// Shorten paths under the home directory to `~/...`
fn display_path(path: &Path) -> String {
    match dirs::home_dir().and_then(|home| path.strip_prefix(home).ok().map(Path::to_path_buf)) {
        Some(relative) => format!("~/{}", relative.display()),
        None => path.display().to_string(),
    }
}
