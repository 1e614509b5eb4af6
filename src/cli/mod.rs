//! # CLI Module
//!
//! Command-line interface for the photo archiver.
//!
//! ## Usage
//! ```bash
//! # Archive the configured default directories
//! photo-archive
//!
//! # Archive specific directories
//! photo-archive ~/Downloads/camera /media/sdcard
//!
//! # Archive under another identity
//! photo-archive --user alice ~/Phone
//! ```

use clap::Parser;
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use photo_archiver::core::config::{expand_tilde, load_settings};
use photo_archiver::core::engine::EngineBuilder;
use photo_archiver::core::media::MediaKind;
use photo_archiver::error::Result;
use photo_archiver::events::{Event, EventChannel, FileEvent, RunEvent, RunSummary, ScanEvent};
use std::path::{Path, PathBuf};
use std::thread;

/// Photo Archiver - Sort photos and videos into a dated archive
#[derive(Parser, Debug)]
#[command(name = "photo-archive")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directories to archive (defaults to `[input] default_directories`)
    directories: Vec<String>,

    /// Identity used in naming and bucketing
    #[arg(long)]
    user: Option<String>,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = load_settings()?;
    if let Some(user) = cli.user {
        settings = settings.with_user(user);
    }
    photo_archiver::init_tracing(settings.log_file.as_deref())?;

    let term = Term::stderr();
    let roots: Vec<PathBuf> = if cli.directories.is_empty() {
        settings.default_directories.clone()
    } else {
        cli.directories.iter().map(|d| expand_tilde(d)).collect()
    };
    if roots.is_empty() {
        term.write_line(&format!(
            "{} No input directories given and none configured in [input] default_directories",
            style("!").yellow().bold()
        ))
        .ok();
        return Ok(());
    }

    let engine = EngineBuilder::from_settings(&settings).build()?;

    term.write_line(&format!(
        "{} {}",
        style("Photo Archiver").bold().cyan(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim()
    ))
    .ok();
    term.write_line(&format!(
        "  {} {}",
        style("Archive:").dim(),
        display_path(engine.output_dir())
    ))
    .ok();
    term.write_line("").ok();

    let (sender, receiver) = EventChannel::new();

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map(|s| s.progress_chars("█▓░"))
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    let progress = pb.clone();

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        let mut kind = MediaKind::Unrecognized;
        for event in receiver.iter() {
            match event {
                Event::Scan(ScanEvent::Started { root }) => {
                    progress.set_message(display_path(&root));
                }
                Event::Scan(ScanEvent::Completed { files, .. }) => {
                    progress.inc_length(files as u64);
                }
                Event::Scan(ScanEvent::RootMissing { root }) => {
                    progress.println(format!(
                        "{} {} does not exist",
                        style("!").yellow().bold(),
                        display_path(&root)
                    ));
                }
                Event::File(FileEvent::Classified { kind: k, .. }) => {
                    kind = k;
                }
                Event::File(file_event) => {
                    progress.inc(1);
                    progress.println(describe(&file_event, kind));
                }
                Event::Run(RunEvent::Completed { .. }) => {
                    progress.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let result = engine.run(&roots, &sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();
    pb.finish_and_clear();

    let summary = result?;
    print_summary(&term, &summary);

    Ok(())
}

/// One line per processed file: `|- <name> (<kind>) -> <outcome>`
fn describe(event: &FileEvent, kind: MediaKind) -> String {
    let (path, outcome) = match event {
        FileEvent::Archived {
            source,
            destination,
        } => (
            source,
            style(format!("archived as {}", display_path(destination)))
                .green()
                .to_string(),
        ),
        FileEvent::Duplicate { source, existing } => (
            source,
            style(format!("duplicate of {}", display_path(existing)))
                .yellow()
                .to_string(),
        ),
        FileEvent::Ignored { path, mime } => (
            path,
            style(format!("ignored ({})", mime.as_deref().unwrap_or("unknown type")))
                .dim()
                .to_string(),
        ),
        FileEvent::Failed { path, message } => {
            (path, style(format!("failed: {}", message)).red().to_string())
        }
        FileEvent::Classified { path, .. } => (path, String::new()),
    };

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    format!("|- {} ({}) -> {}", name, kind, outcome)
}

fn print_summary(term: &Term, summary: &RunSummary) {
    term.write_line("").ok();
    term.write_line(&format!("{} Archive Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} files processed",
        style(summary.total_files()).cyan()
    ))
    .ok();
    term.write_line(&format!("  {} archived", style(summary.archived).cyan()))
        .ok();
    term.write_line(&format!(
        "  {} duplicates skipped",
        style(summary.duplicates).cyan()
    ))
    .ok();
    term.write_line(&format!("  {} ignored", style(summary.ignored).dim()))
        .ok();
    if summary.failed > 0 {
        term.write_line(&format!("  {} failed", style(summary.failed).red()))
            .ok();
    }
    if summary.roots_missing > 0 {
        term.write_line(&format!(
            "  {} input directories missing",
            style(summary.roots_missing).yellow()
        ))
        .ok();
    }

    term.write_line("").ok();
    term.write_line(&format!(
        "Finished in {:.1} s",
        summary.duration_ms as f64 / 1000.0
    ))
    .ok();
}

/// Show paths under the home directory as `~/...`
fn display_path(path: &Path) -> String {
    dirs::home_dir()
        .and_then(|home| path.strip_prefix(home).ok().map(Path::to_path_buf))
        .map(|rest| format!("~/{}", rest.display()))
        .unwrap_or_else(|| path.display().to_string())
}
