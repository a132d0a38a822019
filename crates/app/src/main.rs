// Logging behavior:
// - Writes logs to both stderr and a daily-rotated file at logs/sync.log.
// - Default log level is INFO. Control via RUST_LOG:
//   * RUST_LOG=info                      # Standard logging (default)
//   * RUST_LOG=debug                     # Per-chapter windowing detail
//   * RUST_LOG=readalong_align=debug     # Fine-grained per-module control
// - The logs/ directory is created on startup if missing; file output uses
//   a non-blocking writer, mirroring the teacher's logging setup.
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use readalong_foundation::clock::{real_clock, Clock};
use readalong_foundation::progress::{ProgressEvent, ProgressSink};

mod config;
mod layout;
mod pipeline;

fn init_logging() -> std::io::Result<tracing_appender::non_blocking::WorkerGuard> {
    std::fs::create_dir_all("logs")?;
    let file_appender = RollingFileAppender::new(Rotation::DAILY, "logs", "sync.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = fmt::layer().with_writer(std::io::stderr);
    let file_layer = fmt::layer().with_writer(non_blocking_file).with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
    Ok(guard)
}

#[derive(Parser, Debug)]
#[command(name = "sync", author, version, about = "Read-along ebook synchronization engine")]
struct Cli {
    /// Book id: the directory name under --books-dir holding this book's
    /// text/audio/cache layout.
    book_id: String,

    /// Root directory containing one subdirectory per book.
    #[arg(long = "books-dir", default_value = "books")]
    books_dir: PathBuf,

    /// Optional TOML file overriding the default EngineConfig thresholds.
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Ignore the persisted sync cache and re-anchor every chapter.
    #[arg(long = "force-rescan")]
    force_rescan: bool,
}

struct StdoutProgress;

impl ProgressSink for StdoutProgress {
    fn report(&mut self, event: ProgressEvent) {
        match event {
            ProgressEvent::Chapter { index, total, fraction } => {
                println!("chapter {}/{} ({:.0}%)", index + 1, total, fraction * 100.0);
            }
            ProgressEvent::Diagnostic(diagnostic) => {
                println!("note: {diagnostic:?}");
            }
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let _log_guard = match init_logging() {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("failed to initialize logging: {err}");
            return ExitCode::FAILURE;
        }
    };

    let cli = Cli::parse();
    tracing::info!(book_id = %cli.book_id, "starting sync");

    let engine_config = match config::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("failed to load config: {err:#}");
            eprintln!("error: failed to load config: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    let book_layout = layout::BookLayout::new(&cli.books_dir, &cli.book_id);
    if !pipeline::book_dir_exists(&book_layout) {
        eprintln!(
            "error: book directory not found: {}",
            book_layout.book_dir.display()
        );
        return ExitCode::FAILURE;
    }

    let mut sink = StdoutProgress;
    let clock = real_clock();
    let started_at = clock.now();
    let result = tokio::task::spawn_blocking(move || {
        pipeline::run_book(&book_layout, &engine_config, cli.force_rescan, &mut sink)
    })
    .await;
    let elapsed = clock.now().duration_since(started_at);

    match result {
        Ok(Ok(())) => {
            tracing::info!(elapsed_secs = elapsed.as_secs_f64(), "sync completed");
            ExitCode::SUCCESS
        }
        Ok(Err(err)) => {
            tracing::error!("sync failed: {err:#}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
        Err(join_err) => {
            tracing::error!("sync task panicked: {join_err}");
            eprintln!("error: internal task failure: {join_err}");
            ExitCode::FAILURE
        }
    }
}
