//! Command-line upload widget.
//!
//! Submits the given files, then redraws job rows as the server reports
//! progress until every job is finished.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use log::{info, warn};
use tokio::sync::watch;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

use docsearch_upload::config::{finalize_config, load_or_default};
use docsearch_upload::sanitize::{redact_path, redact_url};
use docsearch_upload::{JobListView, JobStatus, UploadFile, UploadTracker};

const EXIT_SUCCESS: u8 = 0;
/// Some job ended `failed`, or a file was unreadable or rejected.
const EXIT_FAILED: u8 = 1;
/// `--max-wait` expired with jobs still in flight.
const EXIT_TIMED_OUT: u8 = 2;
const EXIT_INTERRUPTED: u8 = 130;

/// Picks the process exit code. Ctrl-C wins over a timeout, and a timeout
/// wins over failed or rejected uploads.
fn exit_code(interrupted: bool, timed_out: bool, failed: usize, rejected: usize) -> u8 {
    if interrupted {
        EXIT_INTERRUPTED
    } else if timed_out {
        EXIT_TIMED_OUT
    } else if failed > 0 || rejected > 0 {
        EXIT_FAILED
    } else {
        EXIT_SUCCESS
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "docsearch-upload",
    version,
    about = "Upload documents and follow their ingestion status"
)]
struct Args {
    /// Config file (defaults to <config dir>/docsearch-upload/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long)]
    api_url: Option<String>,

    /// Override the status poll interval in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Give up after this many seconds if jobs are still unfinished
    #[arg(long)]
    max_wait: Option<u64>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Files to upload
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn init_logging(json: bool) -> anyhow::Result<()> {
    tracing_log::LogTracer::init().context("Failed to bridge log records")?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("docsearch_upload=info"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        tracing::subscriber::set_global_default(
            registry.with(fmt::layer().json().with_writer(std::io::stderr)),
        )
    } else {
        tracing::subscriber::set_global_default(
            registry.with(fmt::layer().with_target(false).with_writer(std::io::stderr)),
        )
    }
    .context("Failed to install tracing subscriber")
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging(args.json_logs) {
        eprintln!("warning: {:#}", e);
    }

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<ExitCode> {
    let mut config =
        load_or_default(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(url) = args.api_url {
        config.api_base_url = url;
    }
    if let Some(ms) = args.interval_ms {
        config.poll_interval_ms = ms;
    }
    let config = finalize_config(config).context("Invalid command-line override")?;

    info!(
        "docsearch-upload v{} using {} (poll every {}ms)",
        env!("CARGO_PKG_VERSION"),
        redact_url(&config.api_base_url),
        config.poll_interval_ms
    );

    let (stop_tx, mut stop_rx) = watch::channel(false);
    ctrlc::set_handler(move || {
        let _ = stop_tx.send(true);
    })
    .context("Failed to install Ctrl-C handler")?;

    let mut rejected = 0usize;
    let mut files = Vec::with_capacity(args.files.len());
    for path in &args.files {
        match UploadFile::from_path(path).await {
            Ok(file) => files.push(file),
            Err(e) => {
                warn!("Skipping {}: {}", redact_path(path), e);
                eprintln!("{}", e);
                rejected += 1;
            }
        }
    }

    let tracker = UploadTracker::mount(&config)?;
    let mut changes = tracker.store().subscribe();
    let mut view = JobListView::new();
    let mut last_notice: Option<String> = None;

    let mut timed_out = false;
    let mut interrupted = false;
    {
        let submissions = tracker.submit_all(files);
        tokio::pin!(submissions);
        let deadline = tokio::time::sleep(Duration::from_secs(args.max_wait.unwrap_or(0)));
        tokio::pin!(deadline);
        let mut submitted = false;

        loop {
            tokio::select! {
                results = &mut submissions, if !submitted => {
                    submitted = true;
                    for err in results.into_iter().filter_map(Result::err) {
                        rejected += 1;
                        eprintln!("{}: {}", err.filename().unwrap_or("(no file)"), err);
                    }
                }
                res = changes.changed() => {
                    if res.is_err() {
                        break;
                    }
                }
                _ = stop_rx.changed() => {
                    interrupted = true;
                    break;
                }
                _ = &mut deadline, if args.max_wait.is_some() => {
                    timed_out = true;
                    break;
                }
            }

            let _ = changes.borrow_and_update();
            for row in view.render(&tracker.jobs()).changed {
                println!("{}", row);
            }
            let notice = tracker.notice().message();
            if notice.is_some() && notice != last_notice {
                if let Some(message) = &notice {
                    eprintln!("! {}", message);
                }
            }
            last_notice = notice;

            if submitted && !tracker.store().has_unfinished() {
                break;
            }
        }
    }

    let jobs = tracker.jobs();
    let failed = jobs
        .iter()
        .filter(|job| job.status == JobStatus::Failed)
        .count();
    let unfinished = jobs.iter().filter(|job| !job.is_finished()).count();
    tracker.unmount().await;

    println!(
        "{} job(s): {} completed, {} failed, {} unfinished, {} rejected",
        jobs.len(),
        jobs.iter()
            .filter(|job| job.status == JobStatus::Completed)
            .count(),
        failed,
        unfinished,
        rejected
    );

    if timed_out && !interrupted {
        warn!("Gave up waiting with {} job(s) unfinished", unfinished);
    }
    let code = exit_code(interrupted, timed_out, failed, rejected);
    Ok(ExitCode::from(code))
}
