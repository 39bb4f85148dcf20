//! buoy-capture
//!
//! Capture the Lake Maurepas buoy dashboard as timestamped PNG/PDF files.

use anyhow::Context;
use buoy_capture::{CaptureConfig, CaptureMode, PageCaptureJob};
use clap::Parser;
use std::path::PathBuf;

/// Lake Maurepas buoy dashboard capture
#[derive(Parser, Debug)]
#[command(name = "buoy-capture")]
#[command(version)]
#[command(about = "Save the buoy dashboard as timestamped PNG/PDF files")]
struct Args {
    /// Directory that receives the captures
    #[arg(short, long, default_value = "captures")]
    out_dir: PathBuf,

    /// Page to capture
    #[arg(long, default_value = buoy_capture::config::DEFAULT_URL)]
    url: String,

    /// Which artifacts to produce
    #[arg(short, long, value_enum, default_value_t = CaptureMode::PngWithPdfFallback)]
    mode: CaptureMode,

    /// Path to Chrome/Chromium executable
    #[arg(long)]
    chrome_path: Option<String>,

    /// Show the browser window
    #[arg(long)]
    headful: bool,

    /// Print the capture result as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = if args.verbose { "debug" } else { "info" };

    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut builder = CaptureConfig::builder()
        .out_dir(args.out_dir)
        .url(args.url)
        .mode(args.mode)
        .headless(!args.headful);
    if let Some(path) = args.chrome_path {
        builder = builder.chrome_path(path);
    }

    let job = PageCaptureJob::new(builder.build());
    let result = job.run().await.context("buoy capture failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        for path in result.paths() {
            println!("{}", path.display());
        }
    }

    Ok(())
}
