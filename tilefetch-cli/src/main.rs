//! tilefetch CLI - Command-line interface
//!
//! Downloads the map tiles covering a bounding box across a zoom range into
//! a directory the DJI RC offline-map viewer can load.

mod error;
mod progress;
mod runner;
mod settings;

use std::path::PathBuf;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;

use tilefetch::coord::{BoundingBox, ZoomRange};
use tilefetch::fetch::TileFetcher;
use tilefetch::provider::{AsyncReqwestClient, TileSource};
use tilefetch::region::{RegionDownloader, RegionRequest, RunSummary};
use tilefetch::sink::DirectorySink;

use error::CliError;
use progress::{format_bytes, ProgressDisplay};
use runner::CliRunner;
use settings::{resolve_settings, Overrides, RunSettings};

const SD_CARD_PATH: &str = "<sdcard>/DJI_RC/Android/data/dji.go.v5/files/DJI/tiles/";

#[derive(Debug, Parser)]
#[command(name = "tilefetch", version)]
#[command(about = "Download offline map tiles for DJI RC controller")]
#[command(after_help = "\
Example:
  tilefetch --north 32.10 --south 32.07 --west 34.76 --east 34.80
  tilefetch -n 32.10 -s 32.07 -w 34.76 -e 34.80 --name \"Tel Aviv\" --workers 4

The downloaded tiles will be saved in the 'tiles' directory along with a
config.json file. Copy this directory to your DJI RC SD card at:
  <sdcard>/DJI_RC/Android/data/dji.go.v5/files/DJI/tiles/")]
struct Args {
    /// Northern latitude of bounding box (e.g., 32.10)
    #[arg(short, long, allow_hyphen_values = true)]
    north: f64,

    /// Southern latitude of bounding box (e.g., 32.07)
    #[arg(short, long, allow_hyphen_values = true)]
    south: f64,

    /// Western longitude of bounding box (e.g., 34.76)
    #[arg(short, long, allow_hyphen_values = true)]
    west: f64,

    /// Eastern longitude of bounding box (e.g., 34.80)
    #[arg(short, long, allow_hyphen_values = true)]
    east: f64,

    /// Name for the map region
    #[arg(long, default_value = "offline_map")]
    name: String,

    /// Minimum zoom level
    #[arg(long, default_value_t = 1)]
    min_zoom: u8,

    /// Maximum zoom level
    #[arg(long, default_value_t = 17)]
    max_zoom: u8,

    /// Output directory for tiles (recreated empty)
    #[arg(short, long, default_value = "tiles")]
    output: PathBuf,

    #[command(flatten)]
    overrides: Overrides,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

impl Args {
    /// Builds the validated region request.
    fn region(&self) -> Result<RegionRequest, CliError> {
        let bbox = BoundingBox::new(self.north, self.south, self.east, self.west);
        bbox.validate()?;
        let zooms = ZoomRange::new(self.min_zoom, self.max_zoom)?;
        Ok(RegionRequest::new(self.name.clone(), bbox, zooms))
    }
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        e.exit();
    }
}

fn run(args: Args) -> Result<(), CliError> {
    // Reject bad bounds before touching the output directory
    let request = args.region()?;

    let runner = CliRunner::with_debug(args.debug)?;
    runner.log_startup();

    let settings = resolve_settings(&args.overrides, runner.config())?;
    let display = ProgressDisplay::new(runner.interactive());

    let cancellation = CancellationToken::new();
    let cancel = cancellation.clone();
    ctrlc::set_handler(move || {
        if !cancel.is_cancelled() {
            eprintln!();
            eprintln!("Received interrupt, finishing in-flight downloads...");
            cancel.cancel();
        }
    })
    .map_err(|e| CliError::Setup(format!("Failed to set signal handler: {}", e)))?;

    println!("Region:   {} ({})", request.name, request.bbox);
    println!(
        "Zoom:     {} to {}",
        request.zooms.min(),
        request.zooms.max()
    );
    println!("Source:   {}", settings.source.name());
    println!("Workers:  {}", settings.fetcher.concurrency());
    println!("Output:   {}", args.output.display());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Setup(format!("Failed to start async runtime: {}", e)))?;

    let RunSettings { source, fetcher } = settings;
    let summary = runtime.block_on(async {
        let client = AsyncReqwestClient::with_timeout(fetcher.timeout_secs())?;
        let fetcher = TileFetcher::new(client, source, fetcher)?
            .with_cancellation(cancellation)
            .with_progress(display.progress_callback());
        let sink = DirectorySink::prepare(&args.output).await?;

        RegionDownloader::new(fetcher, sink)
            .with_level_callback(display.level_callback())
            .run(&request)
            .await
            .map_err(CliError::from)
    })?;

    report(&summary, &args.output)
}

/// Prints the final tally.
fn report(summary: &RunSummary, output: &std::path::Path) -> Result<(), CliError> {
    info!(
        succeeded = summary.total_succeeded(),
        requested = summary.total_requested(),
        bytes = summary.total_bytes(),
        "Run complete"
    );

    if summary.was_cancelled {
        return Err(CliError::Cancelled {
            succeeded: summary.total_succeeded(),
            requested: summary.total_requested(),
        });
    }

    println!();
    println!(
        "Downloaded {}/{} tiles ({}) in {:.1}s",
        summary.total_succeeded(),
        summary.total_requested(),
        format_bytes(summary.total_bytes()),
        summary.elapsed.as_secs_f64()
    );
    if !summary.is_complete() {
        println!(
            "{} tiles failed; see {} for details",
            summary.total_failed(),
            tilefetch::logging::default_log_dir()
                .join(tilefetch::logging::default_log_file())
                .display()
        );
    }

    println!();
    println!("Download complete! Tiles saved to '{}/'", output.display());
    println!(
        "Copy the '{}' directory to your DJI RC SD card at:",
        output.display()
    );
    println!("  {}", SD_CARD_PATH);
    Ok(())
}
