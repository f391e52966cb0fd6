//! Arrow dataset synthesis CLI
//!
//! Downloads background photographs, then composites rotated arrow sprites onto
//! them and writes the labeled dataset.

use super::config::CliConfigBuilder;
use crate::{
    assembler::DatasetAssembler,
    config::{DatasetConfig, DEFAULT_REPETITIONS, DEFAULT_SEED},
    download::BackgroundDownloader,
    error::SynthError,
    tracing_config::{events, TracingFormat},
};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{info, warn};
use std::time::Instant;
use tracing::debug;

/// Synthesize an arrow-direction dataset from backgrounds and arrow sprites
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "arrow-synth")]
pub struct Cli {
    /// Number of background images to download
    #[arg(long, default_value_t = 10)]
    pub n: usize,

    /// Composites generated per (background, arrow) pair
    #[arg(long, default_value_t = DEFAULT_REPETITIONS)]
    pub k: usize,

    /// Directory containing arrow sprites (must exist)
    #[arg(long, value_name = "DIR", default_value = "arrows")]
    pub arrow_dir: String,

    /// Directory for downloaded backgrounds (created if missing)
    #[arg(long, value_name = "DIR", default_value = "backgrounds")]
    pub background_dir: String,

    /// Directory for composites and labels.csv (created if missing)
    #[arg(long, value_name = "DIR", default_value = "dataset")]
    pub output_dir: String,

    /// Seed for the download order and every angle/placement draw
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Background resolution as WIDTHxHEIGHT
    #[arg(long, value_name = "WxH", default_value = "128x128")]
    pub image_size: String,

    /// Arrow sprite resolution as WIDTHxHEIGHT
    #[arg(long, value_name = "WxH", default_value = "32x32")]
    pub arrow_size: String,

    /// Output image format
    #[arg(short, long, value_enum, default_value_t = CliOutputFormat::Png)]
    pub format: CliOutputFormat,

    /// Use backgrounds already on disk without downloading
    #[arg(long)]
    pub skip_download: bool,

    /// Show a progress bar while compositing
    #[arg(long)]
    pub progress: bool,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE); RUST_LOG overrides this
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log line layout
    #[arg(long, value_enum, default_value_t = CliLogFormat::Console)]
    pub log_format: CliLogFormat,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum CliOutputFormat {
    Png,
    Jpeg,
    Tiff,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliLogFormat {
    Console,
    Compact,
}

impl From<CliLogFormat> for TracingFormat {
    fn from(format: CliLogFormat) -> Self {
        match format {
            CliLogFormat::Console => TracingFormat::Console,
            CliLogFormat::Compact => TracingFormat::Compact,
        }
    }
}

pub async fn main() -> Result<()> {
    let cli = Cli::parse();

    crate::tracing_config::init_cli_tracing(cli.verbose, cli.log_format.into())
        .context("Failed to initialize tracing")?;

    info!("Starting arrow dataset synthesis");
    info!(
        "n={}, k={}, seed={}, arrow_dir={}, background_dir={}, output_dir={}",
        cli.n, cli.k, cli.seed, cli.arrow_dir, cli.background_dir, cli.output_dir
    );

    CliConfigBuilder::validate_cli(&cli).context("Invalid CLI arguments")?;
    let config = CliConfigBuilder::from_cli(&cli).context("Failed to build configuration")?;
    debug!(?config, "Configuration resolved");

    setup_directories(&config).context("Failed to prepare directories")?;

    if cli.skip_download || cli.n == 0 {
        info!("Skipping background download");
    } else {
        download_backgrounds(&config, cli.n).await;
    }

    let start_time = Instant::now();
    let assembler = DatasetAssembler::new(config).context("Failed to create dataset assembler")?;
    let summary = assembler
        .assemble_and_save_dataset()
        .context("Failed to assemble dataset")?;

    info!(
        "Wrote {} composite(s) from {} background(s) and {} arrow(s) in {:.2}s",
        summary.composites,
        summary.backgrounds,
        summary.arrows,
        start_time.elapsed().as_secs_f64()
    );
    info!("Labels: {}", summary.manifest_path.display());

    Ok(())
}

/// Arrow directory must exist; background and output directories are created
fn setup_directories(config: &DatasetConfig) -> crate::error::Result<()> {
    if !config.arrow_dir.is_dir() {
        return Err(SynthError::directory_not_found(&config.arrow_dir));
    }

    for directory in [&config.background_dir, &config.output_dir] {
        std::fs::create_dir_all(directory)
            .map_err(|e| SynthError::file_io_error("create directory", directory, &e))?;
    }

    Ok(())
}

/// Download failures are not fatal; assembly continues with what is on disk
async fn download_backgrounds(config: &DatasetConfig, n: usize) {
    let downloader = match BackgroundDownloader::red_caps(config.seed) {
        Ok(downloader) => downloader,
        Err(e) => {
            events::error_with_context(&e, "creating background downloader");
            return;
        },
    };

    match downloader
        .download_background_images(&config.background_dir, n)
        .await
    {
        Ok(summary) => {
            info!(
                "Backgrounds: {} downloaded, {} already present, {} skipped",
                summary.downloaded, summary.existing, summary.skipped
            );
        },
        Err(e) => {
            warn!("Background download failed: {}", e);
            events::warning_with_recommendation(
                "continuing with backgrounds already on disk",
                "rerun later or pass --skip-download",
            );
        },
    }
}
