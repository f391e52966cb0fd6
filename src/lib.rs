#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::unused_async)]

//! # Arrow Dataset Synthesis Library
//!
//! Generates a labeled image dataset for arrow-orientation classifiers by
//! compositing rotated arrow sprites onto background photographs.
//!
//! For every (background, arrow) pair, `k` composites are produced. Each one
//! rotates the sprite by one of eight compass angles, places it at a random
//! offset, and is labeled with the matching [`Direction`]. Composites are
//! written to the output directory next to a `labels.csv` manifest.
//!
//! ## Features
//!
//! - **Deterministic**: one seed drives every angle and placement draw, so
//!   reruns on the same inputs produce identical files
//! - **Unique labels**: sample identifiers are checked before anything is written
//! - **Background download**: best-effort sampling of RedCaps photographs
//! - **CLI Integration**: optional `arrow-synth` binary (enable with `cli` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use arrow_synth::{DatasetAssembler, DatasetConfig};
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = DatasetConfig::builder()
//!     .arrow_dir("arrows")
//!     .background_dir("backgrounds")
//!     .output_dir("dataset")
//!     .k(4)
//!     .seed(42)
//!     .build()?;
//!
//! let summary = DatasetAssembler::new(config)?.assemble_and_save_dataset()?;
//! println!("{} composites, labels in {}", summary.composites, summary.manifest_path.display());
//! # Ok(())
//! # }
//! ```
//!
//! ## Downloading backgrounds
//!
//! ```rust,no_run
//! use arrow_synth::BackgroundDownloader;
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let downloader = BackgroundDownloader::red_caps(42)?;
//! let summary = downloader
//!     .download_background_images(Path::new("backgrounds"), 10)
//!     .await?;
//! println!("{} of {} backgrounds available", summary.obtained, summary.requested);
//! # Ok(())
//! # }
//! ```
//!
//! ### Feature Flags
//!
//! - `cli` (default): command-line interface, progress bars and subscriber setup

pub mod assembler;
#[cfg(feature = "cli")]
pub mod cli;
pub mod compositor;
pub mod config;
pub mod direction;
pub mod download;
pub mod error;
pub mod manifest;
pub mod services;
pub mod tracing_config;
pub mod types;

// Public API exports
pub use assembler::{background_rng, DatasetAssembler};
pub use compositor::{overlay_masked, sample_id, Compositor};
pub use config::{DatasetConfig, DatasetConfigBuilder, OutputFormat};
pub use direction::{Direction, ANGLES, NUM_DIRECTIONS};
pub use download::{
    BackgroundCandidate, BackgroundDownloader, CandidateSource, DownloadSummary,
    HttpImageFetcher, ImageFetcher, RedCapsSource,
};
pub use error::{Result, SynthError};
pub use manifest::{LabelManifest, MANIFEST_FILE_NAME};
pub use services::{ImageIOService, ImageTransforms, ProgressIndicator};
pub use types::{ArrowSprite, DatasetSummary, LabeledImage, Placement};

#[cfg(feature = "cli")]
pub use tracing_config::init_cli_tracing;
pub use tracing_config::{events, spans, TracingConfig, TracingFormat};

/// Assemble a dataset in one call
///
/// Equivalent to [`DatasetAssembler::new`] followed by
/// [`DatasetAssembler::assemble_and_save_dataset`].
///
/// # Examples
///
/// ```rust,no_run
/// use arrow_synth::{assemble_dataset, DatasetConfig};
///
/// # fn example() -> arrow_synth::Result<()> {
/// let summary = assemble_dataset(DatasetConfig::default())?;
/// assert_eq!(summary.composites, summary.backgrounds * summary.arrows * 4);
/// # Ok(())
/// # }
/// ```
pub fn assemble_dataset(config: DatasetConfig) -> Result<DatasetSummary> {
    DatasetAssembler::new(config)?.assemble_and_save_dataset()
}
