//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::{Cli, CliOutputFormat};
use crate::config::{DatasetConfig, OutputFormat};
use anyhow::{Context, Result};

/// Convert CLI arguments to a [`DatasetConfig`]
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build DatasetConfig from CLI arguments
    pub(crate) fn from_cli(cli: &Cli) -> Result<DatasetConfig> {
        let (image_width, image_height) =
            parse_size(&cli.image_size).context("Invalid --image-size")?;
        let (arrow_width, arrow_height) =
            parse_size(&cli.arrow_size).context("Invalid --arrow-size")?;

        let config = DatasetConfig::builder()
            .arrow_dir(&cli.arrow_dir)
            .background_dir(&cli.background_dir)
            .output_dir(&cli.output_dir)
            .k(cli.k)
            .seed(cli.seed)
            .image_size(image_width, image_height)
            .arrow_size(arrow_width, arrow_height)
            .output_format(cli.format.into())
            .show_progress(cli.progress)
            .build()
            .context("Invalid configuration")?;

        Ok(config)
    }

    /// Validate CLI arguments for consistency
    pub(crate) fn validate_cli(cli: &Cli) -> Result<()> {
        parse_size(&cli.image_size).context("Invalid --image-size")?;
        parse_size(&cli.arrow_size).context("Invalid --arrow-size")?;

        if cli.arrow_dir == cli.output_dir || cli.background_dir == cli.output_dir {
            anyhow::bail!(
                "Output directory '{}' must differ from the input directories",
                cli.output_dir
            );
        }

        Ok(())
    }
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(format: CliOutputFormat) -> Self {
        match format {
            CliOutputFormat::Png => OutputFormat::Png,
            CliOutputFormat::Jpeg => OutputFormat::Jpeg,
            CliOutputFormat::Tiff => OutputFormat::Tiff,
        }
    }
}

/// Parse `WIDTHxHEIGHT` (also accepts `X`)
pub(crate) fn parse_size(value: &str) -> Result<(u32, u32)> {
    let (width, height) = value
        .trim()
        .split_once(['x', 'X'])
        .with_context(|| format!("Expected WIDTHxHEIGHT, got '{}'", value))?;

    let width: u32 = width
        .trim()
        .parse()
        .with_context(|| format!("Invalid width in '{}'", value))?;
    let height: u32 = height
        .trim()
        .parse()
        .with_context(|| format!("Invalid height in '{}'", value))?;

    if width == 0 || height == 0 {
        anyhow::bail!("Size must be non-zero, got '{}'", value);
    }

    Ok((width, height))
}
