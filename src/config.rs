//! Configuration types for dataset synthesis

use crate::error::{Result, SynthError};
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default background resolution (width, height)
pub const DEFAULT_IMAGE_SIZE: (u32, u32) = (128, 128);

/// Default arrow sprite resolution (width, height)
pub const DEFAULT_ARROW_SIZE: (u32, u32) = (32, 32);

/// Default number of composites per (background, arrow) pair
pub const DEFAULT_REPETITIONS: usize = 4;

/// Default seed for every random source of a run
pub const DEFAULT_SEED: u64 = 42;

/// Output image format for composites
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputFormat {
    /// Lossless PNG
    #[default]
    Png,
    /// JPEG (lossy; pixel-exact comparisons against backgrounds no longer hold)
    Jpeg,
    /// Lossless TIFF
    Tiff,
}

impl OutputFormat {
    /// File extension (without the dot)
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Tiff => "tiff",
        }
    }

    /// Matching `image` crate format
    #[must_use]
    pub fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Tiff => ImageFormat::Tiff,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Png => write!(f, "png"),
            Self::Jpeg => write!(f, "jpeg"),
            Self::Tiff => write!(f, "tiff"),
        }
    }
}

/// Configuration for one dataset assembly run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Directory holding background photographs
    pub background_dir: PathBuf,

    /// Directory holding arrow sprites
    pub arrow_dir: PathBuf,

    /// Directory receiving composites and `labels.csv`
    pub output_dir: PathBuf,

    /// Composites generated per (background, arrow) pair
    pub k: usize,

    /// Background resolution (width, height)
    pub image_size: (u32, u32),

    /// Arrow sprite resolution (width, height)
    pub arrow_size: (u32, u32),

    /// Format of written composites
    pub output_format: OutputFormat,

    /// Seed for angle and placement draws
    pub seed: u64,

    /// Extensions (lowercase, no dot) enumerated in the background directory
    pub background_extensions: Vec<String>,

    /// Extensions (lowercase, no dot) enumerated in the arrow directory
    pub arrow_extensions: Vec<String>,

    /// Show a progress bar over backgrounds (CLI builds only)
    pub show_progress: bool,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            background_dir: PathBuf::from("backgrounds"),
            arrow_dir: PathBuf::from("arrows"),
            output_dir: PathBuf::from("dataset"),
            k: DEFAULT_REPETITIONS,
            image_size: DEFAULT_IMAGE_SIZE,
            arrow_size: DEFAULT_ARROW_SIZE,
            output_format: OutputFormat::Png,
            seed: DEFAULT_SEED,
            background_extensions: vec!["jpg".to_string(), "jpeg".to_string()],
            arrow_extensions: vec!["png".to_string()],
            show_progress: false,
        }
    }
}

impl DatasetConfig {
    /// Create a new configuration builder
    #[must_use]
    pub fn builder() -> DatasetConfigBuilder {
        DatasetConfigBuilder::default()
    }

    /// Validate configuration parameters
    ///
    /// # Errors
    /// - Zero-sized image or arrow dimensions
    /// - Arrow larger than the background in either dimension
    /// - Empty extension lists
    pub fn validate(&self) -> Result<()> {
        let (image_w, image_h) = self.image_size;
        let (arrow_w, arrow_h) = self.arrow_size;

        if image_w == 0 || image_h == 0 {
            return Err(SynthError::config_value_error(
                "image size",
                format!("{}x{}", image_w, image_h),
                "each side >= 1",
            ));
        }
        if arrow_w == 0 || arrow_h == 0 {
            return Err(SynthError::config_value_error(
                "arrow size",
                format!("{}x{}", arrow_w, arrow_h),
                "each side >= 1",
            ));
        }
        if arrow_w > image_w || arrow_h > image_h {
            return Err(SynthError::invalid_config(format!(
                "Arrow size {}x{} does not fit into image size {}x{}",
                arrow_w, arrow_h, image_w, image_h
            )));
        }
        if self.background_extensions.is_empty() {
            return Err(SynthError::invalid_config(
                "At least one background extension is required",
            ));
        }
        if self.arrow_extensions.is_empty() {
            return Err(SynthError::invalid_config(
                "At least one arrow extension is required",
            ));
        }

        Ok(())
    }

    /// Path of the label manifest inside the output directory
    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.output_dir.join(crate::manifest::MANIFEST_FILE_NAME)
    }
}

/// Builder for `DatasetConfig`
#[derive(Debug, Default)]
pub struct DatasetConfigBuilder {
    config: DatasetConfig,
}

impl DatasetConfigBuilder {
    #[must_use]
    pub fn background_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.background_dir = dir.into();
        self
    }

    #[must_use]
    pub fn arrow_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.arrow_dir = dir.into();
        self
    }

    #[must_use]
    pub fn output_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    #[must_use]
    pub fn k(mut self, k: usize) -> Self {
        self.config.k = k;
        self
    }

    #[must_use]
    pub fn image_size(mut self, width: u32, height: u32) -> Self {
        self.config.image_size = (width, height);
        self
    }

    #[must_use]
    pub fn arrow_size(mut self, width: u32, height: u32) -> Self {
        self.config.arrow_size = (width, height);
        self
    }

    #[must_use]
    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output_format = format;
        self
    }

    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Extensions are matched case-insensitively
    #[must_use]
    pub fn background_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.config.background_extensions = normalize_extensions(extensions);
        self
    }

    /// Extensions are matched case-insensitively
    #[must_use]
    pub fn arrow_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.config.arrow_extensions = normalize_extensions(extensions);
        self
    }

    #[must_use]
    pub fn show_progress(mut self, show: bool) -> Self {
        self.config.show_progress = show;
        self
    }

    /// Build and validate the configuration
    ///
    /// # Errors
    /// See [`DatasetConfig::validate`]
    pub fn build(self) -> Result<DatasetConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

fn normalize_extensions<I, S>(extensions: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    extensions
        .into_iter()
        .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}
