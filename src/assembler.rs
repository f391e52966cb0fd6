//! Dataset assembly
//!
//! The [`DatasetAssembler`] drives a full run: it loads every arrow sprite
//! once, walks the background directory, asks the [`Compositor`] for
//! composites, writes each one to the output directory and finally persists
//! the label manifest. Every image file written has exactly one manifest row.

use crate::{
    compositor::{sample_id, Compositor},
    config::DatasetConfig,
    direction::Direction,
    error::{Result, SynthError},
    manifest::{is_manifest_safe, LabelManifest},
    services::{ImageIOService, ImageTransforms, ProgressIndicator},
    tracing_config::spans,
    types::{ArrowSprite, DatasetSummary},
};
use image::RgbImage;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Random source for the background at `index`
///
/// Each background gets its own ChaCha stream of the run seed, so its
/// composites depend only on `(seed, index)` and not on how many draws earlier
/// backgrounds consumed.
#[must_use]
pub fn background_rng(seed: u64, index: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(index as u64);
    rng
}

/// Orchestrates dataset generation for one configuration
#[derive(Debug)]
pub struct DatasetAssembler {
    config: DatasetConfig,
    compositor: Compositor,
}

impl DatasetAssembler {
    /// Create an assembler after validating configuration and directories
    ///
    /// # Errors
    /// - `InvalidConfig` when [`DatasetConfig::validate`] fails
    /// - `DirectoryNotFound` when the arrow, background or output directory is missing
    pub fn new(config: DatasetConfig) -> Result<Self> {
        config.validate()?;

        for directory in [&config.background_dir, &config.arrow_dir, &config.output_dir] {
            if !directory.is_dir() {
                return Err(SynthError::directory_not_found(directory));
            }
        }

        let compositor = Compositor::new(config.image_size, config.arrow_size);
        Ok(Self { config, compositor })
    }

    #[must_use]
    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    #[must_use]
    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    /// Load every sprite in the arrow directory, resized to the arrow size
    ///
    /// Sprites are returned sorted by path.
    pub fn load_arrows(&self) -> Result<Vec<ArrowSprite>> {
        let paths =
            ImageIOService::find_image_files(&self.config.arrow_dir, &self.config.arrow_extensions)?;

        let mut arrows = Vec::with_capacity(paths.len());
        for path in paths {
            let image = ImageIOService::load_rgb(&path)?;
            let image = ImageTransforms::resize(&image, self.config.arrow_size);
            let name = ImageIOService::file_stem(&path)?;
            debug!(arrow = %name, path = %path.display(), "Loaded arrow sprite");
            arrows.push(ArrowSprite::new(image, name, path));
        }

        Ok(arrows)
    }

    /// Load one background, resized to the image size
    pub fn load_background_image<P: AsRef<Path>>(&self, path: P) -> Result<RgbImage> {
        let image = ImageIOService::load_rgb(path)?;
        Ok(ImageTransforms::resize(&image, self.config.image_size))
    }

    /// Background files that will be processed, sorted by path
    pub fn background_paths(&self) -> Result<Vec<PathBuf>> {
        ImageIOService::find_image_files(
            &self.config.background_dir,
            &self.config.background_extensions,
        )
    }

    /// Generate all composites, write them, then write `labels.csv`
    ///
    /// # Errors
    /// - `DuplicateIdentifier` when two sprites or two backgrounds share a
    ///   stem, or a generated id is already recorded (nothing is overwritten)
    /// - any image or file system error, which aborts the run immediately
    pub fn assemble_and_save_dataset(&self) -> Result<DatasetSummary> {
        let span = spans::assembly(&self.config.output_dir, self.config.k, self.config.seed);
        let _guard = span.enter();
        let start = Instant::now();

        let arrows = self.load_arrows()?;
        let backgrounds = self.background_paths()?;
        info!(
            arrows = arrows.len(),
            backgrounds = backgrounds.len(),
            "Processing.."
        );

        let arrow_names = arrows.iter().map(|a| a.name().to_string());
        ensure_unique_stems(arrow_names, "arrow")?;
        let base_ids = backgrounds
            .iter()
            .map(ImageIOService::file_stem)
            .collect::<Result<Vec<_>>>()?;
        ensure_unique_stems(base_ids.iter().cloned(), "background")?;
        let arrow_names: Vec<&str> = arrows.iter().map(ArrowSprite::name).collect();
        ensure_unique_ids(&base_ids, &arrow_names, self.config.k)?;

        let progress = ProgressIndicator::new(
            self.config.show_progress,
            backgrounds.len() as u64,
            "Backgrounds",
        );

        let mut labels = LabelManifest::new();
        for (index, (background_path, base_id)) in backgrounds.iter().zip(&base_ids).enumerate() {
            let bg_span = spans::background(base_id, index);
            let _bg_guard = bg_span.enter();
            progress.set_message(base_id.clone());

            let background = self.load_background_image(background_path)?;
            let mut rng = background_rng(self.config.seed, index);
            let labeled_images = self.compositor.combine_background_with_arrows(
                &arrows,
                &background,
                base_id,
                self.config.k,
                &mut rng,
            )?;

            for labeled_image in labeled_images {
                if labels.contains(&labeled_image.unique_id) {
                    return Err(SynthError::duplicate_identifier(labeled_image.unique_id));
                }
                let output_path = self.output_path(&labeled_image.unique_id);
                ImageIOService::save_image(
                    &labeled_image.image,
                    &output_path,
                    self.config.output_format,
                )?;
                labels.insert(labeled_image.unique_id, labeled_image.label)?;
            }

            debug!(composites = labels.len(), "Background done");
            progress.inc(1);
        }

        self.save_labels(&labels)?;
        progress.finish_with_message(format!("{} composites", labels.len()));

        let summary = DatasetSummary {
            backgrounds: backgrounds.len(),
            arrows: arrows.len(),
            composites: labels.len(),
            manifest_path: self.config.manifest_path(),
        };
        crate::tracing_config::events::performance_metric(
            "assemble_and_save_dataset",
            start.elapsed().as_millis() as u64,
        );
        info!(
            composites = summary.composites,
            manifest = %summary.manifest_path.display(),
            "Dataset written"
        );

        Ok(summary)
    }

    /// Write `labels.csv` into the output directory
    pub fn save_labels(&self, labels: &LabelManifest) -> Result<()> {
        labels.write_csv(self.config.manifest_path())
    }

    fn output_path(&self, unique_id: &str) -> PathBuf {
        self.config.output_dir.join(format!(
            "{}.{}",
            unique_id,
            self.config.output_format.extension()
        ))
    }
}

/// Reject id collisions between different (background, arrow, iteration) triples
///
/// Every id the run could produce is enumerated over all directions, so a
/// collision is reported before any file is written no matter which
/// directions the RNG later draws.
fn ensure_unique_ids(base_ids: &[String], arrow_names: &[&str], k: usize) -> Result<()> {
    let mut owners: HashMap<String, (&str, &str, usize)> = HashMap::new();
    for base_id in base_ids {
        for &arrow_name in arrow_names {
            for ind in 0..k {
                for direction in Direction::ALL {
                    let id = sample_id(base_id, arrow_name, ind, direction);
                    let owner = (base_id.as_str(), arrow_name, ind);
                    if let Some(previous) = owners.insert(id.clone(), owner) {
                        if previous != owner {
                            return Err(SynthError::DuplicateIdentifier(format!(
                                "'{}' can be generated by background '{}' with arrow '{}' and by background '{}' with arrow '{}'",
                                id, previous.0, previous.1, owner.0, owner.1
                            )));
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

/// Reject stem collisions that would make generated ids ambiguous
fn ensure_unique_stems<I: IntoIterator<Item = String>>(stems: I, kind: &str) -> Result<()> {
    let mut seen = HashSet::new();
    for stem in stems {
        if !is_manifest_safe(&stem) {
            return Err(SynthError::invalid_config(format!(
                "{} name '{}' contains a comma, quote or line break and cannot be written to {}",
                kind,
                stem,
                crate::manifest::MANIFEST_FILE_NAME
            )));
        }
        if !seen.insert(stem.clone()) {
            return Err(SynthError::DuplicateIdentifier(format!(
                "{} name '{}' is used by more than one file",
                kind, stem
            )));
        }
    }
    Ok(())
}
