//! Core data types flowing through the compositing pipeline

use crate::direction::Direction;
use image::RgbImage;
use std::path::{Path, PathBuf};

/// An arrow sprite, loaded once per run and read-only afterwards
#[derive(Debug, Clone)]
pub struct ArrowSprite {
    image: RgbImage,
    name: String,
    path: PathBuf,
}

impl ArrowSprite {
    pub fn new<S: Into<String>, P: Into<PathBuf>>(image: RgbImage, name: S, path: P) -> Self {
        Self {
            image,
            name: name.into(),
            path: path.into(),
        }
    }

    /// Sprite pixels; zero-valued pixels are transparent
    #[must_use]
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Name used in sample identifiers (the source filename stem)
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// A composite image with its direction label and sample identifier
#[derive(Debug, Clone)]
pub struct LabeledImage {
    pub image: RgbImage,
    pub label: Direction,
    pub unique_id: String,
}

/// Top-left position of a placed sprite inside the background
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
}

/// Outcome of a finished assembly run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSummary {
    /// Backgrounds processed
    pub backgrounds: usize,
    /// Arrow sprites loaded
    pub arrows: usize,
    /// Composites written (== manifest rows)
    pub composites: usize,
    /// Location of `labels.csv`
    pub manifest_path: PathBuf,
}
