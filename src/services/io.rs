//! Image I/O operations service
//!
//! This module separates file I/O operations from compositing logic,
//! making the pipeline testable with in-memory buffers.

use crate::{
    config::OutputFormat,
    error::{Result, SynthError},
};
use image::{DynamicImage, RgbImage};
use std::path::{Path, PathBuf};

/// Service for handling image file input/output operations
pub struct ImageIOService;

impl ImageIOService {
    /// Load an image from a file path
    ///
    /// Extension-based decoding is tried first; if that fails the file content
    /// is sniffed instead, so a PNG saved as `.jpg` still loads.
    ///
    /// # Examples
    /// ```rust,no_run
    /// use arrow_synth::services::ImageIOService;
    ///
    /// let image = ImageIOService::load_image("backgrounds/bg1.jpg")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(SynthError::file_io_error(
                "read image file",
                path_ref,
                &std::io::Error::new(std::io::ErrorKind::NotFound, "file does not exist"),
            ));
        }

        match image::open(path_ref) {
            Ok(img) => Ok(img),
            Err(e) => {
                log::debug!(
                    "Extension-based loading failed for {}: {}. Attempting content-based detection.",
                    path_ref.display(),
                    e
                );

                let data = std::fs::read(path_ref).map_err(|io_err| {
                    SynthError::file_io_error("read image data", path_ref, &io_err)
                })?;

                image::load_from_memory(&data)
                    .map_err(|content_err| SynthError::image_load_error(path_ref, &content_err))
            },
        }
    }

    /// Load an image and convert it to 3-channel RGB
    pub fn load_rgb<P: AsRef<Path>>(path: P) -> Result<RgbImage> {
        Ok(Self::load_image(path)?.to_rgb8())
    }

    /// Save an RGB buffer in the given format
    ///
    /// The parent directory must already exist.
    pub fn save_image<P: AsRef<Path>>(
        image: &RgbImage,
        path: P,
        format: OutputFormat,
    ) -> Result<()> {
        let path_ref = path.as_ref();

        image
            .save_with_format(path_ref, format.image_format())
            .map_err(|e| {
                SynthError::processing(format!(
                    "Failed to save '{}' as {}: {}",
                    path_ref.display(),
                    format,
                    e
                ))
            })
    }

    /// Check whether a path's extension is in `extensions` (case-insensitive)
    pub fn has_extension<P: AsRef<Path>, S: AsRef<str>>(path: P, extensions: &[S]) -> bool {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                let ext_lower = ext.to_lowercase();
                extensions.iter().any(|e| e.as_ref() == ext_lower)
            })
    }

    /// List regular files directly inside `dir` whose extension matches
    ///
    /// The result is sorted by path so that runs over identical directory
    /// contents visit files in the same order on every platform.
    pub fn find_image_files<P: AsRef<Path>, S: AsRef<str>>(
        dir: P,
        extensions: &[S],
    ) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        let mut files = Vec::new();

        let entries = std::fs::read_dir(dir)
            .map_err(|e| SynthError::file_io_error("list directory", dir, &e))?;

        for entry in entries {
            let entry = entry.map_err(|e| SynthError::file_io_error("list directory", dir, &e))?;
            let path = entry.path();
            if path.is_file() && Self::has_extension(&path, extensions) {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    /// Filename stem used as an identifier component
    pub fn file_stem<P: AsRef<Path>>(path: P) -> Result<String> {
        let path = path.as_ref();
        path.file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .ok_or_else(|| {
                SynthError::processing(format!(
                    "Cannot derive a UTF-8 identifier from '{}'",
                    path.display()
                ))
            })
    }
}
