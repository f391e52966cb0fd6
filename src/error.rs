//! Error types for dataset synthesis operations

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for dataset synthesis operations
pub type Result<T> = std::result::Result<T, SynthError>;

/// Error types for dataset synthesis operations
#[derive(Error, Debug)]
pub enum SynthError {
    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding or encoding errors
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// A required input directory does not exist
    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// Sprite or background buffer does not have the configured size
    #[error("Dimension mismatch for {subject}: expected {}x{}, got {}x{}", .expected.0, .expected.1, .actual.0, .actual.1)]
    DimensionMismatch {
        /// What was being checked ("arrow 'up'", "background", ...)
        subject: String,
        /// Configured (width, height)
        expected: (u32, u32),
        /// Actual (width, height)
        actual: (u32, u32),
    },

    /// A generated sample identifier was already recorded in this run
    #[error("Duplicate unique_id found: {0}")]
    DuplicateIdentifier(String),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Network request or response errors
    #[error("Network error: {0}")]
    Network(String),

    /// Generic processing errors
    #[error("Processing error: {0}")]
    Processing(String),
}

impl SynthError {
    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new processing error
    pub fn processing<S: Into<String>>(msg: S) -> Self {
        Self::Processing(msg.into())
    }

    /// Create a new directory-not-found error
    pub fn directory_not_found<P: Into<PathBuf>>(path: P) -> Self {
        Self::DirectoryNotFound(path.into())
    }

    /// Create a new duplicate identifier error
    pub fn duplicate_identifier<S: Into<String>>(id: S) -> Self {
        Self::DuplicateIdentifier(id.into())
    }

    /// Create a dimension mismatch error
    pub fn dimension_mismatch<S: Into<String>>(
        subject: S,
        expected: (u32, u32),
        actual: (u32, u32),
    ) -> Self {
        Self::DimensionMismatch {
            subject: subject.into(),
            expected,
            actual,
        }
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: &std::io::Error,
    ) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {} '{}': {}", operation, path_display, error),
        ))
    }

    /// Create image loading error with format context
    pub fn image_load_error<P: AsRef<std::path::Path>>(path: P, error: &image::ImageError) -> Self {
        let path_display = path.as_ref().display();
        let extension = path
            .as_ref()
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown");

        Self::Image(image::ImageError::IoError(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!(
                "Failed to load image '{}' (format: {}): {}",
                path_display, extension, error
            ),
        )))
    }

    /// Create network error with request context
    pub fn network_error<S: AsRef<str>, E: std::fmt::Display>(context: S, error: E) -> Self {
        Self::Network(format!("{}: {}", context.as_ref(), error))
    }

    /// Create configuration error with valid ranges
    pub fn config_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
    ) -> Self {
        Self::InvalidConfig(format!(
            "Invalid {}: {} (valid range: {})",
            parameter, value, valid_range
        ))
    }
}
