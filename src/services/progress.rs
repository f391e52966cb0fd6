//! Progress reporting service
//!
//! Keeps progress display out of the assembly and download loops so that
//! library builds without the `cli` feature stay silent.

#[cfg(feature = "cli")]
use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar abstraction that works with and without CLI features
#[derive(Debug)]
pub enum ProgressIndicator {
    #[cfg(feature = "cli")]
    Indicatif(ProgressBar),
    NoOp,
}

impl ProgressIndicator {
    /// Create a bar over `total` items labelled with `prefix`
    ///
    /// Falls back to [`ProgressIndicator::NoOp`] when `enabled` is false or
    /// the `cli` feature is off.
    #[must_use]
    pub fn new(enabled: bool, total: u64, prefix: &str) -> Self {
        #[cfg(feature = "cli")]
        {
            if enabled {
                let pb = ProgressBar::new(total);
                if let Ok(style) = ProgressStyle::default_bar()
                    .template("{prefix} {spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                {
                    pb.set_style(style.progress_chars("#>-"));
                }
                pb.set_prefix(prefix.to_string());
                return Self::Indicatif(pb);
            }
        }
        let _ = (enabled, total, prefix);
        Self::NoOp
    }

    /// Set message for progress indicator
    pub fn set_message(&self, msg: String) {
        match self {
            #[cfg(feature = "cli")]
            Self::Indicatif(pb) => pb.set_message(msg),
            Self::NoOp => {},
        }
    }

    /// Advance by `delta` items
    pub fn inc(&self, delta: u64) {
        match self {
            #[cfg(feature = "cli")]
            Self::Indicatif(pb) => pb.inc(delta),
            Self::NoOp => {},
        }
    }

    /// Finish progress indicator with message
    pub fn finish_with_message(&self, msg: String) {
        match self {
            #[cfg(feature = "cli")]
            Self::Indicatif(pb) => pb.finish_with_message(msg),
            Self::NoOp => {},
        }
    }
}
