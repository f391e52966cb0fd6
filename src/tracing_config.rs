//! Tracing configuration module for structured logging
//!
//! Applications configure the subscriber (see [`TracingConfig::init`]); the
//! library itself only emits spans and events.

#[cfg(feature = "cli")]
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable consulted for a filter directive (`RUST_LOG` syntax)
pub const FILTER_ENV_VAR: &str = "RUST_LOG";

/// Log line layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TracingFormat {
    /// Colored, with span context
    #[default]
    Console,
    /// No ANSI escapes; suited to files and CI logs
    Compact,
}

/// Subscriber settings for the `arrow-synth` binary
#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    /// 0 = info, 1 = debug, 2+ = trace
    pub verbosity: u8,
    pub format: TracingFormat,
    /// Explicit filter directive; takes precedence over `verbosity`
    pub env_filter: Option<String>,
    /// Logged once after initialization to correlate runs
    pub session_id: Option<String>,
}

impl TracingConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Take the filter directive from [`FILTER_ENV_VAR`] when it is set and non-empty
    #[must_use]
    pub fn with_env_filter_from_env(self) -> Self {
        match std::env::var(FILTER_ENV_VAR) {
            Ok(directive) if !directive.trim().is_empty() => self.with_env_filter(directive),
            _ => self,
        }
    }

    #[must_use]
    pub fn with_session_id<S: Into<String>>(mut self, session_id: S) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    #[must_use]
    pub fn verbosity_to_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Directive the subscriber will be built with
    #[must_use]
    pub fn filter_directive(&self) -> &str {
        self.env_filter
            .as_deref()
            .unwrap_or_else(|| self.verbosity_to_filter())
    }

    /// Install the global subscriber; fails if one is already set
    #[cfg(feature = "cli")]
    pub fn init(self) -> anyhow::Result<()> {
        let filter = EnvFilter::try_new(self.filter_directive())?;
        let layer = fmt::layer()
            .with_target(false)
            .with_ansi(self.format == TracingFormat::Console)
            .compact();
        tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .try_init()?;

        if let Some(session_id) = &self.session_id {
            tracing::info!(session_id = %session_id, "Dataset synthesis session started");
        }
        Ok(())
    }
}

/// Subscriber for the CLI: `RUST_LOG` wins over `-v`, plus a fresh session id
#[cfg(feature = "cli")]
pub fn init_cli_tracing(verbosity: u8, format: TracingFormat) -> anyhow::Result<()> {
    TracingConfig::new()
        .with_verbosity(verbosity)
        .with_format(format)
        .with_env_filter_from_env()
        .with_session_id(uuid::Uuid::new_v4().to_string())
        .init()
}

/// Span creation helpers for common operations
pub mod spans {
    use tracing::{Level, Span};

    /// Span covering a whole assembly run
    pub fn assembly(output_dir: &std::path::Path, k: usize, seed: u64) -> Span {
        tracing::span!(
            Level::INFO,
            "assembly",
            output_dir = %output_dir.display(),
            k = %k,
            seed = %seed
        )
    }

    /// Span for compositing and writing one background
    pub fn background(base_id: &str, index: usize) -> Span {
        tracing::span!(
            Level::DEBUG,
            "background",
            base_id = %base_id,
            index = %index
        )
    }

    /// Span for a background download session
    pub fn download(destination: &std::path::Path, requested: usize) -> Span {
        tracing::span!(
            Level::INFO,
            "download",
            destination = %destination.display(),
            requested = %requested
        )
    }
}

/// Event helpers for common logging patterns
pub mod events {
    use tracing::{debug, error, warn};

    /// Log an error with context
    pub fn error_with_context(error: &dyn std::error::Error, context: &str) {
        error!(error = %error, context = %context, "Operation failed");
    }

    /// Log a warning with recommendation
    pub fn warning_with_recommendation(message: &str, recommendation: &str) {
        warn!(message = %message, recommendation = %recommendation, "Warning");
    }

    /// Log how long an operation took
    pub fn performance_metric(operation: &str, duration_ms: u64) {
        debug!(operation = %operation, duration_ms = %duration_ms, "Performance metric");
    }
}
