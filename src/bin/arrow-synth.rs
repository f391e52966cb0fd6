//! Arrow dataset synthesis CLI
//!
//! Command-line entry point for downloading backgrounds and compositing the
//! labeled arrow dataset.

#[cfg(feature = "cli")]
use arrow_synth::cli;

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::main().await
}

#[cfg(not(feature = "cli"))]
fn main() {
    panic!("CLI feature not enabled. Please rebuild with --features cli");
}
