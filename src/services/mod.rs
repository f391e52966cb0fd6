//! Service layer separating I/O and pixel transforms from pipeline logic

pub mod io;
pub mod progress;
pub mod transform;

pub use io::ImageIOService;
pub use progress::ProgressIndicator;
pub use transform::ImageTransforms;
