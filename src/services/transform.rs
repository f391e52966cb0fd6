//! Pixel-buffer transforms: resize and dimension-preserving rotation

use image::{imageops::FilterType, Rgb, RgbImage};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};

/// Stateless image transforms used by the compositor and the assembler
pub struct ImageTransforms;

impl ImageTransforms {
    /// Resize to exactly `(width, height)` with bilinear filtering
    ///
    /// Returns an unmodified copy when the buffer already has the target size.
    #[must_use]
    pub fn resize(image: &RgbImage, size: (u32, u32)) -> RgbImage {
        if image.dimensions() == size {
            return image.clone();
        }
        image::imageops::resize(image, size.0, size.1, FilterType::Triangle)
    }

    /// Rotate counter-clockwise (as displayed) by `angle_degrees` about the center
    ///
    /// The output has the input's dimensions. Corners rotated out of frame are
    /// cropped and exposed regions are filled with zero pixels, which the
    /// compositor treats as transparent. Nearest-neighbour sampling keeps the
    /// sprite's edges binary.
    #[must_use]
    pub fn rotate(image: &RgbImage, angle_degrees: f32) -> RgbImage {
        if angle_degrees.rem_euclid(360.0) == 0.0 {
            return image.clone();
        }
        // imageproc rotates clockwise in pixel coordinates (y points down)
        rotate_about_center(
            image,
            -angle_degrees.to_radians(),
            Interpolation::Nearest,
            Rgb([0, 0, 0]),
        )
    }
}
