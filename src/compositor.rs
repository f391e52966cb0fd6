//! Sprite-on-background compositing
//!
//! The [`Compositor`] turns one background and one arrow sprite into `k`
//! labeled samples. Every random draw goes through the caller's RNG so a run
//! is fully reproducible from its seed.

use crate::{
    direction::{Direction, ANGLES},
    error::{Result, SynthError},
    services::ImageTransforms,
    types::{ArrowSprite, LabeledImage, Placement},
};
use image::RgbImage;
use rand::Rng;

/// Builds the sample identifier for one composite
#[must_use]
pub fn sample_id(base_id: &str, sprite_name: &str, ind: usize, direction: Direction) -> String {
    format!("{base_id}_arrow_{sprite_name}_iter_{ind}_{direction}")
}

/// Copy `sprite` onto `canvas` at `placement` wherever the sprite is non-zero
///
/// A sprite pixel counts as opaque when any channel is above zero; all-zero
/// pixels leave the canvas untouched. Sprite pixels falling outside the
/// canvas are ignored.
pub fn overlay_masked(canvas: &mut RgbImage, sprite: &RgbImage, placement: Placement) {
    let (canvas_w, canvas_h) = canvas.dimensions();
    for (sx, sy, pixel) in sprite.enumerate_pixels() {
        if pixel.0.iter().all(|&c| c == 0) {
            continue;
        }
        let (cx, cy) = (placement.x + sx, placement.y + sy);
        if cx < canvas_w && cy < canvas_h {
            canvas.put_pixel(cx, cy, *pixel);
        }
    }
}

/// Combines arrow sprites with backgrounds of a fixed configuration
#[derive(Debug, Clone, Copy)]
pub struct Compositor {
    image_size: (u32, u32),
    arrow_size: (u32, u32),
}

impl Compositor {
    /// `arrow_size` must fit inside `image_size`; [`crate::DatasetConfig::validate`]
    /// enforces this for assembled runs.
    #[must_use]
    pub fn new(image_size: (u32, u32), arrow_size: (u32, u32)) -> Self {
        Self {
            image_size,
            arrow_size,
        }
    }

    #[must_use]
    pub fn image_size(&self) -> (u32, u32) {
        self.image_size
    }

    #[must_use]
    pub fn arrow_size(&self) -> (u32, u32) {
        self.arrow_size
    }

    /// Uniformly pick one of the canonical angles
    pub fn choose_angle<R: Rng + ?Sized>(rng: &mut R) -> u16 {
        ANGLES[rng.gen_range(0..ANGLES.len())]
    }

    /// Uniformly pick a top-left offset keeping the sprite fully inside the background
    pub fn choose_placement<R: Rng + ?Sized>(&self, rng: &mut R) -> Placement {
        let max_x = self.image_size.0.saturating_sub(self.arrow_size.0);
        let max_y = self.image_size.1.saturating_sub(self.arrow_size.1);
        let x = rng.gen_range(0..=max_x);
        let y = rng.gen_range(0..=max_y);
        Placement { x, y }
    }

    fn check_dimensions(&self, arrow: &ArrowSprite, background: &RgbImage) -> Result<()> {
        if arrow.dimensions() != self.arrow_size {
            return Err(SynthError::dimension_mismatch(
                format!("arrow '{}'", arrow.name()),
                self.arrow_size,
                arrow.dimensions(),
            ));
        }
        if background.dimensions() != self.image_size {
            return Err(SynthError::dimension_mismatch(
                "background",
                self.image_size,
                background.dimensions(),
            ));
        }
        Ok(())
    }

    /// Produce `k` labeled composites of one sprite on one background
    ///
    /// Per composite the RNG is drawn in a fixed order: angle, x, y.
    ///
    /// # Errors
    /// `DimensionMismatch` when the sprite or the background does not have
    /// the configured size.
    pub fn combine_background_with_arrow<R: Rng + ?Sized>(
        &self,
        arrow: &ArrowSprite,
        background: &RgbImage,
        base_id: &str,
        k: usize,
        rng: &mut R,
    ) -> Result<Vec<LabeledImage>> {
        self.check_dimensions(arrow, background)?;

        let mut labeled_images = Vec::with_capacity(k);
        for ind in 0..k {
            let angle = Self::choose_angle(rng);
            let rotated = ImageTransforms::rotate(arrow.image(), f32::from(angle));
            let placement = self.choose_placement(rng);

            let mut composite = background.clone();
            overlay_masked(&mut composite, &rotated, placement);

            let label = Direction::from_angle(angle).ok_or_else(|| {
                SynthError::processing(format!("Angle {} is not a canonical direction", angle))
            })?;

            tracing::trace!(
                arrow = %arrow.name(),
                iteration = ind,
                angle,
                x = placement.x,
                y = placement.y,
                "composite generated"
            );

            labeled_images.push(LabeledImage {
                image: composite,
                label,
                unique_id: sample_id(base_id, arrow.name(), ind, label),
            });
        }

        Ok(labeled_images)
    }

    /// Apply [`Compositor::combine_background_with_arrow`] for every sprite
    ///
    /// Results are concatenated in sprite order, `k` per sprite.
    pub fn combine_background_with_arrows<R: Rng + ?Sized>(
        &self,
        arrows: &[ArrowSprite],
        background: &RgbImage,
        base_id: &str,
        k: usize,
        rng: &mut R,
    ) -> Result<Vec<LabeledImage>> {
        let mut labeled_images = Vec::with_capacity(arrows.len() * k);
        for arrow in arrows {
            labeled_images
                .extend(self.combine_background_with_arrow(arrow, background, base_id, k, rng)?);
        }
        Ok(labeled_images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_arrow(name: &str, size: (u32, u32)) -> ArrowSprite {
        let mut img = RgbImage::new(size.0, size.1);
        let mid = size.0 / 2;
        for y in 1..size.1 / 2 {
            img.put_pixel(mid, y, Rgb([255, 0, 0]));
        }
        ArrowSprite::new(img, name, format!("{name}.png"))
    }

    fn gradient_background(size: (u32, u32)) -> RgbImage {
        RgbImage::from_fn(size.0, size.1, |x, y| Rgb([x as u8, y as u8, 77]))
    }

    #[test]
    fn test_sample_id_format() {
        assert_eq!(
            sample_id("bg1", "up", 1, Direction::NorthWest),
            "bg1_arrow_up_iter_1_north_west"
        );
    }

    #[test]
    fn test_overlay_masked_binary_semantics() {
        let mut canvas = RgbImage::from_pixel(4, 4, Rgb([9, 9, 9]));
        let mut sprite = RgbImage::new(2, 2);
        sprite.put_pixel(0, 0, Rgb([0, 0, 1]));
        sprite.put_pixel(1, 1, Rgb([200, 0, 0]));

        overlay_masked(&mut canvas, &sprite, Placement { x: 2, y: 1 });

        assert_eq!(*canvas.get_pixel(2, 1), Rgb([0, 0, 1]));
        assert_eq!(*canvas.get_pixel(3, 2), Rgb([200, 0, 0]));
        assert_eq!(*canvas.get_pixel(3, 1), Rgb([9, 9, 9]));
        assert_eq!(*canvas.get_pixel(2, 2), Rgb([9, 9, 9]));
        assert_eq!(*canvas.get_pixel(0, 0), Rgb([9, 9, 9]));
    }

    #[test]
    fn test_output_count_dimensions_and_ids() {
        let compositor = Compositor::new((128, 128), (32, 32));
        let arrow = test_arrow("up", (32, 32));
        let background = gradient_background((128, 128));
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let images = compositor
            .combine_background_with_arrow(&arrow, &background, "bg1", 5, &mut rng)
            .unwrap();

        assert_eq!(images.len(), 5);
        for (ind, labeled) in images.iter().enumerate() {
            assert_eq!(labeled.image.dimensions(), (128, 128));
            assert!(ANGLES.contains(&labeled.label.angle()));
            assert_eq!(
                labeled.unique_id,
                format!("bg1_arrow_up_iter_{}_{}", ind, labeled.label)
            );
        }
    }

    #[test]
    fn test_zero_repetitions_yields_nothing() {
        let compositor = Compositor::new((128, 128), (32, 32));
        let arrow = test_arrow("up", (32, 32));
        let background = gradient_background((128, 128));
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let images = compositor
            .combine_background_with_arrow(&arrow, &background, "bg1", 0, &mut rng)
            .unwrap();
        assert!(images.is_empty());
    }

    #[test]
    fn test_dimension_mismatch() {
        let compositor = Compositor::new((128, 128), (32, 32));
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let small_arrow = test_arrow("tiny", (16, 16));
        let err = compositor
            .combine_background_with_arrow(
                &small_arrow,
                &gradient_background((128, 128)),
                "bg",
                1,
                &mut rng,
            )
            .unwrap_err();
        assert!(matches!(err, SynthError::DimensionMismatch { .. }));
        assert!(err.to_string().contains("tiny"));

        let err = compositor
            .combine_background_with_arrow(
                &test_arrow("up", (32, 32)),
                &gradient_background((64, 128)),
                "bg",
                1,
                &mut rng,
            )
            .unwrap_err();
        assert!(matches!(err, SynthError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_placement_stays_in_bounds() {
        let compositor = Compositor::new((40, 36), (32, 32));
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut seen_max_x = false;
        for _ in 0..500 {
            let p = compositor.choose_placement(&mut rng);
            assert!(p.x <= 8 && p.y <= 4);
            seen_max_x |= p.x == 8;
        }
        assert!(seen_max_x, "upper bound of the range must be reachable");
    }

    #[test]
    fn test_placement_with_equal_sizes() {
        let compositor = Compositor::new((32, 32), (32, 32));
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..20 {
            assert_eq!(compositor.choose_placement(&mut rng), Placement { x: 0, y: 0 });
        }

        let images = compositor
            .combine_background_with_arrow(
                &test_arrow("up", (32, 32)),
                &gradient_background((32, 32)),
                "bg",
                3,
                &mut rng,
            )
            .unwrap();
        assert_eq!(images.len(), 3);
    }

    #[test]
    fn test_changed_pixels_come_from_sprite() {
        let compositor = Compositor::new((64, 64), (32, 32));
        let arrow = test_arrow("up", (32, 32));
        let background = gradient_background((64, 64));
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let images = compositor
            .combine_background_with_arrow(&arrow, &background, "bg", 10, &mut rng)
            .unwrap();

        for labeled in images {
            for (x, y, px) in labeled.image.enumerate_pixels() {
                let bg_px = background.get_pixel(x, y);
                if px != bg_px {
                    // only red sprite pixels are ever painted
                    assert_eq!(*px, Rgb([255, 0, 0]));
                }
            }
        }
    }

    #[test]
    fn test_same_seed_same_output() {
        let compositor = Compositor::new((128, 128), (32, 32));
        let arrows = vec![test_arrow("a", (32, 32)), test_arrow("b", (32, 32))];
        let background = gradient_background((128, 128));

        let run = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            compositor
                .combine_background_with_arrows(&arrows, &background, "bg", 3, &mut rng)
                .unwrap()
        };

        let first = run(11);
        let second = run(11);
        assert_eq!(first.len(), 6);
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.unique_id, b.unique_id);
            assert_eq!(a.label, b.label);
            assert_eq!(a.image, b.image);
        }
    }

    #[test]
    fn test_multiple_arrows_concatenate_in_order() {
        let compositor = Compositor::new((128, 128), (32, 32));
        let arrows = vec![test_arrow("first", (32, 32)), test_arrow("second", (32, 32))];
        let mut rng = ChaCha8Rng::seed_from_u64(8);

        let images = compositor
            .combine_background_with_arrows(
                &arrows,
                &gradient_background((128, 128)),
                "bg",
                2,
                &mut rng,
            )
            .unwrap();

        let expected = [
            "bg_arrow_first_iter_0_",
            "bg_arrow_first_iter_1_",
            "bg_arrow_second_iter_0_",
            "bg_arrow_second_iter_1_",
        ];
        assert_eq!(images.len(), expected.len());
        for (labeled, prefix) in images.iter().zip(expected) {
            assert!(labeled.unique_id.starts_with(prefix), "{}", labeled.unique_id);
        }
    }
}
