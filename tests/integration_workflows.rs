//! Integration tests for complete dataset assembly workflows
//!
//! Every test builds its own arrow/background directories in a temp dir with
//! synthetic images, runs the assembler and checks the files and manifest.

use arrow_synth::{
    assemble_dataset,
    config::{DatasetConfig, OutputFormat},
    direction::Direction,
    error::{Result, SynthError},
    manifest::{LabelManifest, MANIFEST_FILE_NAME},
    DatasetAssembler,
};
use image::{Rgb, RgbImage, RgbaImage};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Workspace with `arrows/`, `backgrounds/` and `dataset/` directories
struct Workspace {
    root: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        for dir in ["arrows", "backgrounds", "dataset"] {
            std::fs::create_dir(root.path().join(dir)).unwrap();
        }
        Self { root }
    }

    fn arrows(&self) -> PathBuf {
        self.root.path().join("arrows")
    }

    fn backgrounds(&self) -> PathBuf {
        self.root.path().join("backgrounds")
    }

    fn output(&self) -> PathBuf {
        self.root.path().join("dataset")
    }

    /// Up-pointing arrow: a vertical shaft with a head at the top, black elsewhere
    fn add_arrow(&self, file_name: &str, size: u32) {
        let mut sprite = RgbImage::new(size, size);
        let mid = size / 2;
        for y in size / 8..size - size / 8 {
            sprite.put_pixel(mid, y, Rgb([250, 20, 20]));
        }
        for d in 1..size / 4 {
            sprite.put_pixel(mid - d, size / 8 + d, Rgb([250, 20, 20]));
            sprite.put_pixel(mid + d, size / 8 + d, Rgb([250, 20, 20]));
        }
        sprite.save(self.arrows().join(file_name)).unwrap();
    }

    /// Gradient background so every pixel differs from the arrow color
    fn add_background(&self, file_name: &str, width: u32, height: u32) {
        let mut img = RgbImage::new(width, height);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = Rgb([(x % 200) as u8 + 20, (y % 200) as u8 + 20, 90]);
        }
        img.save(self.backgrounds().join(file_name)).unwrap();
    }

    fn config(&self, k: usize) -> DatasetConfig {
        DatasetConfig::builder()
            .arrow_dir(self.arrows())
            .background_dir(self.backgrounds())
            .output_dir(self.output())
            .k(k)
            .seed(42)
            .build()
            .unwrap()
    }

    fn output_images(&self, extension: &str) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(self.output())
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.extension().is_some_and(|x| x == extension))
            .collect();
        files.sort();
        files
    }

    fn manifest(&self) -> LabelManifest {
        LabelManifest::read_csv(self.output().join(MANIFEST_FILE_NAME)).unwrap()
    }
}

fn stem(path: &Path) -> String {
    path.file_stem().unwrap().to_string_lossy().to_string()
}

#[test]
fn test_single_arrow_single_background() -> Result<()> {
    let ws = Workspace::new();
    ws.add_arrow("up.png", 32);
    ws.add_background("bg1.jpg", 128, 128);

    let summary = assemble_dataset(ws.config(2))?;
    assert_eq!(summary.composites, 2);

    let files = ws.output_images("png");
    assert_eq!(files.len(), 2);

    let manifest = ws.manifest();
    assert_eq!(manifest.len(), 2);
    let ids: Vec<&str> = manifest.iter().map(|(id, _)| id).collect();
    for (ind, id) in ids.iter().enumerate() {
        let prefix = format!("bg1_arrow_up_iter_{ind}_");
        assert!(id.starts_with(&prefix), "{id} does not start with {prefix}");
        let direction: Direction = id[prefix.len()..].parse().map_err(SynthError::processing)?;
        assert_eq!(manifest.get(id), Some(direction));
    }

    Ok(())
}

#[test]
fn test_two_arrows_two_backgrounds() -> Result<()> {
    let ws = Workspace::new();
    ws.add_arrow("left.png", 32);
    ws.add_arrow("up.png", 32);
    ws.add_background("bg1.jpg", 128, 128);
    ws.add_background("bg2.jpeg", 128, 128);

    let summary = assemble_dataset(ws.config(3))?;
    assert_eq!(summary.backgrounds, 2);
    assert_eq!(summary.arrows, 2);
    assert_eq!(summary.composites, 12);

    assert_eq!(ws.output_images("png").len(), 12);
    assert_eq!(ws.manifest().len(), 12);
    Ok(())
}

#[test]
fn test_zero_repetitions_writes_header_only() -> Result<()> {
    let ws = Workspace::new();
    ws.add_arrow("up.png", 32);
    ws.add_background("bg1.jpg", 128, 128);

    let summary = assemble_dataset(ws.config(0))?;
    assert_eq!(summary.composites, 0);
    assert!(ws.output_images("png").is_empty());

    let text = std::fs::read_to_string(ws.output().join(MANIFEST_FILE_NAME)).unwrap();
    assert_eq!(text, "unique_id,direction\n");
    Ok(())
}

#[test]
fn test_colliding_arrow_stems_abort_before_manifest() {
    let ws = Workspace::new();
    ws.add_arrow("up.png", 32);
    ws.add_arrow("up.PNG", 32);
    ws.add_background("bg1.jpg", 128, 128);

    let result = assemble_dataset(ws.config(2));
    assert!(matches!(result, Err(SynthError::DuplicateIdentifier(_))));
    assert!(!ws.output().join(MANIFEST_FILE_NAME).exists());
    assert!(ws.output_images("png").is_empty());
}

#[test]
fn test_colliding_background_stems_abort() {
    let ws = Workspace::new();
    ws.add_arrow("up.png", 32);
    ws.add_background("bg1.jpg", 128, 128);
    ws.add_background("bg1.jpeg", 128, 128);

    let result = assemble_dataset(ws.config(1));
    assert!(matches!(result, Err(SynthError::DuplicateIdentifier(_))));
    assert!(!ws.output().join(MANIFEST_FILE_NAME).exists());
}

#[test]
fn test_ids_colliding_across_different_stems_abort_before_writing() {
    let ws = Workspace::new();
    ws.add_arrow("z.png", 32);
    ws.add_arrow("y_arrow_z.png", 32);
    ws.add_background("x.jpg", 128, 128);
    ws.add_background("x_arrow_y.jpg", 128, 128);

    // Fails for every seed, independent of the directions drawn
    for seed in [1, 42, 7_000] {
        let mut config = ws.config(40);
        config.seed = seed;
        let result = assemble_dataset(config);
        assert!(
            matches!(result, Err(SynthError::DuplicateIdentifier(ref msg)) if msg.contains("x_arrow_y_arrow_z")),
            "seed {seed}: {result:?}"
        );
    }
    assert!(ws.output_images("png").is_empty());
    assert!(!ws.output().join(MANIFEST_FILE_NAME).exists());
}

#[test]
fn test_stem_with_comma_is_rejected_before_writing() {
    let ws = Workspace::new();
    ws.add_arrow("up.png", 32);
    ws.add_background("bg1.jpg", 128, 128);
    ws.add_background("lake,evening.jpg", 128, 128);

    let result = assemble_dataset(ws.config(2));
    assert!(matches!(result, Err(SynthError::InvalidConfig(_))), "{result:?}");
    assert!(ws.output_images("png").is_empty());
    assert!(!ws.output().join(MANIFEST_FILE_NAME).exists());
}

#[test]
fn test_composite_count_and_unique_ids() -> Result<()> {
    let ws = Workspace::new();
    for name in ["a.png", "b.png", "c.png"] {
        ws.add_arrow(name, 16);
    }
    for name in ["x.jpg", "y.jpg"] {
        ws.add_background(name, 64, 64);
    }

    let config = DatasetConfig::builder()
        .arrow_dir(ws.arrows())
        .background_dir(ws.backgrounds())
        .output_dir(ws.output())
        .image_size(64, 64)
        .arrow_size(16, 16)
        .k(5)
        .build()?;
    let summary = assemble_dataset(config)?;

    assert_eq!(summary.composites, 2 * 3 * 5);
    let manifest = ws.manifest();
    let ids: HashSet<&str> = manifest.iter().map(|(id, _)| id).collect();
    assert_eq!(ids.len(), 30);

    let file_stems: HashSet<String> = ws.output_images("png").iter().map(|p| stem(p)).collect();
    let manifest_ids: HashSet<String> = ids.iter().map(|s| (*s).to_string()).collect();
    assert_eq!(file_stems, manifest_ids);
    Ok(())
}

#[test]
fn test_same_seed_reproduces_dataset() -> Result<()> {
    let runs: Vec<(String, Vec<(String, Vec<u8>)>)> = (0..2)
        .map(|_| {
            let ws = Workspace::new();
            ws.add_arrow("up.png", 32);
            ws.add_arrow("wide.png", 32);
            ws.add_background("bg1.jpg", 128, 128);
            ws.add_background("bg2.jpg", 128, 128);
            assemble_dataset(ws.config(4)).unwrap();

            let manifest = std::fs::read_to_string(ws.output().join(MANIFEST_FILE_NAME)).unwrap();
            let files = ws
                .output_images("png")
                .iter()
                .map(|p| (stem(p), std::fs::read(p).unwrap()))
                .collect();
            (manifest, files)
        })
        .collect();

    assert_eq!(runs[0].0, runs[1].0);
    assert_eq!(runs[0].1.len(), 16);
    assert_eq!(runs[0].1, runs[1].1);
    Ok(())
}

#[test]
fn test_outputs_have_background_size_and_valid_labels() -> Result<()> {
    let ws = Workspace::new();
    ws.add_arrow("up.png", 64);
    // Non-square, larger background is resized to the configured size
    ws.add_background("bg1.jpg", 300, 200);

    let summary = assemble_dataset(ws.config(8))?;
    assert_eq!(summary.composites, 8);

    let manifest = ws.manifest();
    for path in ws.output_images("png") {
        let img = image::open(&path)?;
        assert_eq!((img.width(), img.height()), (128, 128));

        let id = stem(&path);
        let label = manifest.get(&id).unwrap();
        assert!(Direction::ALL.contains(&label));
        assert!(id.ends_with(&format!("_{label}")));
        assert_eq!(Direction::from_angle(label.angle()), Some(label));
    }
    Ok(())
}

#[test]
fn test_only_sprite_pixels_change() -> Result<()> {
    let ws = Workspace::new();
    ws.add_arrow("up.png", 32);
    ws.add_background("bg1.jpg", 128, 128);

    let assembler = DatasetAssembler::new(ws.config(3))?;
    let background = assembler.load_background_image(ws.backgrounds().join("bg1.jpg"))?;
    assembler.assemble_and_save_dataset()?;

    for path in ws.output_images("png") {
        let composite = image::open(&path)?.to_rgb8();
        let mut changed = 0usize;
        for (x, y, pixel) in composite.enumerate_pixels() {
            let original = background.get_pixel(x, y);
            if pixel != original {
                changed += 1;
                // Every changed pixel carries the arrow color
                assert_eq!(pixel[0], 250, "pixel ({x},{y}) is not from the sprite");
            }
        }
        assert!(changed > 0, "no sprite pixels in {}", path.display());
        // A 32x32 sprite can touch at most its own area
        assert!(changed <= 32 * 32);
    }
    Ok(())
}

#[test]
fn test_rgba_sprites_are_accepted() -> Result<()> {
    let ws = Workspace::new();
    let mut sprite = RgbaImage::new(48, 48);
    for y in 4..44 {
        sprite.put_pixel(24, y, image::Rgba([10, 200, 10, 255]));
    }
    sprite.save(ws.arrows().join("green.png")).unwrap();
    ws.add_background("bg1.jpg", 128, 128);

    let summary = assemble_dataset(ws.config(2))?;
    assert_eq!(summary.composites, 2);
    Ok(())
}

#[test]
fn test_jpeg_and_tiff_output() -> Result<()> {
    for (format, extension) in [(OutputFormat::Jpeg, "jpg"), (OutputFormat::Tiff, "tiff")] {
        let ws = Workspace::new();
        ws.add_arrow("up.png", 32);
        ws.add_background("bg1.jpg", 128, 128);

        let mut config = ws.config(2);
        config.output_format = format;
        assemble_dataset(config)?;

        let files = ws.output_images(extension);
        assert_eq!(files.len(), 2, "format {format}");
        let img = image::open(&files[0])?;
        assert_eq!((img.width(), img.height()), (128, 128));
    }
    Ok(())
}

#[test]
fn test_non_matching_files_are_ignored() -> Result<()> {
    let ws = Workspace::new();
    ws.add_arrow("up.png", 32);
    std::fs::write(ws.arrows().join("README.txt"), "not an arrow").unwrap();
    ws.add_background("bg1.JPG", 128, 128);
    std::fs::write(ws.backgrounds().join("notes.md"), "not a background").unwrap();

    let summary = assemble_dataset(ws.config(1))?;
    assert_eq!(summary.arrows, 1);
    assert_eq!(summary.backgrounds, 1);
    assert_eq!(summary.composites, 1);
    Ok(())
}
