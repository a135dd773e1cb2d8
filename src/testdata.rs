//! Synthetic fixture generation
//!
//! Creates small test collections for trying the tool without risking real
//! photos: coarse random block-pattern images, optional re-scaled duplicate
//! copies, and optional corrupt files that exercise the quarantine path.
//! Generation is seeded and reproducible.

use crate::core::error::{DedupError, Result};
use image::{DynamicImage, Rgb, RgbImage};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::Path;

/// Grid side of the random block pattern. Coarse blocks survive the
/// fingerprint downsample at any rendered resolution, so duplicate copies
/// of one pattern always land in the same group.
const PATTERN_GRID: u32 = 4;

/// Resolutions duplicate copies are rendered at.
const RESOLUTIONS: &[(u32, u32)] = &[(64, 64), (128, 128), (256, 256), (512, 512)];

/// Options for one generation run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Number of distinct base images
    pub count: usize,
    /// Also write a lower/higher-resolution copy of every third image
    pub with_duplicates: bool,
    /// Also write a few files that fail to decode
    pub with_corrupt: bool,
    /// RNG seed for reproducible output
    pub seed: u64,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            count: 20,
            with_duplicates: true,
            with_corrupt: true,
            seed: 42,
        }
    }
}

/// What one generation run wrote.
#[derive(Debug, Default)]
pub struct GenerateSummary {
    pub images: usize,
    pub duplicates: usize,
    pub corrupt: usize,
}

/// Generate a fixture collection under `output`.
pub fn generate(output: &Path, options: &GenerateOptions) -> Result<GenerateSummary> {
    fs::create_dir_all(output).map_err(|e| DedupError::Filesystem {
        path: output.to_path_buf(),
        message: format!("failed to create output folder: {}", e),
    })?;

    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut summary = GenerateSummary::default();

    for i in 0..options.count {
        let pattern = random_pattern(&mut rng);
        let (width, height) = RESOLUTIONS[rng.gen_range(0..RESOLUTIONS.len())];

        let path = output.join(format!("img_{:04}.png", i));
        render(&pattern, width, height)
            .save(&path)
            .map_err(|e| DedupError::Io(format!("failed to write '{}': {}", path.display(), e)))?;
        summary.images += 1;

        if options.with_duplicates && i % 3 == 0 {
            // Same pattern, different native resolution.
            let (dup_w, dup_h) = RESOLUTIONS[rng.gen_range(0..RESOLUTIONS.len())];
            let dup_path = output.join(format!("img_{:04}_copy.png", i));
            render(&pattern, dup_w, dup_h).save(&dup_path).map_err(|e| {
                DedupError::Io(format!("failed to write '{}': {}", dup_path.display(), e))
            })?;
            summary.duplicates += 1;
        }
    }

    if options.with_corrupt {
        for i in 0..2 {
            let path = output.join(format!("corrupt_{:02}.jpg", i));
            let junk: Vec<u8> = (0..64).map(|_| rng.gen::<u8>()).collect();
            fs::write(&path, junk).map_err(|e| {
                DedupError::Io(format!("failed to write '{}': {}", path.display(), e))
            })?;
            summary.corrupt += 1;
        }
    }

    info!(
        "Generated {} image(s), {} duplicate cop(ies), {} corrupt file(s) in {}",
        summary.images,
        summary.duplicates,
        summary.corrupt,
        output.display()
    );
    Ok(summary)
}

/// A random black/white block grid.
fn random_pattern(rng: &mut StdRng) -> Vec<bool> {
    (0..PATTERN_GRID * PATTERN_GRID)
        .map(|_| rng.gen_bool(0.5))
        .collect()
}

/// Render the block grid at the requested resolution.
fn render(pattern: &[bool], width: u32, height: u32) -> DynamicImage {
    let mut img = RgbImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let cell_x = x * PATTERN_GRID / width;
            let cell_y = y * PATTERN_GRID / height;
            let on = pattern[(cell_y * PATTERN_GRID + cell_x) as usize];
            let v = if on { 255 } else { 0 };
            img.put_pixel(x, y, Rgb([v, v, v]));
        }
    }
    DynamicImage::ImageRgb8(img)
}
