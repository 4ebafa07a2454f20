use crate::{Fingerprint, GRID_HEIGHT, GRID_WIDTH};
use image::DynamicImage;
use image::imageops::FilterType;
use tracing::instrument;

// Fixed-point ITU-R BT.601 luma weights (0.299, 0.587, 0.114) scaled by 2^16.
const LUMA_RED: u32 = 19595;
const LUMA_GREEN: u32 = 38470;
const LUMA_BLUE: u32 = 7471;
const LUMA_ROUNDING: u32 = 1 << 15;

/// Compute the difference hash of a decoded image.
///
/// The image is resampled to a 9×8 grid with a triangle (bilinear) filter,
/// converted to luma, and each row contributes eight "is the next pixel
/// brighter" bits. Pure and deterministic: the same pixels always produce the
/// same fingerprint.
///
/// # Panics
///
/// Panics if the image has zero width or height. Container decoding rejects
/// such images, so reaching this with one is a bug in the caller.
#[must_use]
#[instrument(level = "trace", skip(image), fields(width = image.width(), height = image.height()))]
pub fn fingerprint(image: &DynamicImage) -> Fingerprint {
    assert!(
        image.width() > 0 && image.height() > 0,
        "cannot fingerprint a {}x{} image",
        image.width(),
        image.height()
    );
    let grid = image.resize_exact(GRID_WIDTH, GRID_HEIGHT, FilterType::Triangle).to_rgb8();
    let mut bits = 0u64;
    for row in 0..GRID_HEIGHT {
        for col in 0..GRID_WIDTH - 1 {
            if luma(grid.get_pixel(col + 1, row).0) > luma(grid.get_pixel(col, row).0) {
                bits |= 1 << (row * (GRID_WIDTH - 1) + col);
            }
        }
    }
    Fingerprint::new(bits)
}

#[inline]
fn luma([r, g, b]: [u8; 3]) -> u8 {
    // Weights sum to 2^16, so the shifted result always fits in a byte.
    ((LUMA_RED * r as u32 + LUMA_GREEN * g as u32 + LUMA_BLUE * b as u32 + LUMA_ROUNDING) >> 16) as u8
}
