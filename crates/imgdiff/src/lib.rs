//! Perceptual "difference hash" fingerprints.
//!
//! A [`Fingerprint`] summarises the coarse structure of an image in 64 bits:
//! the image is shrunk to a 9×8 grayscale grid and each bit records whether a
//! pixel is darker than its right-hand neighbour. Fingerprints survive mild
//! rescaling and recompression but change when the picture's content does,
//! which is what scene-boundary detection needs.
//!
//! ```
//! use folio_imgdiff::{Fingerprint, fingerprint};
//! use image::{DynamicImage, RgbImage};
//!
//! let flat = DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 32, image::Rgb([40, 40, 40])));
//! let hash = fingerprint(&flat);
//! assert_eq!(hash, Fingerprint::new(0));
//! assert_eq!(hash.distance(&hash), 0);
//! ```

mod construct;
mod dhash;
pub mod error;

pub use crate::dhash::fingerprint;

/// Width of the sampling grid. One column wider than the number of
/// comparisons per row.
pub const GRID_WIDTH: u32 = 9;
/// Height of the sampling grid.
pub const GRID_HEIGHT: u32 = 8;
/// Number of bits in a [`Fingerprint`].
pub const BITS: u32 = u64::BITS;

const _: () = assert!((GRID_WIDTH - 1) * GRID_HEIGHT <= BITS, "sampling grid does not fit in a u64");

/// 64-bit perceptual difference hash of one decoded image.
///
/// Bit `row * 8 + col` is set when the pixel at `(col + 1, row)` of the
/// sampling grid is strictly brighter than the pixel at `(col, row)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Fingerprint(u64);

impl Fingerprint {
    #[inline]
    #[must_use]
    pub const fn new(bits: u64) -> Self {
        Self(bits)
    }

    /// Raw bit vector.
    #[inline]
    #[must_use]
    pub const fn bits(&self) -> u64 {
        self.0
    }

    /// Hamming distance between two fingerprints, in `[0, 64]`.
    #[inline]
    #[must_use]
    pub const fn distance(&self, other: &Self) -> u32 {
        (self.0 ^ other.0).count_ones()
    }

    /// Hamming distance divided by the bit width, in `[0.0, 1.0]`.
    #[inline]
    #[must_use]
    pub fn normalized_distance(&self, other: &Self) -> f32 {
        self.distance(other) as f32 / BITS as f32
    }
}
