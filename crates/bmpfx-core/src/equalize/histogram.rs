//! Intensity histograms, cumulative distributions, and equalization tables.
//!
//! # Algorithm
//! ```text
//! cdf[i]  = Σ_{k ≤ i} hist[k]
//! cdf_min = first non-zero cdf[i]
//! map[v]  = round((cdf[v] − cdf_min) / (total − cdf_min) × 255)
//! ```
//! When `total == cdf_min` (every pixel falls in one bin) the table is
//! the identity.

use serde::Serialize;

use crate::equalize::luma;
use crate::image::Rgb;

/// Number of intensity bins.
pub const BINS: usize = 256;

/// Chunk size for parallel counting.
#[cfg(feature = "parallel")]
const CHUNK: usize = 1 << 14;

/// Pixel counts per 8-bit intensity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Histogram {
    bins: Vec<u64>,
}

impl Histogram {
    /// Count the values of an 8-bit image.
    pub fn of_gray(pixels: &[u8]) -> Self {
        count(pixels, |&v| v)
    }

    /// Count the rounded luma (`Y`) of a 24-bit image.
    pub fn of_luma(pixels: &[Rgb]) -> Self {
        count(pixels, |&px| luma::luma_index(luma::rgb_to_yuv(px).x))
    }

    /// Bin counts, indexed by intensity.
    pub fn bins(&self) -> &[u64] {
        &self.bins
    }

    /// Number of pixels counted.
    pub fn total(&self) -> u64 {
        self.bins.iter().sum()
    }

    /// Running sum of the bins.
    pub fn cdf(&self) -> [u64; BINS] {
        let mut cdf = [0u64; BINS];
        let mut running = 0u64;
        for (out, &count) in cdf.iter_mut().zip(&self.bins) {
            running += count;
            *out = running;
        }
        cdf
    }

    /// Smallest non-zero CDF value; `None` for an empty histogram.
    pub fn cdf_min(&self) -> Option<u64> {
        self.bins.iter().copied().find(|&count| count > 0)
    }

    /// Lookup table that spreads the CDF over `[0, 255]`.
    pub fn equalization_lut(&self) -> [u8; BINS] {
        let total = self.total();
        let cdf_min = match self.cdf_min() {
            Some(min) if min < total => min,
            _ => return identity_lut(),
        };

        let span = (total - cdf_min) as f64;
        let mut lut = [0u8; BINS];
        for (out, &c) in lut.iter_mut().zip(self.cdf().iter()) {
            // Bins below the first occupied one go negative and clamp to 0.
            let scaled = (c as f64 - cdf_min as f64) / span * 255.0;
            *out = scaled.round().clamp(0.0, 255.0) as u8;
        }
        lut
    }
}

fn identity_lut() -> [u8; BINS] {
    let mut lut = [0u8; BINS];
    for (i, v) in lut.iter_mut().enumerate() {
        *v = i as u8;
    }
    lut
}

#[cfg(not(feature = "parallel"))]
fn count<T>(items: &[T], key: impl Fn(&T) -> u8) -> Histogram {
    let mut bins = vec![0u64; BINS];
    for item in items {
        bins[key(item) as usize] += 1;
    }
    Histogram { bins }
}

/// Per-worker partial histograms merged by a reduce.
#[cfg(feature = "parallel")]
fn count<T: Sync>(items: &[T], key: impl Fn(&T) -> u8 + Sync) -> Histogram {
    use rayon::prelude::*;

    let bins = items
        .par_chunks(CHUNK)
        .fold(
            || vec![0u64; BINS],
            |mut acc, chunk| {
                for item in chunk {
                    acc[key(item) as usize] += 1;
                }
                acc
            },
        )
        .reduce(
            || vec![0u64; BINS],
            |mut a, b| {
                for (x, y) in a.iter_mut().zip(b) {
                    *x += y;
                }
                a
            },
        );
    Histogram { bins }
}
