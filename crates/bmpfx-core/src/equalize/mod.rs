//! Histogram equalization.
//!
//! 8-bit images remap intensities directly. 24-bit images remap only the
//! luma channel of a Y/U/V decomposition so hue and saturation survive.

pub mod histogram;
pub mod luma;

pub use histogram::Histogram;

use crate::image::{Image, PixelData};

/// Equalize `image` in place.
///
/// An image whose pixels all share one intensity (or luma) is left as is.
pub fn equalize(image: &mut Image) {
    tracing::debug!(
        "equalizing {}x{} {} image",
        image.width(),
        image.height(),
        image.bit_depth()
    );

    if let Some(pixels) = image.rgb_mut() {
        luma::equalize_rgb(pixels);
        return;
    }
    if let Some(pixels) = image.gray_mut() {
        equalize_gray(pixels);
    }
}

/// Per-bin histogram of an image: intensities for 8-bit, rounded luma for 24-bit.
pub fn histogram(image: &Image) -> Histogram {
    match image.data() {
        PixelData::Gray(pixels) => Histogram::of_gray(pixels),
        PixelData::Rgb(pixels) => Histogram::of_luma(pixels),
    }
}

fn equalize_gray(pixels: &mut [u8]) {
    let lut = Histogram::of_gray(pixels).equalization_lut();

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        pixels.par_iter_mut().for_each(|v| *v = lut[*v as usize]);
    }
    #[cfg(not(feature = "parallel"))]
    for v in pixels.iter_mut() {
        *v = lut[*v as usize];
    }
}
