//! Luma/chroma (Y/U/V) conversion for color-preserving equalization.
//!
//! Equalizing R, G, B independently shifts hue. Instead, only `Y` is
//! remapped and `U`, `V` are carried through unchanged.
//!
//! ```text
//! Y =  0.299   R + 0.587   G + 0.114   B
//! U = −0.14713 R − 0.28886 G + 0.436   B
//! V =  0.615   R − 0.51499 G − 0.10001 B
//!
//! R = Y             + 1.13983 V
//! G = Y − 0.39465 U − 0.58060 V
//! B = Y + 2.03211 U
//! ```

use glam::{Mat3, Vec3};

use crate::equalize::histogram::Histogram;
use crate::image::Rgb;

/// RGB → YUV, columns are the R, G, B coefficients.
pub const RGB_TO_YUV: Mat3 = Mat3::from_cols(
    Vec3::new(0.299, -0.14713, 0.615),
    Vec3::new(0.587, -0.28886, -0.51499),
    Vec3::new(0.114, 0.436, -0.10001),
);

/// YUV → RGB, columns are the Y, U, V coefficients.
pub const YUV_TO_RGB: Mat3 = Mat3::from_cols(
    Vec3::new(1.0, 1.0, 1.0),
    Vec3::new(0.0, -0.39465, 2.03211),
    Vec3::new(1.13983, -0.58060, 0.0),
);

/// Convert a pixel to `(Y, U, V)` on the 0..255 scale.
#[inline]
pub fn rgb_to_yuv(px: Rgb) -> Vec3 {
    RGB_TO_YUV * Vec3::new(px.r as f32, px.g as f32, px.b as f32)
}

/// Convert back, rounding and clamping each channel.
#[inline]
pub fn yuv_to_rgb(yuv: Vec3) -> Rgb {
    let rgb = YUV_TO_RGB * yuv;
    Rgb::new(to_channel(rgb.x), to_channel(rgb.y), to_channel(rgb.z))
}

/// Histogram bin of a luma value.
#[inline]
pub fn luma_index(y: f32) -> u8 {
    to_channel(y)
}

#[inline]
fn to_channel(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Equalize the luma of a 24-bit buffer, keeping chroma.
pub(crate) fn equalize_rgb(pixels: &mut [Rgb]) {
    let lut = Histogram::of_luma(pixels).equalization_lut();
    let remap = |px: &mut Rgb| {
        let yuv = rgb_to_yuv(*px);
        let y = lut[luma_index(yuv.x) as usize] as f32;
        *px = yuv_to_rgb(Vec3::new(y, yuv.y, yuv.z));
    };

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        pixels.par_iter_mut().for_each(remap);
    }
    #[cfg(not(feature = "parallel"))]
    pixels.iter_mut().for_each(remap);
}
