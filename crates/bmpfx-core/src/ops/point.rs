//! Negative, brightness, grayscale, and threshold.
//!
//! Each operation visits every pixel once, in place, without reading
//! neighbors.

use crate::error::{BmpError, Result};
use crate::image::Image;

/// Invert every channel: `c ← 255 − c`.
pub fn negative(image: &mut Image) {
    for c in image.bytes_mut() {
        *c = 255 - *c;
    }
}

/// Add `delta` to every channel, saturating at 0 and 255.
pub fn brightness(image: &mut Image, delta: i32) {
    if delta == 0 {
        return;
    }
    for c in image.bytes_mut() {
        *c = (*c as i32).saturating_add(delta).clamp(0, 255) as u8;
    }
}

/// Replace R, G, B with their rounded mean.
///
/// 8-bit images are already single-channel and are left unchanged.
pub fn grayscale(image: &mut Image) {
    let Some(pixels) = image.rgb_mut() else {
        return;
    };
    for px in pixels {
        let sum = px.r as u16 + px.g as u16 + px.b as u16;
        // A third is never exactly .5, so +1 before the division rounds to nearest.
        let avg = ((sum + 1) / 3) as u8;
        px.r = avg;
        px.g = avg;
        px.b = avg;
    }
}

/// Binarize an 8-bit image: `255` where `value ≥ level`, else `0`.
pub fn threshold(image: &mut Image, level: u8) -> Result<()> {
    let pixels = image
        .gray_mut()
        .ok_or_else(|| BmpError::parameter("threshold requires an 8-bit image"))?;
    for v in pixels {
        *v = if *v >= level { 255 } else { 0 };
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Rgb;

    fn gray_ramp() -> Image {
        Image::from_gray(4, 4, (0..16).map(|i| i * 17).collect()).unwrap()
    }

    fn colors() -> Image {
        Image::from_rgb(
            2,
            2,
            vec![
                Rgb::new(0, 128, 255),
                Rgb::new(10, 20, 30),
                Rgb::new(250, 5, 100),
                Rgb::new(1, 1, 2),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_negative_inverts_channels() {
        let mut img = colors();
        negative(&mut img);
        assert_eq!(img.rgb_at(0, 0), Some(Rgb::new(255, 127, 0)));
    }

    #[test]
    fn test_negative_twice_is_identity() {
        for original in [gray_ramp(), colors()] {
            let mut img = original.clone();
            negative(&mut img);
            negative(&mut img);
            assert_eq!(img.data(), original.data());
        }
    }

    #[test]
    fn test_brightness_zero_is_identity() {
        let original = colors();
        let mut img = original.clone();
        brightness(&mut img, 0);
        assert_eq!(img.data(), original.data());
    }

    #[test]
    fn test_brightness_saturates() {
        let mut img = colors();
        brightness(&mut img, 100);
        assert_eq!(img.rgb_at(0, 0), Some(Rgb::new(100, 228, 255)));

        let mut img = colors();
        brightness(&mut img, -100);
        assert_eq!(img.rgb_at(0, 1), Some(Rgb::new(150, 0, 0)));

        let mut img = gray_ramp();
        brightness(&mut img, i32::MIN);
        assert!(img.data().as_bytes().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_grayscale_rounds_mean() {
        let mut img = Image::from_rgb(
            3,
            1,
            vec![Rgb::new(1, 0, 0), Rgb::new(1, 1, 0), Rgb::new(0, 128, 255)],
        )
        .unwrap();
        grayscale(&mut img);
        assert_eq!(img.rgb_at(0, 0), Some(Rgb::splat(0)));
        assert_eq!(img.rgb_at(1, 0), Some(Rgb::splat(1)));
        assert_eq!(img.rgb_at(2, 0), Some(Rgb::splat(128)));
    }

    #[test]
    fn test_grayscale_leaves_gray_images_alone() {
        let original = gray_ramp();
        let mut img = original.clone();
        grayscale(&mut img);
        assert_eq!(img.data(), original.data());
    }

    #[test]
    fn test_threshold_binarizes_inclusively() {
        let mut img = Image::from_gray(3, 1, vec![99, 100, 101]).unwrap();
        threshold(&mut img, 100).unwrap();
        assert_eq!(img.data().as_bytes(), &[0, 255, 255]);
    }

    #[test]
    fn test_threshold_is_idempotent() {
        let mut once = gray_ramp();
        threshold(&mut once, 128).unwrap();
        let mut twice = once.clone();
        threshold(&mut twice, 128).unwrap();
        assert_eq!(once.data(), twice.data());
    }

    #[test]
    fn test_threshold_rejects_rgb() {
        let mut img = colors();
        assert!(matches!(threshold(&mut img, 10), Err(BmpError::Parameter(_))));
    }
}
