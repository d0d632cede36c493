//! Kernel convolution with edge clamping.
//!
//! # Algorithm
//! For every output pixel `(x, y)` and channel:
//! ```text
//! out = Σ kernel[i + r][j + r] × in[clamp(y + i)][clamp(x + j)]     i, j ∈ [−r, r]
//! ```
//! Out-of-range coordinates snap to the nearest edge pixel, so borders
//! are neither wrapped nor darkened. The sum is rounded half away from
//! zero and clamped to `[0, 255]`.
//!
//! Reads come only from the untouched source buffer; results go to a
//! separate buffer that replaces the image's pixels in one step.
//!
//! # Complexity
//! O(width × height × size² × channels)

use crate::error::Result;
use crate::filter::kernel::Kernel;
use crate::image::Image;

/// Convolve `image` with `kernel`, in place.
///
/// On allocation failure the image is left untouched.
pub fn apply_kernel(image: &mut Image, kernel: &Kernel) -> Result<()> {
    tracing::debug!(
        "convolving {}x{} {} image with {}x{} kernel",
        image.width(),
        image.height(),
        image.bit_depth(),
        kernel.size(),
        kernel.size()
    );

    let mut out = image.data().try_blank_like()?;
    let plane = Plane {
        width: image.width() as usize,
        height: image.height() as usize,
        channels: image.bit_depth().bytes_per_pixel(),
    };
    convolve_into(image.data().as_bytes(), out.as_bytes_mut(), plane, kernel);
    image.replace_data(out);
    Ok(())
}

/// Geometry of an interleaved 8-bit buffer.
#[derive(Debug, Clone, Copy)]
struct Plane {
    width: usize,
    height: usize,
    channels: usize,
}

impl Plane {
    fn row_len(&self) -> usize {
        self.width * self.channels
    }
}

fn convolve_into(src: &[u8], dst: &mut [u8], plane: Plane, kernel: &Kernel) {
    debug_assert_eq!(src.len(), dst.len());
    let row_len = plane.row_len();
    let run = |(y, out_row): (usize, &mut [u8])| convolve_row(src, out_row, y, plane, kernel);

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        dst.par_chunks_mut(row_len).enumerate().for_each(run);
    }
    #[cfg(not(feature = "parallel"))]
    dst.chunks_mut(row_len).enumerate().for_each(run);
}

fn convolve_row(src: &[u8], out_row: &mut [u8], y: usize, plane: Plane, kernel: &Kernel) {
    let r = kernel.radius() as isize;
    let size = kernel.size();
    let row_len = plane.row_len();
    let max_x = plane.width as isize - 1;
    let max_y = plane.height as isize - 1;

    for x in 0..plane.width {
        let mut acc = [0.0_f32; 3];
        for ky in 0..size {
            let sy = (y as isize + ky as isize - r).clamp(0, max_y) as usize;
            let src_row = &src[sy * row_len..(sy + 1) * row_len];
            for kx in 0..size {
                let weight = kernel.weight(ky, kx);
                let sx = (x as isize + kx as isize - r).clamp(0, max_x) as usize;
                let px = &src_row[sx * plane.channels..(sx + 1) * plane.channels];
                for (sum, &c) in acc.iter_mut().zip(px) {
                    *sum += weight * c as f32;
                }
            }
        }
        let out = &mut out_row[x * plane.channels..(x + 1) * plane.channels];
        for (o, sum) in out.iter_mut().zip(acc) {
            *o = sum.round().clamp(0.0, 255.0) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::kernel::FilterPreset;
    use crate::image::{BitDepth, Rgb};

    fn gradient_rgb(width: u32, height: u32) -> Image {
        let mut pixels = Vec::new();
        for y in 0..height {
            for x in 0..width {
                pixels.push(Rgb::new((x * 40) as u8, (y * 50) as u8, ((x + y) * 20) as u8));
            }
        }
        Image::from_rgb(width, height, pixels).unwrap()
    }

    #[test]
    fn test_identity_kernel_is_identity() {
        let kernel = Kernel::from_rows([[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]]).unwrap();
        let original = gradient_rgb(5, 4);
        let mut img = original.clone();
        apply_kernel(&mut img, &kernel).unwrap();
        assert_eq!(img.data(), original.data());
    }

    #[test]
    fn test_box_blur_of_uniform_image_is_unchanged() {
        for depth in [BitDepth::Gray8, BitDepth::Rgb24] {
            let mut img = Image::allocate(6, 5, depth).unwrap();
            img.bytes_mut().fill(137);
            apply_kernel(&mut img, &FilterPreset::BoxBlur.kernel()).unwrap();
            assert!(img.data().as_bytes().iter().all(|&v| v == 137), "{depth}");
        }
    }

    #[test]
    fn test_gaussian_blur_of_uniform_image_is_unchanged() {
        let mut img = Image::from_rgb(7, 3, vec![Rgb::new(10, 200, 99); 21]).unwrap();
        apply_kernel(&mut img, &FilterPreset::GaussianBlur.kernel()).unwrap();
        assert!(img.rgb_mut().unwrap().iter().all(|&p| p == Rgb::new(10, 200, 99)));
    }

    #[test]
    fn test_edges_are_clamped_not_zero_padded() {
        // A zero-padded blur would darken the single pixel to 255/9.
        let mut img = Image::from_gray(1, 1, vec![255]).unwrap();
        apply_kernel(&mut img, &FilterPreset::BoxBlur.kernel()).unwrap();
        assert_eq!(img.gray_at(0, 0), Some(255));
    }

    #[test]
    fn test_reads_come_from_unmodified_source() {
        // Shift kernel: each pixel takes its left neighbor's value.
        let kernel = Kernel::from_rows([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 0.0]]).unwrap();
        let mut img = Image::from_gray(4, 1, vec![10, 20, 30, 40]).unwrap();
        apply_kernel(&mut img, &kernel).unwrap();
        // An in-place pass would smear 10 across the whole row.
        assert_eq!(img.data().as_bytes(), &[10, 10, 20, 30]);
    }

    #[test]
    fn test_box_blur_averages_neighbors() {
        let mut img = Image::from_gray(3, 3, vec![0, 0, 0, 0, 90, 0, 0, 0, 0]).unwrap();
        apply_kernel(&mut img, &FilterPreset::BoxBlur.kernel()).unwrap();
        assert!(img.data().as_bytes().iter().all(|&v| v == 10));
    }

    #[test]
    fn test_outline_clamps_negative_sums() {
        let mut img = Image::from_gray(3, 3, vec![0, 0, 0, 0, 50, 0, 0, 0, 0]).unwrap();
        apply_kernel(&mut img, &FilterPreset::Outline.kernel()).unwrap();
        assert_eq!(img.gray_at(1, 1), Some(255));
        assert_eq!(img.gray_at(0, 0), Some(0));
    }

    #[test]
    fn test_sum_is_rounded_to_nearest() {
        // 0.5 × 3 = 1.5 rounds away from zero.
        let kernel = Kernel::new(1, vec![0.5]).unwrap();
        let mut img = Image::from_gray(2, 1, vec![3, 5]).unwrap();
        apply_kernel(&mut img, &kernel).unwrap();
        assert_eq!(img.data().as_bytes(), &[2, 3]);
    }

    #[test]
    fn test_channels_are_independent() {
        let mut img = gradient_rgb(4, 4);
        let reds: Vec<u8> = img.rgb_mut().unwrap().iter().map(|p| p.r).collect();
        let mut red_only = Image::from_gray(4, 4, reds).unwrap();
        let kernel = FilterPreset::Sharpen.kernel();
        apply_kernel(&mut img, &kernel).unwrap();
        apply_kernel(&mut red_only, &kernel).unwrap();
        for (rgb, gray) in img.rgb_mut().unwrap().iter().zip(red_only.data().as_bytes()) {
            assert_eq!(rgb.r, *gray);
        }
    }
}
