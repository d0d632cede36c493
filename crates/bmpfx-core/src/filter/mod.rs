//! Convolution filters: generic kernels plus the five presets.

pub mod convolve;
pub mod kernel;

pub use convolve::apply_kernel;
pub use kernel::{FilterPreset, Kernel};

use crate::error::Result;
use crate::image::Image;

/// Apply one of the built-in filters.
pub fn apply_preset(image: &mut Image, preset: FilterPreset) -> Result<()> {
    apply_kernel(image, &preset.kernel())
}

pub fn box_blur(image: &mut Image) -> Result<()> {
    apply_preset(image, FilterPreset::BoxBlur)
}

pub fn gaussian_blur(image: &mut Image) -> Result<()> {
    apply_preset(image, FilterPreset::GaussianBlur)
}

pub fn outline(image: &mut Image) -> Result<()> {
    apply_preset(image, FilterPreset::Outline)
}

pub fn emboss(image: &mut Image) -> Result<()> {
    apply_preset(image, FilterPreset::Emboss)
}

pub fn sharpen(image: &mut Image) -> Result<()> {
    apply_preset(image, FilterPreset::Sharpen)
}
