//! Square convolution kernels and the built-in presets.

use serde::{Deserialize, Serialize};

use crate::error::{BmpError, Result};

/// An odd-sized square matrix of weights, stored row-major.
///
/// Row `i`, column `j` weighs the source pixel at offset
/// `(j − radius, i − radius)` from the output pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    size: usize,
    weights: Vec<f32>,
}

impl Kernel {
    /// Build a `size × size` kernel from row-major weights.
    ///
    /// Fails with [`BmpError::Parameter`] for zero or even sizes, a weight
    /// count other than `size²`, or non-finite weights.
    pub fn new(size: usize, weights: Vec<f32>) -> Result<Self> {
        if size == 0 || size % 2 == 0 {
            return Err(BmpError::parameter(format!(
                "kernel size must be odd and positive, got {size}"
            )));
        }
        if size.checked_mul(size) != Some(weights.len()) {
            return Err(BmpError::parameter(format!(
                "{size}x{size} kernel needs {} weights, got {}",
                size.saturating_mul(size),
                weights.len()
            )));
        }
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(BmpError::parameter("kernel weights must be finite"));
        }
        Ok(Self { size, weights })
    }

    /// Build from a fixed array of rows.
    pub fn from_rows<const N: usize>(rows: [[f32; N]; N]) -> Result<Self> {
        Self::new(N, rows.iter().flatten().copied().collect())
    }

    /// Kernel that leaves every pixel unchanged.
    pub fn identity(size: usize) -> Result<Self> {
        let mut kernel = Self::new(size, vec![0.0; size.saturating_mul(size)])?;
        let center = kernel.radius() * size + kernel.radius();
        kernel.weights[center] = 1.0;
        Ok(kernel)
    }

    /// Side length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// `⌊size / 2⌋`.
    pub fn radius(&self) -> usize {
        self.size / 2
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    #[inline]
    pub fn weight(&self, row: usize, col: usize) -> f32 {
        self.weights[row * self.size + col]
    }

    /// Sum of all weights; 1.0 for brightness-preserving kernels.
    pub fn sum(&self) -> f32 {
        self.weights.iter().sum()
    }

    fn fixed<const N: usize>(rows: [[f32; N]; N], scale: f32) -> Self {
        Self {
            size: N,
            weights: rows.iter().flatten().map(|w| w * scale).collect(),
        }
    }
}

/// Built-in filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterPreset {
    /// 3×3 mean.
    BoxBlur,
    /// 5×5 binomial approximation of a Gaussian.
    GaussianBlur,
    /// 3×3 Laplacian edge detector.
    Outline,
    /// 3×3 directional relief.
    Emboss,
    /// 3×3 unsharp cross.
    Sharpen,
}

impl FilterPreset {
    /// Human-readable label for menus and logs.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::BoxBlur => "Box blur",
            Self::GaussianBlur => "Gaussian blur",
            Self::Outline => "Outline",
            Self::Emboss => "Emboss",
            Self::Sharpen => "Sharpen",
        }
    }

    pub fn all() -> &'static [Self] {
        const ALL: [FilterPreset; 5] = [
            FilterPreset::BoxBlur,
            FilterPreset::GaussianBlur,
            FilterPreset::Outline,
            FilterPreset::Emboss,
            FilterPreset::Sharpen,
        ];
        &ALL
    }

    /// The preset's coefficients.
    pub fn kernel(self) -> Kernel {
        match self {
            Self::BoxBlur => Kernel::fixed([[1.0; 3]; 3], 1.0 / 9.0),
            Self::GaussianBlur => Kernel::fixed(
                [
                    [1.0, 4.0, 6.0, 4.0, 1.0],
                    [4.0, 16.0, 24.0, 16.0, 4.0],
                    [6.0, 24.0, 36.0, 24.0, 6.0],
                    [4.0, 16.0, 24.0, 16.0, 4.0],
                    [1.0, 4.0, 6.0, 4.0, 1.0],
                ],
                1.0 / 256.0,
            ),
            Self::Outline => Kernel::fixed(
                [[-1.0, -1.0, -1.0], [-1.0, 8.0, -1.0], [-1.0, -1.0, -1.0]],
                1.0,
            ),
            Self::Emboss => Kernel::fixed(
                [[-2.0, -1.0, 0.0], [-1.0, 1.0, 1.0], [0.0, 1.0, 2.0]],
                1.0,
            ),
            Self::Sharpen => Kernel::fixed(
                [[0.0, -1.0, 0.0], [-1.0, 5.0, -1.0], [0.0, -1.0, 0.0]],
                1.0,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn test_kernel_rejects_even_and_zero_sizes() {
        assert!(matches!(Kernel::new(0, vec![]), Err(BmpError::Parameter(_))));
        assert!(matches!(
            Kernel::new(2, vec![0.25; 4]),
            Err(BmpError::Parameter(_))
        ));
        assert!(Kernel::from_rows([[1.0, 0.0], [0.0, 0.0]]).is_err());
    }

    #[test]
    fn test_kernel_rejects_wrong_weight_count() {
        assert!(Kernel::new(3, vec![0.0; 8]).is_err());
    }

    #[test]
    fn test_kernel_rejects_nan() {
        assert!(Kernel::new(1, vec![f32::NAN]).is_err());
    }

    #[test]
    fn test_identity_has_single_center_weight() {
        let k = Kernel::identity(5).unwrap();
        assert_eq!(k.radius(), 2);
        assert_eq!(k.weight(2, 2), 1.0);
        assert!((k.sum() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_blur_presets_preserve_brightness() {
        for preset in [FilterPreset::BoxBlur, FilterPreset::GaussianBlur] {
            let sum = preset.kernel().sum();
            assert!((sum - 1.0).abs() < 1e-5, "{}: sum {sum}", preset.label());
        }
    }

    #[test]
    fn test_preset_coefficients() {
        let gauss = FilterPreset::GaussianBlur.kernel();
        assert_eq!(gauss.size(), 5);
        assert!((gauss.weight(2, 2) - 36.0 / 256.0).abs() < EPSILON);
        assert!((gauss.weight(0, 1) - 4.0 / 256.0).abs() < EPSILON);

        let emboss = FilterPreset::Emboss.kernel();
        assert_eq!(emboss.weight(0, 0), -2.0);
        assert_eq!(emboss.weight(2, 2), 2.0);
        assert_eq!(FilterPreset::Outline.kernel().weight(1, 1), 8.0);
        assert_eq!(FilterPreset::Sharpen.kernel().weight(1, 1), 5.0);
        assert!((FilterPreset::Outline.kernel().sum()).abs() < EPSILON);
    }

    #[test]
    fn test_preset_serde_names() {
        let json = serde_json::to_string(&FilterPreset::GaussianBlur).unwrap();
        assert_eq!(json, "\"gaussian_blur\"");
        let back: FilterPreset = serde_json::from_str("\"box_blur\"").unwrap();
        assert_eq!(back, FilterPreset::BoxBlur);
        assert_eq!(FilterPreset::all().len(), 5);
    }
}
