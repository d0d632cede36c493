//! Serializable processing pipelines.
//!
//! A pipeline is an ordered list of operations, usually read from JSON:
//!
//! ```json
//! { "steps": [
//!     { "op": "brightness", "delta": 20 },
//!     { "op": "filter", "preset": "gaussian_blur" },
//!     { "op": "equalize" }
//! ] }
//! ```
//!
//! Each step is atomic. A failing step stops the run; the image keeps the
//! result of every step before it.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::equalize::equalize;
use crate::error::Result;
use crate::filter::{FilterPreset, Kernel, apply_kernel, apply_preset};
use crate::image::Image;
use crate::ops;

/// One processing step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    Negative,
    Brightness { delta: i32 },
    Grayscale,
    Threshold { level: u8 },
    Filter { preset: FilterPreset },
    /// Custom `size × size` kernel, row-major weights.
    Kernel { size: usize, weights: Vec<f32> },
    Equalize,
}

impl Operation {
    /// Apply this step to `image`.
    pub fn apply(&self, image: &mut Image) -> Result<()> {
        match self {
            Self::Negative => ops::negative(image),
            Self::Brightness { delta } => ops::brightness(image, *delta),
            Self::Grayscale => ops::grayscale(image),
            Self::Threshold { level } => ops::threshold(image, *level)?,
            Self::Filter { preset } => apply_preset(image, *preset)?,
            Self::Kernel { size, weights } => {
                let kernel = Kernel::new(*size, weights.clone())?;
                apply_kernel(image, &kernel)?;
            }
            Self::Equalize => equalize(image),
        }
        Ok(())
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Negative => "negative",
            Self::Brightness { .. } => "brightness",
            Self::Grayscale => "grayscale",
            Self::Threshold { .. } => "threshold",
            Self::Filter { preset } => preset.label(),
            Self::Kernel { .. } => "kernel",
            Self::Equalize => "equalize",
        }
    }
}

/// An ordered list of operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub steps: Vec<Operation>,
}

impl Pipeline {
    pub fn new(steps: Vec<Operation>) -> Self {
        Self { steps }
    }

    /// Parse a pipeline from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read a pipeline from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Pretty-printed JSON form.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Run every step in order.
    pub fn run(&self, image: &mut Image) -> Result<()> {
        for (i, step) in self.steps.iter().enumerate() {
            tracing::debug!("pipeline step {}/{}: {}", i + 1, self.steps.len(), step.name());
            if let Err(e) = step.apply(image) {
                tracing::warn!("pipeline step {} ({}) failed: {e}", i + 1, step.name());
                return Err(e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BmpError;

    #[test]
    fn test_operation_json_tags() {
        let op: Operation = serde_json::from_str(r#"{"op":"threshold","level":128}"#).unwrap();
        assert_eq!(op, Operation::Threshold { level: 128 });

        let op: Operation =
            serde_json::from_str(r#"{"op":"filter","preset":"sharpen"}"#).unwrap();
        assert_eq!(op, Operation::Filter { preset: FilterPreset::Sharpen });

        let json = serde_json::to_string(&Operation::Equalize).unwrap();
        assert_eq!(json, r#"{"op":"equalize"}"#);
    }

    #[test]
    fn test_unknown_operation_is_config_error() {
        let err = Pipeline::from_json(r#"{"steps":[{"op":"posterize"}]}"#).unwrap_err();
        assert!(matches!(err, BmpError::Config(_)));
    }

    #[test]
    fn test_json_roundtrip() {
        let pipeline = Pipeline::new(vec![
            Operation::Brightness { delta: -15 },
            Operation::Kernel { size: 1, weights: vec![1.0] },
            Operation::Grayscale,
        ]);
        let text = pipeline.to_json().unwrap();
        assert_eq!(Pipeline::from_json(&text).unwrap(), pipeline);
    }

    #[test]
    fn test_run_applies_steps_in_order() {
        let mut img = Image::from_gray(2, 1, vec![100, 200]).unwrap();
        let pipeline = Pipeline::new(vec![
            Operation::Brightness { delta: 50 },
            Operation::Threshold { level: 200 },
            Operation::Negative,
        ]);
        pipeline.run(&mut img).unwrap();
        assert_eq!(img.data().as_bytes(), &[255, 0]);
    }

    #[test]
    fn test_failing_step_keeps_earlier_results() {
        let mut img = Image::from_gray(1, 1, vec![10]).unwrap();
        let pipeline = Pipeline::new(vec![
            Operation::Negative,
            Operation::Kernel { size: 2, weights: vec![0.25; 4] },
            Operation::Negative,
        ]);
        let err = pipeline.run(&mut img).unwrap_err();
        assert!(matches!(err, BmpError::Parameter(_)));
        assert_eq!(img.gray_at(0, 0), Some(245));
    }
}
