//! Point operations: stateless per-pixel transforms.

pub mod point;

pub use point::{brightness, grayscale, negative, threshold};
