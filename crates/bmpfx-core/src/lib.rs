//! bmpfx Core: uncompressed BMP codec and pixel-transform engines.
//!
//! This crate decodes and encodes 8-bit (palettized grayscale) and 24-bit
//! Windows bitmaps, and transforms them in place: point operations,
//! kernel convolution, and histogram equalization. No I/O happens outside
//! the codec; every engine works on an owned [`Image`].

pub mod codec;
pub mod equalize;
pub mod error;
pub mod filter;
pub mod image;
pub mod ops;
pub mod pipeline;

// Re-exports for convenience.
pub use codec::{decode_from, encode_to, load, save};
pub use equalize::{Histogram, equalize};
pub use error::{BmpError, Result};
pub use filter::{FilterPreset, Kernel, apply_kernel, apply_preset};
pub use crate::image::{BitDepth, Image, ImageInfo, Palette, PixelData, Rgb};
pub use ops::{brightness, grayscale, negative, threshold};
pub use pipeline::{Operation, Pipeline};
