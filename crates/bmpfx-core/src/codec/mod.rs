//! BMP codec: uncompressed 8-bit palettized and 24-bit bitmaps.
//!
//! Decoding honors both row orientations (bottom-up by default, top-down
//! when the DIB height is negative). Encoding always writes standard
//! bottom-up files with freshly computed size fields.

pub mod decode;
pub mod encode;
pub mod header;

pub use decode::{decode_from, load};
pub use encode::{encode_to, save};
pub use header::{BmpHeaders, FileHeader, InfoHeader};
