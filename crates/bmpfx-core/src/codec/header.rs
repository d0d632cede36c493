//! Fixed-layout BMP file header (14 bytes) and DIB info header (40 bytes).
//!
//! All multi-byte fields are little-endian. Layout:
//!
//! ```text
//! file header   signature[2] file_size:u32 reserved1:u16 reserved2:u16 pixel_offset:u32
//! info header   header_size:u32 width:i32 height:i32 planes:u16 bit_count:u16
//!               compression:u32 image_size:u32 x_res:i32 y_res:i32
//!               colors_used:u32 colors_important:u32
//! ```

use crate::image::{BitDepth, Palette};

/// Size of the file header on disk.
pub const FILE_HEADER_LEN: usize = 14;
/// Size of the BITMAPINFOHEADER on disk.
pub const INFO_HEADER_LEN: usize = 40;
/// ASCII `"BM"`.
pub const SIGNATURE: [u8; 2] = *b"BM";
/// Pixels per meter, about 72 DPI.
pub const DEFAULT_RESOLUTION: i32 = 2835;
/// `BI_RGB`, the only supported compression.
pub const COMPRESSION_NONE: u32 = 0;

/// The 14-byte file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub signature: [u8; 2],
    /// Declared size of the whole file.
    pub file_size: u32,
    pub reserved1: u16,
    pub reserved2: u16,
    /// Byte offset of the first pixel row.
    pub pixel_offset: u32,
}

impl FileHeader {
    pub fn parse(bytes: &[u8; FILE_HEADER_LEN]) -> Self {
        Self {
            signature: [bytes[0], bytes[1]],
            file_size: le_u32(bytes, 2),
            reserved1: le_u16(bytes, 6),
            reserved2: le_u16(bytes, 8),
            pixel_offset: le_u32(bytes, 10),
        }
    }

    pub fn to_bytes(&self) -> [u8; FILE_HEADER_LEN] {
        let mut out = [0u8; FILE_HEADER_LEN];
        let mut w = FieldWriter::new(&mut out);
        w.put(&self.signature);
        w.put(&self.file_size.to_le_bytes());
        w.put(&self.reserved1.to_le_bytes());
        w.put(&self.reserved2.to_le_bytes());
        w.put(&self.pixel_offset.to_le_bytes());
        out
    }
}

/// The 40-byte DIB info header (BITMAPINFOHEADER).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoHeader {
    pub header_size: u32,
    pub width: i32,
    /// Negative means rows are stored top-to-bottom.
    pub height: i32,
    pub planes: u16,
    pub bit_count: u16,
    pub compression: u32,
    pub image_size: u32,
    pub x_resolution: i32,
    pub y_resolution: i32,
    pub colors_used: u32,
    pub colors_important: u32,
}

impl InfoHeader {
    pub fn parse(bytes: &[u8; INFO_HEADER_LEN]) -> Self {
        Self {
            header_size: le_u32(bytes, 0),
            width: le_i32(bytes, 4),
            height: le_i32(bytes, 8),
            planes: le_u16(bytes, 12),
            bit_count: le_u16(bytes, 14),
            compression: le_u32(bytes, 16),
            image_size: le_u32(bytes, 20),
            x_resolution: le_i32(bytes, 24),
            y_resolution: le_i32(bytes, 28),
            colors_used: le_u32(bytes, 32),
            colors_important: le_u32(bytes, 36),
        }
    }

    pub fn to_bytes(&self) -> [u8; INFO_HEADER_LEN] {
        let mut out = [0u8; INFO_HEADER_LEN];
        let mut w = FieldWriter::new(&mut out);
        w.put(&self.header_size.to_le_bytes());
        w.put(&self.width.to_le_bytes());
        w.put(&self.height.to_le_bytes());
        w.put(&self.planes.to_le_bytes());
        w.put(&self.bit_count.to_le_bytes());
        w.put(&self.compression.to_le_bytes());
        w.put(&self.image_size.to_le_bytes());
        w.put(&self.x_resolution.to_le_bytes());
        w.put(&self.y_resolution.to_le_bytes());
        w.put(&self.colors_used.to_le_bytes());
        w.put(&self.colors_important.to_le_bytes());
        out
    }

    /// Rows are stored top-to-bottom (negative height).
    pub fn is_top_down(&self) -> bool {
        self.height < 0
    }

    /// Row count regardless of orientation.
    pub fn abs_height(&self) -> u32 {
        self.height.unsigned_abs()
    }
}

/// Both headers as read from disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BmpHeaders {
    pub file: FileHeader,
    pub info: InfoHeader,
}

/// Padding bytes appended to each row: `(4 - (width * bpp) mod 4) mod 4`.
pub fn row_padding(width: u32, depth: BitDepth) -> u64 {
    let row = width as u64 * depth.bytes_per_pixel() as u64;
    (4 - row % 4) % 4
}

/// Bytes per row on disk, padded to a multiple of 4.
pub fn row_stride(width: u32, depth: BitDepth) -> u64 {
    width as u64 * depth.bytes_per_pixel() as u64 + row_padding(width, depth)
}

/// Offset of the pixel array in a file written by this crate.
pub fn pixel_data_offset(depth: BitDepth) -> u32 {
    let base = (FILE_HEADER_LEN + INFO_HEADER_LEN) as u32;
    match depth {
        BitDepth::Gray8 => base + Palette::BYTE_LEN as u32,
        BitDepth::Rgb24 => base,
    }
}

fn le_u16(b: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([b[at], b[at + 1]])
}

fn le_u32(b: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]])
}

fn le_i32(b: &[u8], at: usize) -> i32 {
    i32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]])
}

/// Sequential writer into a fixed header buffer.
struct FieldWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> FieldWriter<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn put(&mut self, bytes: &[u8]) {
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_info() -> InfoHeader {
        InfoHeader {
            header_size: 40,
            width: 3,
            height: -2,
            planes: 1,
            bit_count: 24,
            compression: 0,
            image_size: 24,
            x_resolution: DEFAULT_RESOLUTION,
            y_resolution: DEFAULT_RESOLUTION,
            colors_used: 0,
            colors_important: 0,
        }
    }

    #[test]
    fn test_file_header_layout() {
        let header = FileHeader {
            signature: SIGNATURE,
            file_size: 0x0102_0304,
            reserved1: 0,
            reserved2: 0,
            pixel_offset: 54,
        };
        let bytes = header.to_bytes();
        assert_eq!(&bytes[0..2], b"BM");
        assert_eq!(&bytes[2..6], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&bytes[10..14], &[54, 0, 0, 0]);
        assert_eq!(FileHeader::parse(&bytes), header);
    }

    #[test]
    fn test_info_header_negative_height_is_top_down() {
        let info = sample_info();
        let bytes = info.to_bytes();
        assert_eq!(&bytes[8..12], &(-2i32).to_le_bytes());
        assert_eq!(le_u16(&bytes, 14), 24);
        let parsed = InfoHeader::parse(&bytes);
        assert!(parsed.is_top_down());
        assert_eq!(parsed.abs_height(), 2);
        assert_eq!(parsed, info);
    }

    #[test]
    fn test_row_padding_aligns_to_four_bytes() {
        assert_eq!(row_padding(1, BitDepth::Rgb24), 1);
        assert_eq!(row_padding(2, BitDepth::Rgb24), 2);
        assert_eq!(row_padding(3, BitDepth::Rgb24), 3);
        assert_eq!(row_padding(4, BitDepth::Rgb24), 0);
        assert_eq!(row_padding(5, BitDepth::Gray8), 3);
        assert_eq!(row_padding(8, BitDepth::Gray8), 0);
        assert_eq!(row_stride(5, BitDepth::Rgb24), 16);
        assert_eq!(row_stride(1, BitDepth::Gray8), 4);
    }

    #[test]
    fn test_pixel_data_offset_includes_palette_for_gray() {
        assert_eq!(pixel_data_offset(BitDepth::Rgb24), 54);
        assert_eq!(pixel_data_offset(BitDepth::Gray8), 1078);
    }
}
