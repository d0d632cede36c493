//! Image representation shared by the codec and the transform engines.
//!
//! Pixels are stored in one contiguous buffer, top row first, addressed as
//! `y * width + x`. 24-bit pixels are kept in R,G,B order regardless of the
//! B,G,R order used on disk.

use std::fmt;

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::codec::header::{self, BmpHeaders};
use crate::error::{BmpError, Result, try_filled};

/// Number of entries in an 8-bit palette.
pub const PALETTE_LEN: usize = 256;

/// Supported bit depths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BitDepth {
    /// One byte per pixel, intensity through a 256-entry palette.
    Gray8,
    /// Three bytes per pixel, R,G,B.
    Rgb24,
}

impl BitDepth {
    /// Value of the DIB `bit_count` field.
    pub const fn bits(self) -> u16 {
        match self {
            Self::Gray8 => 8,
            Self::Rgb24 => 24,
        }
    }

    /// Bytes occupied by one pixel.
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Gray8 => 1,
            Self::Rgb24 => 3,
        }
    }

    /// Map a DIB `bit_count` to a supported depth.
    pub fn from_bits(bits: u16) -> Option<Self> {
        match bits {
            8 => Some(Self::Gray8),
            24 => Some(Self::Rgb24),
            _ => None,
        }
    }
}

impl fmt::Display for BitDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gray8 => write!(f, "8-bit"),
            Self::Rgb24 => write!(f, "24-bit"),
        }
    }
}

/// A 24-bit pixel in R,G,B order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn splat(v: u8) -> Self {
        Self { r: v, g: v, b: v }
    }
}

/// Pixel storage, one variant per bit depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PixelData {
    Gray(Vec<u8>),
    Rgb(Vec<Rgb>),
}

impl PixelData {
    /// Number of pixels held.
    pub fn len(&self) -> usize {
        match self {
            Self::Gray(v) => v.len(),
            Self::Rgb(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bit_depth(&self) -> BitDepth {
        match self {
            Self::Gray(_) => BitDepth::Gray8,
            Self::Rgb(_) => BitDepth::Rgb24,
        }
    }

    /// Raw channel bytes, `bytes_per_pixel` per pixel.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Gray(v) => v,
            Self::Rgb(v) => bytemuck::cast_slice(v),
        }
    }

    /// Mutable raw channel bytes, `bytes_per_pixel` per pixel.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        match self {
            Self::Gray(v) => v,
            Self::Rgb(v) => bytemuck::cast_slice_mut(v),
        }
    }

    /// A zeroed buffer of the same variant and length.
    pub(crate) fn try_blank_like(&self) -> Result<Self> {
        Ok(match self {
            Self::Gray(v) => Self::Gray(try_filled(v.len(), 0u8)?),
            Self::Rgb(v) => Self::Rgb(try_filled(v.len(), Rgb::default())?),
        })
    }
}

/// 256-entry palette of raw 4-byte records (B, G, R, reserved on disk).
///
/// Preserved verbatim between load and save; never interpreted by filters.
#[derive(Clone, PartialEq, Eq)]
pub struct Palette(Box<[[u8; 4]; PALETTE_LEN]>);

impl Palette {
    /// Size of the palette on disk.
    pub const BYTE_LEN: usize = PALETTE_LEN * 4;

    /// Linear grayscale ramp: entry `i` is `(i, i, i, 0)`.
    pub fn grayscale() -> Self {
        let mut entries = [[0u8; 4]; PALETTE_LEN];
        for (i, entry) in entries.iter_mut().enumerate() {
            let v = i as u8;
            *entry = [v, v, v, 0];
        }
        Self(Box::new(entries))
    }

    /// Build from the 1024 on-disk bytes.
    pub fn from_bytes(bytes: &[u8; Self::BYTE_LEN]) -> Self {
        let mut entries = [[0u8; 4]; PALETTE_LEN];
        bytemuck::cast_slice_mut::<[u8; 4], u8>(&mut entries[..]).copy_from_slice(bytes);
        Self(Box::new(entries))
    }

    pub fn entries(&self) -> &[[u8; 4]; PALETTE_LEN] {
        &self.0
    }

    /// The 1024 on-disk bytes.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.0[..])
    }
}

impl fmt::Debug for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Palette")
            .field("entries", &PALETTE_LEN)
            .finish()
    }
}

/// An owned 8-bit or 24-bit image.
///
/// Invariants: `width > 0`, `height > 0`, pixel count equals
/// `width * height`, and a palette is present exactly when the image is
/// 8-bit. Cloning deep-copies the pixel buffer.
#[derive(Debug, Clone)]
pub struct Image {
    width: u32,
    height: u32,
    data: PixelData,
    palette: Option<Palette>,
    headers: Option<BmpHeaders>,
}

impl Image {
    /// Allocate a blank (all zero) image.
    ///
    /// 8-bit images get a grayscale ramp palette.
    pub fn allocate(width: u32, height: u32, depth: BitDepth) -> Result<Self> {
        let len = pixel_count(width, height)?;
        let data = match depth {
            BitDepth::Gray8 => PixelData::Gray(try_filled(len, 0u8)?),
            BitDepth::Rgb24 => PixelData::Rgb(try_filled(len, Rgb::default())?),
        };
        Self::from_data(width, height, data)
    }

    /// Wrap an existing 8-bit buffer (top row first) with a grayscale ramp palette.
    pub fn from_gray(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        Self::from_data(width, height, PixelData::Gray(pixels))
    }

    /// Wrap an existing 24-bit buffer (top row first).
    pub fn from_rgb(width: u32, height: u32, pixels: Vec<Rgb>) -> Result<Self> {
        Self::from_data(width, height, PixelData::Rgb(pixels))
    }

    fn from_data(width: u32, height: u32, data: PixelData) -> Result<Self> {
        let len = pixel_count(width, height)?;
        if data.len() != len {
            return Err(BmpError::parameter(format!(
                "{width}x{height} image needs {len} pixels, got {}",
                data.len()
            )));
        }
        let palette = match data {
            PixelData::Gray(_) => Some(Palette::grayscale()),
            PixelData::Rgb(_) => None,
        };
        Ok(Self {
            width,
            height,
            data,
            palette,
            headers: None,
        })
    }

    /// Assemble a decoded image. The caller has already validated sizes.
    pub(crate) fn from_decoded(
        width: u32,
        height: u32,
        data: PixelData,
        palette: Option<Palette>,
        headers: BmpHeaders,
    ) -> Self {
        debug_assert_eq!(data.len(), width as usize * height as usize);
        debug_assert_eq!(palette.is_some(), data.bit_depth() == BitDepth::Gray8);
        Self {
            width,
            height,
            data,
            palette,
            headers: Some(headers),
        }
    }

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bit_depth(&self) -> BitDepth {
        self.data.bit_depth()
    }

    /// Palette of an 8-bit image.
    pub fn palette(&self) -> Option<&Palette> {
        self.palette.as_ref()
    }

    /// Replace the palette of an 8-bit image.
    pub fn set_palette(&mut self, palette: Palette) -> Result<()> {
        if self.bit_depth() != BitDepth::Gray8 {
            return Err(BmpError::parameter("24-bit images have no palette"));
        }
        self.palette = Some(palette);
        Ok(())
    }

    /// Headers read from disk, if the image was decoded.
    pub fn headers(&self) -> Option<&BmpHeaders> {
        self.headers.as_ref()
    }

    pub fn data(&self) -> &PixelData {
        &self.data
    }

    /// Mutable 8-bit pixels; `None` for 24-bit images.
    pub fn gray_mut(&mut self) -> Option<&mut [u8]> {
        match &mut self.data {
            PixelData::Gray(v) => Some(v.as_mut_slice()),
            PixelData::Rgb(_) => None,
        }
    }

    /// Mutable 24-bit pixels; `None` for 8-bit images.
    pub fn rgb_mut(&mut self) -> Option<&mut [Rgb]> {
        match &mut self.data {
            PixelData::Rgb(v) => Some(v.as_mut_slice()),
            PixelData::Gray(_) => None,
        }
    }

    /// Every channel byte, in storage order.
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        self.data.as_bytes_mut()
    }

    /// Swap in a transformed buffer of identical shape.
    pub(crate) fn replace_data(&mut self, data: PixelData) {
        debug_assert_eq!(data.len(), self.data.len());
        debug_assert_eq!(data.bit_depth(), self.data.bit_depth());
        self.data = data;
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    /// Intensity at `(x, y)` of an 8-bit image.
    pub fn gray_at(&self, x: u32, y: u32) -> Option<u8> {
        let idx = self.index(x, y)?;
        match &self.data {
            PixelData::Gray(v) => Some(v[idx]),
            PixelData::Rgb(_) => None,
        }
    }

    /// Color at `(x, y)` of a 24-bit image.
    pub fn rgb_at(&self, x: u32, y: u32) -> Option<Rgb> {
        let idx = self.index(x, y)?;
        match &self.data {
            PixelData::Rgb(v) => Some(v[idx]),
            PixelData::Gray(_) => None,
        }
    }

    pub fn set_gray(&mut self, x: u32, y: u32, value: u8) -> Result<()> {
        let idx = self.checked_index(x, y)?;
        match &mut self.data {
            PixelData::Gray(v) => {
                v[idx] = value;
                Ok(())
            }
            PixelData::Rgb(_) => Err(BmpError::parameter("set_gray on a 24-bit image")),
        }
    }

    pub fn set_rgb(&mut self, x: u32, y: u32, value: Rgb) -> Result<()> {
        let idx = self.checked_index(x, y)?;
        match &mut self.data {
            PixelData::Rgb(v) => {
                v[idx] = value;
                Ok(())
            }
            PixelData::Gray(_) => Err(BmpError::parameter("set_rgb on an 8-bit image")),
        }
    }

    fn checked_index(&self, x: u32, y: u32) -> Result<usize> {
        self.index(x, y).ok_or_else(|| {
            BmpError::parameter(format!(
                "pixel ({x}, {y}) outside {}x{} image",
                self.width, self.height
            ))
        })
    }

    /// Summary of dimensions and on-disk sizes.
    pub fn info(&self) -> ImageInfo {
        let depth = self.bit_depth();
        let row_stride = header::row_stride(self.width, depth);
        let data_size = row_stride * self.height as u64;
        ImageInfo {
            width: self.width,
            height: self.height,
            bit_depth: depth,
            row_stride,
            data_size,
            file_size: header::pixel_data_offset(depth) as u64 + data_size,
        }
    }
}

/// Dimensions and encoded sizes of an [`Image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub bit_depth: BitDepth,
    /// Bytes per row on disk, including padding.
    pub row_stride: u64,
    /// Bytes of pixel data on disk.
    pub data_size: u64,
    /// Bytes of the whole encoded file.
    pub file_size: u64,
}

impl fmt::Display for ImageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Image Info:")?;
        writeln!(f, "    Width: {}", self.width)?;
        writeln!(f, "    Height: {}", self.height)?;
        writeln!(f, "    Color Depth: {}", self.bit_depth)?;
        writeln!(f, "    Row Stride: {}", self.row_stride)?;
        writeln!(f, "    Data Size: {}", self.data_size)?;
        write!(f, "    File Size: {}", self.file_size)
    }
}

/// `width * height`, rejecting empty and overflowing dimensions.
pub(crate) fn pixel_count(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(BmpError::parameter(format!(
            "image dimensions must be positive, got {width}x{height}"
        )));
    }
    (width as usize)
        .checked_mul(height as usize)
        .ok_or(BmpError::Allocation { bytes: usize::MAX })
}
