//! BMP encoding.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::codec::header::{
    self, COMPRESSION_NONE, DEFAULT_RESOLUTION, FileHeader, INFO_HEADER_LEN, InfoHeader, SIGNATURE,
};
use crate::error::{BmpError, Result, try_filled};
use crate::image::{BitDepth, Image, PALETTE_LEN, PixelData};

/// Write a bitmap to disk, replacing any existing file.
pub fn save(path: impl AsRef<Path>, image: &Image) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    encode_to(&mut writer, image)?;
    writer.flush()?;
    tracing::info!("image saved to {}", path.display());
    Ok(())
}

/// Encode an image as an uncompressed bottom-up bitmap.
///
/// Size fields are recomputed from the current dimensions; the resolution
/// of a decoded image is carried over, otherwise 2835 px/m is written.
pub fn encode_to<W: Write>(writer: &mut W, image: &Image) -> Result<()> {
    let (file, info) = build_headers(image)?;
    writer.write_all(&file.to_bytes())?;
    writer.write_all(&info.to_bytes())?;

    // Present exactly for 8-bit images.
    if let Some(palette) = image.palette() {
        writer.write_all(palette.as_bytes())?;
    }

    let w = image.width() as usize;
    let stride = usize::try_from(header::row_stride(image.width(), image.bit_depth()))
        .map_err(|_| BmpError::Allocation { bytes: usize::MAX })?;
    // Padding bytes stay zero for every row.
    let mut row = try_filled(stride, 0u8)?;

    for y in (0..image.height() as usize).rev() {
        match image.data() {
            PixelData::Gray(pixels) => {
                row[..w].copy_from_slice(&pixels[y * w..(y + 1) * w]);
            }
            PixelData::Rgb(pixels) => {
                let src = &pixels[y * w..(y + 1) * w];
                for (bgr, px) in row.chunks_exact_mut(3).zip(src) {
                    bgr.copy_from_slice(&[px.b, px.g, px.r]);
                }
            }
        }
        writer.write_all(&row)?;
    }
    Ok(())
}

fn build_headers(image: &Image) -> Result<(FileHeader, InfoHeader)> {
    let depth = image.bit_depth();
    let too_large = || {
        BmpError::parameter(format!(
            "{}x{} image does not fit in a BMP file",
            image.width(),
            image.height()
        ))
    };

    let image_size = header::row_stride(image.width(), depth) * image.height() as u64;
    let pixel_offset = header::pixel_data_offset(depth);
    let file_size = u32::try_from(pixel_offset as u64 + image_size).map_err(|_| too_large())?;
    let width = i32::try_from(image.width()).map_err(|_| too_large())?;
    let height = i32::try_from(image.height()).map_err(|_| too_large())?;

    let (x_resolution, y_resolution) = image
        .headers()
        .map(|h| (h.info.x_resolution, h.info.y_resolution))
        .unwrap_or((DEFAULT_RESOLUTION, DEFAULT_RESOLUTION));

    let colors_used = match depth {
        BitDepth::Gray8 => PALETTE_LEN as u32,
        BitDepth::Rgb24 => 0,
    };

    let file = FileHeader {
        signature: SIGNATURE,
        file_size,
        reserved1: 0,
        reserved2: 0,
        pixel_offset,
    };
    let info = InfoHeader {
        header_size: INFO_HEADER_LEN as u32,
        width,
        height,
        planes: 1,
        bit_count: depth.bits(),
        compression: COMPRESSION_NONE,
        // Fits because file_size does.
        image_size: image_size as u32,
        x_resolution,
        y_resolution,
        colors_used,
        colors_important: 0,
    };
    Ok((file, info))
}
