//! BMP decoding.

use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use crate::codec::header::{
    self, BmpHeaders, COMPRESSION_NONE, FILE_HEADER_LEN, FileHeader, INFO_HEADER_LEN, InfoHeader,
    SIGNATURE,
};
use crate::error::{BmpError, Result, try_filled};
use crate::image::{BitDepth, Image, Palette, PixelData, Rgb, pixel_count};

/// Load a bitmap from disk.
pub fn load(path: impl AsRef<Path>) -> Result<Image> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let image = decode_from(&mut BufReader::new(file))?;
    tracing::debug!(
        "loaded {} ({}x{}, {})",
        path.display(),
        image.width(),
        image.height(),
        image.bit_depth()
    );
    Ok(image)
}

/// Decode a bitmap from any seekable byte source.
///
/// # Algorithm
/// 1. Read and validate the 14-byte file header (`"BM"` signature)
/// 2. Read the 40-byte info header; require 8 or 24 bits and no compression
/// 3. For 8-bit images read the 1024-byte palette after the info header
/// 4. Seek to the pixel offset and read padded rows in file order,
///    placing each at its top-to-bottom position and reordering B,G,R to R,G,B
///
/// Nothing is returned unless every step succeeds.
pub fn decode_from<R: Read + Seek>(reader: &mut R) -> Result<Image> {
    let mut file_bytes = [0u8; FILE_HEADER_LEN];
    read_section(reader, &mut file_bytes, "file header")?;
    let file = FileHeader::parse(&file_bytes);
    if file.signature != SIGNATURE {
        return Err(BmpError::format(format!(
            "missing 'BM' signature (found {:02x} {:02x})",
            file.signature[0], file.signature[1]
        )));
    }

    let mut info_bytes = [0u8; INFO_HEADER_LEN];
    read_section(reader, &mut info_bytes, "info header")?;
    let info = InfoHeader::parse(&info_bytes);
    let (width, height, depth) = validate_info(&info)?;

    tracing::debug!(
        "bmp header: size={} offset={} width={} height={} bits={} top_down={}",
        file.file_size,
        file.pixel_offset,
        info.width,
        info.height,
        info.bit_count,
        info.is_top_down()
    );

    if info.header_size as usize > INFO_HEADER_LEN {
        tracing::warn!(
            "extended DIB header ({} bytes); fields past byte 40 are ignored",
            info.header_size
        );
        reader.seek(SeekFrom::Start(
            FILE_HEADER_LEN as u64 + info.header_size as u64,
        ))?;
    }

    let palette = match depth {
        BitDepth::Gray8 => {
            let mut bytes = [0u8; Palette::BYTE_LEN];
            read_section(reader, &mut bytes, "palette")?;
            Some(Palette::from_bytes(&bytes))
        }
        BitDepth::Rgb24 => None,
    };

    ensure_pixels_present(reader, file.pixel_offset, width, height, depth)?;
    reader.seek(SeekFrom::Start(file.pixel_offset as u64))?;
    let data = read_pixels(reader, width, height, depth, info.is_top_down())?;

    Ok(Image::from_decoded(
        width,
        height,
        data,
        palette,
        BmpHeaders { file, info },
    ))
}

/// Check the info header and return `(width, height, depth)`.
fn validate_info(info: &InfoHeader) -> Result<(u32, u32, BitDepth)> {
    if (info.header_size as usize) < INFO_HEADER_LEN {
        return Err(BmpError::format(format!(
            "unsupported DIB header size {}",
            info.header_size
        )));
    }
    let depth = BitDepth::from_bits(info.bit_count).ok_or_else(|| {
        BmpError::format(format!(
            "unsupported bit depth {} (only 8 and 24 are supported)",
            info.bit_count
        ))
    })?;
    if info.compression != COMPRESSION_NONE {
        return Err(BmpError::format(format!(
            "compressed bitmaps are not supported (compression {})",
            info.compression
        )));
    }
    if info.width <= 0 || info.height == 0 {
        return Err(BmpError::format(format!(
            "invalid dimensions {}x{}",
            info.width, info.height
        )));
    }
    Ok((info.width as u32, info.abs_height(), depth))
}

/// Reject files too short for the declared pixel array before any pixel
/// buffer is allocated.
fn ensure_pixels_present<R: Seek>(
    reader: &mut R,
    pixel_offset: u32,
    width: u32,
    height: u32,
    depth: BitDepth,
) -> Result<()> {
    let stream_len = reader.seek(SeekFrom::End(0))?;
    let needed = header::row_stride(width, depth)
        .checked_mul(height as u64)
        .and_then(|data| data.checked_add(pixel_offset as u64));
    match needed {
        Some(needed) if needed <= stream_len => Ok(()),
        _ => Err(BmpError::format("truncated pixel data")),
    }
}

fn read_pixels<R: Read>(
    reader: &mut R,
    width: u32,
    height: u32,
    depth: BitDepth,
    top_down: bool,
) -> Result<PixelData> {
    let len = pixel_count(width, height)?;
    let stride = usize::try_from(header::row_stride(width, depth))
        .map_err(|_| BmpError::Allocation { bytes: usize::MAX })?;
    let w = width as usize;
    let mut row = try_filled(stride, 0u8)?;

    // File row `i` lands on image row `target(i)`.
    let target = |i: usize| {
        if top_down {
            i
        } else {
            height as usize - 1 - i
        }
    };

    match depth {
        BitDepth::Gray8 => {
            let mut pixels = try_filled(len, 0u8)?;
            for i in 0..height as usize {
                read_section(reader, &mut row, "pixel data")?;
                let y = target(i);
                pixels[y * w..(y + 1) * w].copy_from_slice(&row[..w]);
            }
            Ok(PixelData::Gray(pixels))
        }
        BitDepth::Rgb24 => {
            let mut pixels = try_filled(len, Rgb::default())?;
            for i in 0..height as usize {
                read_section(reader, &mut row, "pixel data")?;
                let y = target(i);
                let dst = &mut pixels[y * w..(y + 1) * w];
                for (px, bgr) in dst.iter_mut().zip(row.chunks_exact(3)) {
                    *px = Rgb::new(bgr[2], bgr[1], bgr[0]);
                }
            }
            Ok(PixelData::Rgb(pixels))
        }
    }
}

/// `read_exact`, reporting a short read as a truncated file.
fn read_section<R: Read>(reader: &mut R, buf: &mut [u8], what: &str) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => BmpError::format(format!("truncated {what}")),
        _ => BmpError::Io(e),
    })
}
