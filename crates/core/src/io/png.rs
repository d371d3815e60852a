//! PNG reading/writing for 8-bit tiles
//!
//! Uses the `image` crate. Decoded images keep their native band layout
//! (gray, gray + alpha, RGB, RGBA); other sample depths are reduced to 8 bits.

use crate::error::{Error, Result};
use crate::raster::Raster;
use image::codecs::png::PngEncoder;
use image::{ColorType, DynamicImage, ExtendedColorType, ImageEncoder};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Read a PNG (or any image the `png` feature can decode) into a Raster
pub fn read_png<P: AsRef<Path>>(path: P) -> Result<Raster<u8>> {
    let image = image::open(path.as_ref())?;
    decode_image(image)
}

/// Read an image from an in-memory buffer into a Raster
///
/// Same as `read_png` but operates on a byte slice instead of a file path.
pub fn read_png_from_buffer(data: &[u8]) -> Result<Raster<u8>> {
    let image = image::load_from_memory(data)?;
    decode_image(image)
}

/// Read a file and keep a single band of it.
///
/// Per-category tiles are often stored as RGB images where only one
/// band carries the category intensity.
pub fn read_band<P: AsRef<Path>>(path: P, band: usize) -> Result<Raster<u8>> {
    read_png(path)?.band_raster(band)
}

/// Internal: turn a decoded image into a raster with 1 to 4 bands
fn decode_image(image: DynamicImage) -> Result<Raster<u8>> {
    let rows = image.height() as usize;
    let cols = image.width() as usize;

    let (data, bands) = match image.color() {
        ColorType::L8 | ColorType::L16 => (image.into_luma8().into_raw(), 1),
        ColorType::La8 | ColorType::La16 => (image.into_luma_alpha8().into_raw(), 2),
        ColorType::Rgb8 | ColorType::Rgb16 | ColorType::Rgb32F => (image.into_rgb8().into_raw(), 3),
        _ => (image.into_rgba8().into_raw(), 4),
    };

    Raster::from_vec(data, rows, cols, bands)
}

/// Write a Raster to a PNG file
pub fn write_png<P: AsRef<Path>>(raster: &Raster<u8>, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    encode_png(raster, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write a Raster to an in-memory PNG buffer
///
/// Same as `write_png` but returns a `Vec<u8>` instead of writing to a file.
pub fn write_png_to_buffer(raster: &Raster<u8>) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_png(raster, &mut buf)?;
    Ok(buf)
}

/// Internal: encode a Raster as PNG into any `Write` sink
fn encode_png<W: Write>(raster: &Raster<u8>, writer: W) -> Result<()> {
    let (rows, cols, bands) = raster.shape();

    let color = match bands {
        1 => ExtendedColorType::L8,
        2 => ExtendedColorType::La8,
        3 => ExtendedColorType::Rgb8,
        4 => ExtendedColorType::Rgba8,
        n => return Err(Error::UnsupportedBandCount(n)),
    };

    let width = u32::try_from(cols).map_err(|_| Error::InvalidDimensions { rows, cols, bands })?;
    let height = u32::try_from(rows).map_err(|_| Error::InvalidDimensions { rows, cols, bands })?;

    // Logical iteration order is (row, col, band), i.e. interleaved samples
    let data: Vec<u8> = raster.data().iter().copied().collect();

    PngEncoder::new(writer).write_image(&data, width, height, color)?;
    Ok(())
}
