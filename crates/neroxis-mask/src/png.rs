//! Deterministic PNG export and brush decoding.
//!
//! Uses fixed compression settings so the same mask always encodes to the
//! same bytes.

use std::io::{Read, Write};
use std::path::Path;

use glam::Vec3;
use png::{BitDepth, ColorType, Compression, Decoder, Encoder, FilterType, Transformations};
use thiserror::Error;

use crate::grid::{BitGrid, FloatGrid, Grid, NormalGrid, Scalar, ScalarGrid, VectorGrid, VectorValue};

/// Errors from PNG operations.
#[derive(Debug, Error)]
pub enum PngError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PNG encoding error: {0}")]
    Encoding(#[from] png::EncodingError),

    #[error("PNG decoding error: {0}")]
    Decoding(#[from] png::DecodingError),

    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),
}

/// PNG export configuration for deterministic output.
#[derive(Debug, Clone)]
pub struct PngConfig {
    pub compression: Compression,
    pub filter: FilterType,
}

impl Default for PngConfig {
    fn default() -> Self {
        Self {
            compression: Compression::Default,
            filter: FilterType::NoFilter,
        }
    }
}

impl PngConfig {
    /// Smallest files; slower.
    pub fn best_compression() -> Self {
        Self {
            compression: Compression::Best,
            filter: FilterType::Paeth,
        }
    }

    pub fn fast() -> Self {
        Self {
            compression: Compression::Fast,
            filter: FilterType::NoFilter,
        }
    }
}

/// 8-bit pixels of a square image, row-major (`y` rows of `x` pixels).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub size: u32,
    pub color: ColorType,
    pub data: Vec<u8>,
}

/// Grids that can be rendered as an 8-bit image.
pub trait ImageSource {
    fn to_image(&self) -> Image;
}

fn square_image(size: usize, color: ColorType, mut pixel: impl FnMut(usize, usize, &mut Vec<u8>)) -> Image {
    let channels = color.samples();
    let mut data = Vec::with_capacity(size * size * channels);
    for y in 0..size {
        for x in 0..size {
            pixel(x, y, &mut data);
        }
    }
    Image {
        size: size as u32,
        color,
        data,
    }
}

#[inline]
fn unit_to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl ImageSource for BitGrid {
    fn to_image(&self) -> Image {
        square_image(self.size(), ColorType::Grayscale, |x, y, out| {
            out.push(if self.get_bit(x, y) { 255 } else { 0 });
        })
    }
}

impl<T: Scalar> ImageSource for ScalarGrid<T> {
    /// Grayscale stretched between the grid's minimum and maximum.
    fn to_image(&self) -> Image {
        let (lo, hi) = self
            .range()
            .map(|(lo, hi)| (lo.to_f64(), hi.to_f64()))
            .unwrap_or((0.0, 0.0));
        let span = hi - lo;
        square_image(self.size(), ColorType::Grayscale, |x, y, out| {
            let value = if span > 0.0 {
                ((self.get(x, y).to_f64() - lo) / span) as f32
            } else {
                0.0
            };
            out.push(unit_to_byte(value));
        })
    }
}

impl<V: VectorValue> ImageSource for VectorGrid<V> {
    /// Components mapped from `[-1, 1]`; two-component vectors leave blue empty.
    fn to_image(&self) -> Image {
        let color = if V::COMPONENTS == 4 {
            ColorType::Rgba
        } else {
            ColorType::Rgb
        };
        let channels = color.samples();
        square_image(self.size(), color, |x, y, out| {
            let value = self.get(x, y);
            for i in 0..channels {
                let component = if i < V::COMPONENTS { value.component(i) } else { -1.0 };
                out.push(unit_to_byte(component * 0.5 + 0.5));
            }
        })
    }
}

impl ImageSource for NormalGrid {
    /// Tangent-space encoding: x to red, z to green, y to blue.
    fn to_image(&self) -> Image {
        square_image(self.size(), ColorType::Rgb, |x, y, out| {
            let Vec3 { x: nx, y: ny, z: nz } = self.get(x, y);
            out.push(unit_to_byte(nx * 0.5 + 0.5));
            out.push(unit_to_byte(nz * 0.5 + 0.5));
            out.push(unit_to_byte(ny * 0.5 + 0.5));
        })
    }
}

/// Write an image to any writer.
pub fn write_image_to_writer<W: Write>(
    image: &Image,
    writer: W,
    config: &PngConfig,
) -> Result<(), PngError> {
    let expected = (image.size * image.size) as usize * image.color.samples();
    if image.data.len() != expected {
        return Err(PngError::InvalidDimensions(format!(
            "Expected {} bytes for {}x{} {:?}, got {}",
            expected,
            image.size,
            image.size,
            image.color,
            image.data.len()
        )));
    }

    let mut encoder = Encoder::new(writer, image.size, image.size);
    encoder.set_color(image.color);
    encoder.set_depth(BitDepth::Eight);
    encoder.set_compression(config.compression);
    encoder.set_filter(config.filter);

    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(&image.data)?;

    Ok(())
}

/// Write an image to a PNG file.
pub fn write_image(image: &Image, path: &Path, config: &PngConfig) -> Result<(), PngError> {
    let file = std::fs::File::create(path)?;
    let writer = std::io::BufWriter::new(file);

    write_image_to_writer(image, writer, config)
}

/// Encode an image into PNG bytes.
pub fn encode_image(image: &Image, config: &PngConfig) -> Result<Vec<u8>, PngError> {
    let mut data = Vec::new();
    write_image_to_writer(image, &mut data, config)?;
    Ok(data)
}

/// Compute the BLAKE3 hash of PNG data.
pub fn hash_png(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

/// Decode a square PNG into a float grid of luminance in `[0, 1]`.
pub fn decode_grayscale<R: Read>(reader: R) -> Result<FloatGrid, PngError> {
    let mut decoder = Decoder::new(reader);
    decoder.set_transformations(Transformations::normalize_to_color8());
    let mut reader = decoder.read_info()?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;

    if info.width != info.height {
        return Err(PngError::InvalidDimensions(format!(
            "brush images must be square, got {}x{}",
            info.width, info.height
        )));
    }

    let size = info.width as usize;
    let channels = info.color_type.samples();
    let line = info.line_size;
    let bytes = &buf[..info.buffer_size()];
    Ok(FloatGrid::from_fn(size, |x, y| {
        let offset = y * line + x * channels;
        let pixel = &bytes[offset..offset + channels];
        let luminance = match info.color_type {
            ColorType::Rgb | ColorType::Rgba => {
                0.299 * pixel[0] as f32 + 0.587 * pixel[1] as f32 + 0.114 * pixel[2] as f32
            }
            _ => pixel[0] as f32,
        };
        luminance / 255.0
    }))
}
