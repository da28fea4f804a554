// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image decoder — turns encoded bytes (JPEG, PNG, TIFF, etc.) into an 8-bit
// pixel buffer using the `image` crate.

use std::io::Cursor;

use folio_core::PageSize;
use folio_core::error::{FolioError, Result};
use image::{DynamicImage, GrayImage, ImageReader, RgbImage};
use tracing::{debug, instrument};

/// Sample layout of a decoded buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// Three 8-bit samples per pixel.
    Rgb8,
    /// One 8-bit gray sample per pixel.
    Luma8,
}

impl PixelFormat {
    pub fn channels(&self) -> usize {
        match self {
            Self::Rgb8 => 3,
            Self::Luma8 => 1,
        }
    }
}

/// A decoded raster image. Lives for one page of an export.
#[derive(Clone, PartialEq, Eq)]
pub struct DecodedImage {
    width: u32,
    height: u32,
    format: PixelFormat,
    pixels: Vec<u8>,
}

impl DecodedImage {
    /// Wrap a raw pixel buffer, checking its length against the dimensions.
    pub fn new(width: u32, height: u32, format: PixelFormat, pixels: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(FolioError::Decode(format!(
                "image has zero dimension ({width}x{height})"
            )));
        }
        let expected = width as usize * height as usize * format.channels();
        if pixels.len() != expected {
            return Err(FolioError::Decode(format!(
                "pixel buffer is {} bytes, expected {expected} for {width}x{height} {format:?}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            format,
            pixels,
        })
    }

    /// Convert a `DynamicImage`, keeping gray images single-channel.
    pub fn from_dynamic(image: DynamicImage) -> Result<Self> {
        let (width, height) = (image.width(), image.height());
        if image.color().has_color() {
            Self::new(width, height, PixelFormat::Rgb8, image.into_rgb8().into_raw())
        } else {
            Self::new(width, height, PixelFormat::Luma8, image.into_luma8().into_raw())
        }
    }

    /// Back into a `DynamicImage` for resampling or encoding.
    pub fn into_dynamic(self) -> DynamicImage {
        let Self {
            width,
            height,
            format,
            pixels,
        } = self;
        // Length was checked in `new`, so `from_raw` cannot fail here.
        match format {
            PixelFormat::Rgb8 => RgbImage::from_raw(width, height, pixels)
                .map(DynamicImage::ImageRgb8)
                .unwrap_or_else(|| DynamicImage::new_rgb8(width, height)),
            PixelFormat::Luma8 => GrayImage::from_raw(width, height, pixels)
                .map(DynamicImage::ImageLuma8)
                .unwrap_or_else(|| DynamicImage::new_luma8(width, height)),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> PageSize {
        PageSize {
            width: self.width,
            height: self.height,
        }
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("pixels_len", &self.pixels.len())
            .finish()
    }
}

/// Decodes one encoded image. Implementations must be usable from a
/// blocking worker thread.
pub trait ImageDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage>;
}

/// Decoder for every raster format the `image` crate was built with.
/// The format is sniffed from the leading bytes.
#[derive(Debug, Clone)]
pub struct RasterDecoder {
    /// Largest accepted `width * height`.
    max_pixels: u64,
}

impl RasterDecoder {
    pub fn new(max_pixels: u64) -> Self {
        Self { max_pixels }
    }
}

impl Default for RasterDecoder {
    fn default() -> Self {
        Self::new(folio_core::ExportConfig::default().max_source_pixels)
    }
}

impl ImageDecoder for RasterDecoder {
    #[instrument(skip_all, fields(bytes_len = bytes.len()))]
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|err| FolioError::Decode(format!("failed to read image header: {err}")))?;
        let format = reader.format().ok_or_else(|| {
            FolioError::Decode("unrecognised image format".into())
        })?;

        // Check the header before allocating the full pixel buffer.
        let (width, height) = ImageReader::with_format(Cursor::new(bytes), format)
            .into_dimensions()
            .map_err(|err| FolioError::Decode(format!("failed to read image dimensions: {err}")))?;
        if width == 0 || height == 0 {
            return Err(FolioError::Decode(format!(
                "image has zero dimension ({width}x{height})"
            )));
        }
        let pixels = u64::from(width) * u64::from(height);
        if pixels > self.max_pixels {
            return Err(FolioError::Decode(format!(
                "image is {width}x{height} ({pixels} pixels), limit is {}",
                self.max_pixels
            )));
        }

        let image = reader
            .decode()
            .map_err(|err| FolioError::Decode(format!("failed to decode image: {err}")))?;
        debug!(
            width = image.width(),
            height = image.height(),
            format = ?format,
            "Image decoded"
        );
        DecodedImage::from_dynamic(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Luma, Rgb};

    fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buffer = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buffer), format)
            .expect("encode test image");
        buffer
    }

    #[test]
    fn decodes_png_dimensions() {
        let png = encode(
            DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 30, Rgb([200, 10, 10]))),
            ImageFormat::Png,
        );
        let decoded = RasterDecoder::default().decode(&png).unwrap();
        assert_eq!(decoded.size(), PageSize { width: 40, height: 30 });
        assert_eq!(decoded.format(), PixelFormat::Rgb8);
        assert_eq!(decoded.pixels().len(), 40 * 30 * 3);
    }

    #[test]
    fn gray_images_stay_single_channel() {
        let png = encode(
            DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 8, Luma([90]))),
            ImageFormat::Png,
        );
        let decoded = RasterDecoder::default().decode(&png).unwrap();
        assert_eq!(decoded.format(), PixelFormat::Luma8);
    }

    #[test]
    fn garbage_is_a_decode_failure() {
        let err = RasterDecoder::default().decode(b"not an image at all").unwrap_err();
        assert!(matches!(err, FolioError::Decode(_)));
    }

    #[test]
    fn truncated_png_is_a_decode_failure() {
        let png = encode(
            DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 64, Rgb([1, 2, 3]))),
            ImageFormat::Png,
        );
        let err = RasterDecoder::default().decode(&png[..png.len() / 2]).unwrap_err();
        assert!(err.is_per_page());
    }

    #[test]
    fn oversized_images_are_rejected() {
        let png = encode(
            DynamicImage::ImageRgb8(RgbImage::from_pixel(20, 20, Rgb([0, 0, 0]))),
            ImageFormat::Png,
        );
        let err = RasterDecoder::new(100).decode(&png).unwrap_err();
        assert!(err.to_string().contains("limit"));
    }

    #[test]
    fn buffer_length_is_checked() {
        assert!(DecodedImage::new(2, 2, PixelFormat::Rgb8, vec![0; 11]).is_err());
        assert!(DecodedImage::new(0, 2, PixelFormat::Luma8, Vec::new()).is_err());
        assert!(DecodedImage::new(2, 2, PixelFormat::Luma8, vec![0; 4]).is_ok());
    }
}
