// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image scaler — resamples a decoded page to its output size.

use folio_core::error::{FolioError, Result};
use folio_core::{PageSize, ResizeFilter};
use image::imageops::FilterType;
use tracing::{debug, instrument};

use super::decoder::DecodedImage;

/// Resamples pixel data to exact target dimensions.
pub trait ImageScaler: Send + Sync {
    /// Consume `image` and return it resampled to `size`. The source buffer
    /// is released before this returns.
    fn scale(&self, image: DecodedImage, size: PageSize) -> Result<DecodedImage>;
}

/// Scaler on top of `image::imageops` resampling.
#[derive(Debug, Clone, Copy)]
pub struct ResizeScaler {
    filter: FilterType,
}

impl ResizeScaler {
    pub fn new(filter: ResizeFilter) -> Self {
        let filter = match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        };
        Self { filter }
    }
}

impl Default for ResizeScaler {
    fn default() -> Self {
        Self::new(ResizeFilter::Lanczos3)
    }
}

impl ImageScaler for ResizeScaler {
    #[instrument(skip(self, image), fields(from = %image.size(), to = %size))]
    fn scale(&self, image: DecodedImage, size: PageSize) -> Result<DecodedImage> {
        if size.width == 0 || size.height == 0 {
            return Err(FolioError::Scale(format!("cannot scale to {size}")));
        }
        if image.size() == size {
            return Ok(image);
        }

        let resized = image
            .into_dynamic()
            .resize_exact(size.width, size.height, self.filter);
        debug!(
            new_w = resized.width(),
            new_h = resized.height(),
            "Resize complete"
        );
        DecodedImage::from_dynamic(resized)
    }
}
