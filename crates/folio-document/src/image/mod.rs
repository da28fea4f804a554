// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — decoding encoded sources and resampling to the page width.

pub mod decoder;
pub mod scaler;

pub use decoder::{DecodedImage, ImageDecoder, PixelFormat, RasterDecoder};
pub use scaler::{ImageScaler, ResizeScaler};
